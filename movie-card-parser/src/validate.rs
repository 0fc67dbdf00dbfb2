use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::record::{DEFAULT_COLOR, DEFAULT_DIRECTOR, DEFAULT_MOOD_TAG, MovieCard, ParseOptions};
use crate::tree::{Field, Tree};

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color pattern is valid"));

const TITLE: &str = "title";
const YEAR: &str = "year";
const REASON: &str = "reason";

const TITLE_KEYS: [&str; 1] = [TITLE];
const YEAR_KEYS: [&str; 1] = [YEAR];
const REASON_KEYS: [&str; 2] = [REASON, "reason_for_recommendation"];
const DIRECTOR_KEYS: [&str; 1] = ["director"];
const MOOD_TAG_KEYS: [&str; 1] = ["mood_tags"];
const COLOR_KEYS: [&str; 2] = ["color", "color_hex"];

/// Outcome of validating every candidate of one answer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    /// Valid cards in arrival order
    pub cards: Vec<MovieCard>,
    pub rejected: Vec<ValidationError>,
}

impl Batch {
    pub fn candidates(&self) -> usize {
        self.cards.len() + self.rejected.len()
    }
}

/// Validates each candidate independently. Rejections are logged and kept
/// for diagnostics; they never stop the batch.
pub fn validate_all(candidates: &[&Tree], options: &ParseOptions) -> Batch {
    let mut batch = Batch::default();
    for (index, candidate) in candidates.iter().enumerate() {
        match validate(candidate, options) {
            Ok(card) => batch.cards.push(card),
            Err(e) => {
                warn!(index, error = %e, "Dropping invalid candidate");
                batch.rejected.push(e);
            }
        }
    }
    batch
}

/// Builds a [`MovieCard`] from one candidate mapping.
///
/// Required fields are checked for presence first, in `title`, `year`,
/// `reason` order. Optional fields fall back to their sentinels, and an
/// invalid color is replaced rather than rejected.
pub fn validate(candidate: &Tree, options: &ParseOptions) -> Result<MovieCard, ValidationError> {
    if !candidate.is_mapping() {
        return Err(ValidationError::NotAMapping(candidate.kind()));
    }

    let title = required(candidate, &TITLE_KEYS, TITLE)?;
    let year = required(candidate, &YEAR_KEYS, YEAR)?;
    let reason = required(candidate, &REASON_KEYS, REASON)?;

    let title = text(title, TITLE)?;
    let year = year_text(year)?;
    let reason = truncate(&text(reason, REASON)?, options.max_reason_chars);

    Ok(MovieCard {
        title,
        year,
        director: director(candidate),
        reason,
        mood_tags: mood_tags(candidate),
        color: color(candidate),
    })
}

fn required<'a>(
    candidate: &'a Tree,
    keys: &[&str],
    field: &'static str,
) -> Result<&'a Tree, ValidationError> {
    candidate
        .first_field(keys)
        .value()
        .ok_or(ValidationError::MissingField(field))
}

fn text(tree: &Tree, field: &'static str) -> Result<String, ValidationError> {
    let value = tree.as_str().ok_or(ValidationError::WrongType {
        field,
        expected: "text",
        found: tree.kind(),
    })?;
    non_empty(value).ok_or(ValidationError::EmptyField(field))
}

/// Years arrive as text or as numbers; both end up as trimmed text.
fn year_text(tree: &Tree) -> Result<String, ValidationError> {
    let wrong_type = ValidationError::WrongType {
        field: YEAR,
        expected: "integer or text",
        found: tree.kind(),
    };

    match tree {
        Tree::String(s) => non_empty(s).ok_or(ValidationError::EmptyField(YEAR)),
        Tree::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Ok(u.to_string())
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(format!("{f:.0}")),
                    _ => Err(wrong_type),
                }
            }
        }
        _ => Err(wrong_type),
    }
}

fn director(candidate: &Tree) -> String {
    candidate
        .first_field(&DIRECTOR_KEYS)
        .value()
        .and_then(Tree::as_str)
        .and_then(non_empty)
        .unwrap_or_else(|| DEFAULT_DIRECTOR.to_string())
}

fn mood_tags(candidate: &Tree) -> Vec<String> {
    let tags: Vec<String> = match candidate.first_field(&MOOD_TAG_KEYS).value() {
        Some(Tree::Sequence(items)) => items
            .iter()
            .filter_map(Tree::as_str)
            .filter_map(non_empty)
            .collect(),
        Some(Tree::String(tag)) => non_empty(tag).into_iter().collect(),
        _ => Vec::new(),
    };

    if tags.is_empty() {
        vec![DEFAULT_MOOD_TAG.to_string()]
    } else {
        tags
    }
}

fn color(candidate: &Tree) -> String {
    match candidate.first_field(&COLOR_KEYS) {
        Field::Present(Tree::String(s)) if HEX_COLOR.is_match(s.trim()) => s.trim().to_string(),
        Field::Present(other) => {
            debug!(found = ?other, "Replacing invalid color with default");
            DEFAULT_COLOR.to_string()
        }
        Field::Missing | Field::Null => DEFAULT_COLOR.to_string(),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Cuts on a character boundary, never inside a code point.
fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            debug!(max_chars, "Truncating overlong reason");
            s[..cut].trim_end().to_string()
        }
        None => s.to_string(),
    }
}
