use serde::{Deserialize, Serialize};

/// Director used when the model names none
pub const DEFAULT_DIRECTOR: &str = "unknown";
/// Sole mood tag used when the model gives none
pub const DEFAULT_MOOD_TAG: &str = "movie";
/// Card color used when the model gives none or an invalid one
pub const DEFAULT_COLOR: &str = "#1E293B";
pub const DEFAULT_MAX_REASON_CHARS: usize = 500;

/// A validated recommendation card.
///
/// Only the record validator builds these, so every instance satisfies the
/// card invariants: non-empty title, year and reason, at least one mood tag
/// and a `#RRGGBB` color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieCard {
    pub title: String,
    pub year: String,
    pub director: String,
    #[serde(rename = "reason_for_recommendation")]
    pub reason: String,
    pub mood_tags: Vec<String>,
    #[serde(rename = "color_hex")]
    pub color: String,
}

/// Tunables for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Longer reasons are truncated to this many characters
    pub max_reason_chars: usize,
}

impl ParseOptions {
    pub fn with_max_reason_chars(max_reason_chars: usize) -> Self {
        Self { max_reason_chars }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_reason_chars: DEFAULT_MAX_REASON_CHARS,
        }
    }
}
