use thiserror::Error;

use crate::tree::TreeKind;

/// Failures that abort a whole pipeline run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("model answer is not valid JSON: {reason}{hint}", hint = ambiguity_hint(.ambiguous))]
    Decode {
        reason: String,
        /// Substring picked by the first extraction pass
        substring: String,
        ambiguous: bool,
    },

    #[error("unrecognised response shape: {found}{hint}", hint = item_hint(.item))]
    Shape {
        found: TreeKind,
        /// Offending element kind when `found` is a sequence
        item: Option<TreeKind>,
    },

    #[error("no usable recommendation among {candidates} candidate(s)")]
    EmptyResult {
        candidates: usize,
        rejected: Vec<ValidationError>,
    },
}

impl PipelineError {
    /// Raw text worth attaching to operator logs, if any.
    pub fn substring(&self) -> Option<&str> {
        match self {
            PipelineError::Decode { substring, .. } => Some(substring),
            _ => None,
        }
    }
}

/// Why a single candidate was dropped. Never fatal to the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("required field `{0}` is empty")]
    EmptyField(&'static str),

    #[error("field `{field}` should be {expected}, found {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: TreeKind,
    },

    #[error("candidate should be a mapping, found {0}")]
    NotAMapping(TreeKind),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

fn ambiguity_hint(ambiguous: &bool) -> &'static str {
    if *ambiguous {
        " (extraction was ambiguous)"
    } else {
        ""
    }
}

fn item_hint(item: &Option<TreeKind>) -> String {
    match item {
        Some(kind) => format!(" containing a {kind}"),
        None => String::new(),
    }
}
