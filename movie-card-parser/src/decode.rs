use serde_json::Value;

use crate::tree::Tree;

/// Strict JSON parse of an extracted substring.
///
/// No trailing commas, comments or other leniency: a malformed answer fails
/// here and the caller decides whether to retry with a narrower extraction.
pub fn decode(substring: &str) -> Result<Tree, serde_json::Error> {
    serde_json::from_str::<Value>(substring).map(Tree::from)
}
