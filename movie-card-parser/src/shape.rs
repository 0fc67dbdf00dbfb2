use crate::error::PipelineError;
use crate::tree::Tree;

/// Container keys models use to wrap the list, in order of preference
pub const CONTAINER_KEYS: [&str; 3] = ["movies", "recommendations", "cards"];

/// Reduces every accepted top-level shape to an ordered list of candidate
/// mappings.
///
/// 1. a sequence of mappings is returned as is
/// 2. a mapping holding a sequence of mappings under the first present
///    container key yields that sequence
/// 3. any other mapping becomes a one-element list
/// 4. everything else is a shape error
pub fn normalize(tree: &Tree) -> Result<Vec<&Tree>, PipelineError> {
    match tree {
        Tree::Sequence(items) => mappings(items).ok_or_else(|| PipelineError::Shape {
            found: tree.kind(),
            item: items.iter().find(|item| !item.is_mapping()).map(Tree::kind),
        }),
        Tree::Mapping(_) => Ok(unwrap_container(tree).unwrap_or_else(|| vec![tree])),
        other => Err(PipelineError::Shape {
            found: other.kind(),
            item: None,
        }),
    }
}

/// Only the first container key that is present is considered; if it does
/// not hold a list of mappings the whole mapping is the candidate.
fn unwrap_container(tree: &Tree) -> Option<Vec<&Tree>> {
    let inner = CONTAINER_KEYS
        .iter()
        .find_map(|key| tree.field(key).value())?;
    mappings(inner.as_sequence()?)
}

fn mappings(items: &[Tree]) -> Option<Vec<&Tree>> {
    items
        .iter()
        .map(|item| item.is_mapping().then_some(item))
        .collect()
}
