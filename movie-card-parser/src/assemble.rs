use std::num::NonZeroUsize;

use crate::error::{PipelineError, Result};
use crate::record::MovieCard;
use crate::validate::Batch;

/// Keeps the first `requested_count` valid cards in arrival order.
///
/// Ranking belongs to the model, so nothing is reordered. A batch without a
/// single valid card is an error, never an empty success.
pub fn assemble(batch: Batch, requested_count: NonZeroUsize) -> Result<Vec<MovieCard>> {
    if batch.cards.is_empty() {
        return Err(PipelineError::EmptyResult {
            candidates: batch.candidates(),
            rejected: batch.rejected,
        });
    }

    let mut cards = batch.cards;
    cards.truncate(requested_count.get());
    Ok(cards)
}
