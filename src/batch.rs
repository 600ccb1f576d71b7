//! Batch planning for detail queries
//!
//! The remote store caps how many ids fit into a single `WHERE Id IN (...)`
//! clause, so the full identifier list is partitioned into bounded batches
//! that are then queried one at a time.

use crate::error::{Error, Result};

/// Partition `items` into consecutive batches of at most `batch_size`.
///
/// The batches preserve input order and concatenate back to the exact input:
/// no drops, no duplicates, no overlap. Only the final batch may be shorter
/// than `batch_size`. An empty input yields zero batches.
///
/// # Errors
///
/// Returns [`Error::InvalidBatchSize`] when `batch_size` is zero.
pub fn split_into_batches<T: Clone>(items: &[T], batch_size: usize) -> Result<Vec<Vec<T>>> {
    if batch_size == 0 {
        return Err(Error::InvalidBatchSize);
    }
    Ok(items.chunks(batch_size).map(<[T]>::to_vec).collect())
}
