//! Partitioning of bulk writes into bounded statements.

use std::ops::Range;
use tabula_core::driver::Capability;

/// Number of rows per statement for a bulk write.
///
/// Never more than `batch_size`, and never so many that the statement would
/// bind more than the driver's parameter limit. Always at least one.
pub fn rows_per_statement(batch_size: usize, columns: usize, capability: &Capability) -> usize {
    let by_params = capability.max_params / columns.max(1);
    batch_size.min(by_params).max(1)
}

/// Splits `0..len` into contiguous ranges of at most `size` items. The last
/// range may be shorter. Empty input yields no ranges.
pub fn chunk_ranges(len: usize, size: usize) -> impl Iterator<Item = Range<usize>> {
    let size = size.max(1);
    (0..len)
        .step_by(size)
        .map(move |start| start..(start + size).min(len))
}
