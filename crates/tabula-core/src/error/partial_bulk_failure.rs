use super::Error;
use std::ops::Range;

/// How far a chunked bulk write got before one of its statements failed.
///
/// Chunks are independent statements: everything in `committed` is persisted,
/// nothing in `uncommitted` is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkProgress {
    /// Number of chunks that executed successfully.
    pub completed_chunks: usize,

    /// Indices of the input records that were written.
    pub committed: Range<usize>,

    /// Indices of the input records that were not written.
    pub uncommitted: Range<usize>,
}

#[derive(Debug)]
pub(super) struct PartialBulkFailureError {
    progress: BulkProgress,
}

impl std::error::Error for PartialBulkFailureError {}

impl core::fmt::Display for PartialBulkFailureError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let BulkProgress {
            completed_chunks,
            uncommitted,
            ..
        } = &self.progress;
        write!(
            f,
            "bulk write failed after {completed_chunks} chunk(s); records {}..{} were not written",
            uncommitted.start, uncommitted.end
        )
    }
}

impl Error {
    /// Creates a partial bulk failure error. Attach the failing statement's
    /// error with [`Error::context`].
    pub fn partial_bulk_failure(progress: BulkProgress) -> Error {
        Error::from(super::ErrorKind::PartialBulkFailure(
            PartialBulkFailureError { progress },
        ))
    }

    /// Returns `true` if this error is a partial bulk failure.
    pub fn is_partial_bulk_failure(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::PartialBulkFailure(_))
    }

    /// Returns the progress made by a failed bulk write.
    pub fn bulk_progress(&self) -> Option<&BulkProgress> {
        match self.kind() {
            super::ErrorKind::PartialBulkFailure(err) => Some(&err.progress),
            _ => None,
        }
    }
}
