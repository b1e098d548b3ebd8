//! Error types for meshgen

use std::collections::TryReserveError;
use thiserror::Error;

/// Main error type for meshgen operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Reconstruction failed: {0}")]
    ReconstructionFailed(String),

    #[error("Allocation failed: {0}")]
    AllocationFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// The error kinds reported across the C boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Length/count mismatch or otherwise malformed input
    InvalidInput,
    /// Degenerate geometry or an empty reconstruction
    ReconstructionFailed,
    /// The output buffer could not be allocated
    AllocationFailed,
}

impl Error {
    /// Collapse the error into one of the boundary error kinds.
    ///
    /// File-layer errors only arise before the pipeline runs, so they are
    /// reported as invalid input.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) | Error::Io(_) | Error::Parse(_) => ErrorKind::InvalidInput,
            Error::ReconstructionFailed(_) => ErrorKind::ReconstructionFailed,
            Error::AllocationFailed(_) => ErrorKind::AllocationFailed,
        }
    }
}

impl From<TryReserveError> for Error {
    fn from(e: TryReserveError) -> Self {
        Error::AllocationFailed(e.to_string())
    }
}

/// Result type alias for meshgen operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::InvalidInput("x".into()).kind(), ErrorKind::InvalidInput);
        assert_eq!(Error::Parse("x".into()).kind(), ErrorKind::InvalidInput);
        assert_eq!(
            Error::ReconstructionFailed("x".into()).kind(),
            ErrorKind::ReconstructionFailed
        );
        assert_eq!(
            Error::AllocationFailed("x".into()).kind(),
            ErrorKind::AllocationFailed
        );
    }

    #[test]
    fn test_try_reserve_maps_to_allocation_failure() {
        let mut v: Vec<u64> = Vec::new();
        let err: Error = v.try_reserve_exact(usize::MAX).unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::AllocationFailed);
    }
}
