//! Error types of the transport and grid layer
use thiserror::Error;

/// Failure of a blocking collective
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommError {
    /// The peer worker hung up before the exchange completed
    #[error("worker {peer} disconnected during a collective")]
    Disconnected { peer: usize },

    /// Buffer size does not agree between the members of a collective
    #[error("buffer length mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// Rank outside of the communicator
    #[error("rank {rank} is not a member of a group of size {size}")]
    InvalidRank { rank: usize, size: usize },

    /// Splitting a communicator into sub-groups failed
    #[error("communicator split failed: {0}")]
    Split(String),
}

/// Failure to lay out a square process grid
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    /// Number of workers is not q*q
    #[error("the number of workers must be a perfect square, got {workers}")]
    NotSquare { workers: usize },

    #[error(transparent)]
    Comm(#[from] CommError),
}
