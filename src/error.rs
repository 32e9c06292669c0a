//! Errors of the Jacobi solver
use grid_decomp::{CommError, GridError};
use thiserror::Error;

/// Fatal solver conditions; reaching the iteration cap is not one of them
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JacobiError {
    /// Worker count does not form a square grid
    #[error("the number of workers must be a perfect square, got {workers}")]
    Config { workers: usize },

    /// Solver settings out of range
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),

    /// Input buffer inconsistent with the system size
    #[error("{what} has {found} entries, expected {expected}")]
    Dimension {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Residual blew up; the matrix is most likely not diagonally dominant
    #[error("jacobi iteration diverged at iteration {iteration} (residual {residual:e})")]
    Diverged { iteration: usize, residual: f64 },

    #[error(transparent)]
    Comm(#[from] CommError),
}

impl From<GridError> for JacobiError {
    fn from(e: GridError) -> Self {
        match e {
            GridError::NotSquare { workers } => JacobiError::Config { workers },
            GridError::Comm(e) => JacobiError::Comm(e),
        }
    }
}

/// Result alias of this crate
pub type Result<T> = std::result::Result<T, JacobiError>;

/// Fail with `Dimension` unless `found == expected`
pub(crate) fn check_dim(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(JacobiError::Dimension {
            what,
            expected,
            found,
        })
    }
}
