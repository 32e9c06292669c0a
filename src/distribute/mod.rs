//! Scatter and gather between the coordinator and the process grid
//!
//! The matrix is split in 2D: worker `(i, j)` owns global rows of block `i`
//! and global columns of block `j`. Vectors are split in 1D along the first
//! grid column: worker `(i, 0)` owns the entries of block `i`, matching the
//! row split of the matrix.
pub mod matrix;
pub mod vector;
pub use matrix::{gather_matrix, scatter_matrix, LocalBlock};
pub use vector::{gather_vector, scatter_vector, Layout, Segment};

/// World rank of the worker holding global input and output
pub const COORDINATOR: usize = 0;
