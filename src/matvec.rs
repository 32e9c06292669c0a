//! Matrix-vector product with a 2D block distributed matrix
//!
//! $$
//! y_i = \sum_j M_{ij} x_j
//! $$
//! Worker `(i, j)` computes the partial product $M_{ij} x_j$ locally, the
//! row sub-group of row `i` sums the partials onto `(i, 0)`. Communication
//! per product is one broadcast and one reduction per grid row/column, so
//! it grows with `q`, not with `n`.
use crate::distribute::{Layout, LocalBlock, Segment};
use crate::error::{check_dim, Result};
use crate::transpose::{to_column_axis, to_row_axis};
use grid_decomp::{Collective, ProcessGrid};
use ndarray::prelude::*;

/// Dense product of the local block with the matching row-layout segment
pub fn local_multiply(block: &LocalBlock, x: &Segment) -> Result<Array1<f64>> {
    debug_assert_eq!(x.layout, Layout::Row);
    check_dim("row segment", block.cols.sz, x.len())?;
    Ok(block.data.dot(&x.data))
}

/// $y = M x$ for `x` in row layout; `y` ends up in column layout
pub fn multiply<C: Collective>(
    grid: &ProcessGrid<C>,
    n: usize,
    block: &LocalBlock,
    x: &Segment,
) -> Result<Segment> {
    let partial = local_multiply(block, x)?;
    to_column_axis(grid, n, &partial)
}

/// $y = M x$ with both `x` and `y` in column layout
pub fn distributed_matvec<C: Collective>(
    grid: &ProcessGrid<C>,
    n: usize,
    block: &LocalBlock,
    x: &Segment,
) -> Result<Segment> {
    let x_row = to_row_axis(grid, n, x)?;
    multiply(grid, n, block, &x_row)
}
