//! 1D block distribution of a length-n vector along the first grid column
use crate::error::{check_dim, Result};
use grid_decomp::functions::broadcast_scalar;
use grid_decomp::{block_sizes, grid_coords, Block, CommError, Collective, ProcessGrid};
use ndarray::prelude::*;

/// Placement of a distributed vector on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Held by the first grid column; worker `(i, 0)` owns block `i`
    Column,
    /// Replicated down every grid column; worker `(i, j)` owns block `j`
    Row,
}

/// Part of a distributed vector held by one worker
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub data: Array1<f64>,
    pub layout: Layout,
    /// Global indices covered; empty on workers outside the layout
    pub range: Block,
}

impl Segment {
    pub fn new(data: Array1<f64>, layout: Layout, range: Block) -> Self {
        Self {
            data,
            layout,
            range,
        }
    }

    /// Placeholder on a worker that holds no part of the vector
    pub fn empty(layout: Layout) -> Self {
        Self::new(Array1::zeros(0), layout, Block::empty(0))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Row of the first-column worker `root`; fails if `root` is elsewhere
pub(crate) fn first_col_root<C: Collective>(grid: &ProcessGrid<C>, root: usize) -> Result<usize> {
    let (root_row, root_col) = grid_coords(root, grid.q);
    if root_col != 0 || root_row >= grid.q {
        return Err(CommError::InvalidRank {
            rank: root,
            size: grid.q,
        }
        .into());
    }
    Ok(root_row)
}

/// Distribute a length-n vector held by `root` along the first grid column.
///
/// `root` must be a first-column worker. Worker `(i, 0)` receives block `i`
/// of the row split of the matrix; every other worker gets an empty
/// segment. Fails with `Dimension` on every worker if `root` holds a buffer
/// of the wrong size.
pub fn scatter_vector<C: Collective>(
    grid: &ProcessGrid<C>,
    n: usize,
    global: &[f64],
    root: usize,
) -> Result<Segment> {
    let root_row = first_col_root(grid, root)?;
    let mut len = global.len();
    broadcast_scalar(grid.world(), root, &mut len)?;
    check_dim("vector", n, len)?;

    if !grid.is_first_col() {
        return Ok(Segment::empty(Layout::Column));
    }
    let range = grid.row_block(n);
    let mut local = vec![0.; range.sz];
    grid.col_group()
        .scatter_varcount_into(root_row, global, &block_sizes(n, grid.q), &mut local)?;
    Ok(Segment::new(Array1::from(local), Layout::Column, range))
}

/// Collect a column-layout vector on `root`, inverse of `scatter_vector`.
///
/// Returns the full vector on `root` and `None` elsewhere.
pub fn gather_vector<C: Collective>(
    grid: &ProcessGrid<C>,
    n: usize,
    segment: &Segment,
    root: usize,
) -> Result<Option<Vec<f64>>> {
    let root_row = first_col_root(grid, root)?;
    if !grid.is_first_col() {
        return Ok(None);
    }
    check_dim("vector segment", grid.row_block(n).sz, segment.len())?;
    let is_root = grid.col_group().is_root(root_row);
    let mut global = vec![0.; if is_root { n } else { 0 }];
    let send = segment.data.to_vec();
    grid.col_group()
        .gather_varcount_into(root_row, &send, &block_sizes(n, grid.q), &mut global)?;
    Ok(if is_root { Some(global) } else { None })
}
