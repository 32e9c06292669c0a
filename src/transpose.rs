//! Moving distributed vectors between the column and the row layout
//!
//! The local multiply on worker `(i, j)` needs the entries of `x` matching
//! its *column* block `j`, while vectors are distributed by *row* block on
//! the first grid column. `to_row_axis` bridges the two by routing block
//! `j` over the diagonal worker `(j, j)`; `to_column_axis` sums per-row
//! contributions back onto the first column.
use crate::distribute::{Layout, Segment};
use crate::error::{check_dim, Result};
use grid_decomp::{Collective, ProcessGrid};
use ndarray::prelude::*;

/// Replicate a column-layout vector into the row layout.
///
/// Worker `(j, 0)` forwards block `j` to `(j, j)` inside row `j`, which
/// broadcasts it down column `j`. Afterwards every `(i, j)` holds block
/// `j`, identical for all `i`.
pub fn to_row_axis<C: Collective>(
    grid: &ProcessGrid<C>,
    n: usize,
    x: &Segment,
) -> Result<Segment> {
    let range = grid.col_block(n);
    let mut buf = vec![0.; range.sz];

    if grid.is_first_col() {
        check_dim("column segment", grid.row_block(n).sz, x.len())?;
        if grid.is_diagonal() {
            buf = x.data.to_vec();
        } else {
            // rank inside the row group equals the column index
            grid.row_group().send(grid.row, &x.data.to_vec())?;
        }
    } else if grid.is_diagonal() {
        grid.row_group().receive_into(0, &mut buf)?;
    }
    grid.col_group().broadcast_into(grid.col, &mut buf)?;

    Ok(Segment::new(Array1::from(buf), Layout::Row, range))
}

/// Sum per-worker partial vectors of length `row_block(n).sz` within each
/// grid row; the complete block lands on the first column.
pub fn to_column_axis<C: Collective>(
    grid: &ProcessGrid<C>,
    n: usize,
    partial: &Array1<f64>,
) -> Result<Segment> {
    let range = grid.row_block(n);
    check_dim("partial row vector", range.sz, partial.len())?;
    let send = partial.to_vec();
    let mut sum = vec![0.; if grid.is_first_col() { range.sz } else { 0 }];
    grid.row_group().reduce_sum_into(0, &send, &mut sum)?;
    Ok(if grid.is_first_col() {
        Segment::new(Array1::from(sum), Layout::Column, range)
    } else {
        Segment::empty(Layout::Column)
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::distribute::{scatter_vector, COORDINATOR};
    use grid_decomp::ThreadUniverse;

    #[test]
    fn test_to_row_axis_replicates_column_blocks() {
        let n = 10;
        let x: Vec<f64> = (0..n).map(|i| i as f64 * 0.5).collect();
        for &p in [1, 4, 9].iter() {
            let out = ThreadUniverse::new(p).run(|world| {
                let grid = ProcessGrid::build(world).unwrap();
                let input = if grid.rank() == COORDINATOR { x.clone() } else { vec![] };
                let seg = scatter_vector(&grid, n, &input, COORDINATOR).unwrap();
                let row = to_row_axis(&grid, n, &seg).unwrap();
                (grid.col_block(n), row)
            });
            for (cols, seg) in out {
                assert_eq!(seg.layout, Layout::Row);
                assert_eq!(seg.range, cols);
                assert_eq!(seg.data.to_vec(), x[cols.st..cols.en].to_vec());
            }
        }
    }

    #[test]
    fn test_to_column_axis_sums_rows() {
        let n = 8;
        let out = ThreadUniverse::new(9).run(|world| {
            let grid = ProcessGrid::build(world).unwrap();
            let sz = grid.row_block(n).sz;
            let partial = Array1::from_elem(sz, (grid.col + 1) as f64);
            to_column_axis(&grid, n, &partial).unwrap()
        });
        for (rank, seg) in out.iter().enumerate() {
            if rank % 3 == 0 {
                assert_eq!(seg.layout, Layout::Column);
                assert!(seg.data.iter().all(|&v| v == 6.));
                assert_eq!(seg.len(), grid_decomp::block_size(n, 3, rank / 3));
            } else {
                assert!(seg.is_empty());
            }
        }
    }
}
