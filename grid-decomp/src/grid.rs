//! Square q x q arrangement of workers
//!
//! Worker with world rank `rank` sits at row `rank / q` and column
//! `rank % q`. Every worker owns a handle to its row sub-group (all workers
//! of the same row, ranked by column) and to its column sub-group (all
//! workers of the same column, ranked by row).
use crate::blocks::Block;
use crate::comm::Collective;
use crate::error::GridError;

/// Side length of a square grid of `workers` workers
///
/// Pure function of the worker count, so every worker reaches the same
/// verdict without communicating.
pub fn grid_side(workers: usize) -> Result<usize, GridError> {
    let mut q = (workers as f64).sqrt().round() as usize;
    while q * q > workers {
        q -= 1;
    }
    while (q + 1) * (q + 1) <= workers {
        q += 1;
    }
    if workers > 0 && q * q == workers {
        Ok(q)
    } else {
        Err(GridError::NotSquare { workers })
    }
}

/// Grid coordinates `(row, col)` of `rank` in a grid of side `q`
pub fn grid_coords(rank: usize, q: usize) -> (usize, usize) {
    (rank / q, rank % q)
}

/// Process grid with row and column sub-groups
pub struct ProcessGrid<C: Collective> {
    world: C,
    row_comm: C,
    col_comm: C,
    /// Side length
    pub q: usize,
    /// Row coordinate of this worker
    pub row: usize,
    /// Column coordinate of this worker
    pub col: usize,
}

impl<C: Collective> ProcessGrid<C> {
    /// Lay out the workers of `world` on a square grid.
    ///
    /// Fails with `NotSquare` on every worker alike when the world size is
    /// not a perfect square; otherwise splits the world into row and column
    /// sub-groups (a collective over `world`).
    pub fn build(world: C) -> Result<Self, GridError> {
        let q = grid_side(world.size())?;
        let (row, col) = grid_coords(world.rank(), q);
        let row_comm = world.split(row, col)?;
        let col_comm = world.split(col, row)?;
        log::debug!(
            "worker {} placed at ({}, {}) of a {}x{} grid",
            world.rank(),
            row,
            col,
            q,
            q
        );
        Ok(Self {
            world,
            row_comm,
            col_comm,
            q,
            row,
            col,
        })
    }

    /// All workers
    pub fn world(&self) -> &C {
        &self.world
    }

    /// Workers sharing this worker's row; rank inside equals the column
    pub fn row_group(&self) -> &C {
        &self.row_comm
    }

    /// Workers sharing this worker's column; rank inside equals the row
    pub fn col_group(&self) -> &C {
        &self.col_comm
    }

    /// World rank of this worker
    pub fn rank(&self) -> usize {
        self.world.rank()
    }

    /// World rank of the worker at `(row, col)`
    pub fn rank_of(&self, row: usize, col: usize) -> usize {
        row * self.q + col
    }

    /// Is this worker on the first grid column?
    pub fn is_first_col(&self) -> bool {
        self.col == 0
    }

    /// Is this worker on the grid diagonal?
    pub fn is_diagonal(&self) -> bool {
        self.row == self.col
    }

    /// Global rows owned by this worker for an axis of length `n`
    pub fn row_block(&self, n: usize) -> Block {
        Block::new(n, self.q, self.row)
    }

    /// Global columns owned by this worker for an axis of length `n`
    pub fn col_block(&self, n: usize) -> Block {
        Block::new(n, self.q, self.col)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::threads::ThreadUniverse;

    #[test]
    fn test_grid_side() {
        assert_eq!(grid_side(1), Ok(1));
        assert_eq!(grid_side(4), Ok(2));
        assert_eq!(grid_side(25), Ok(5));
        assert_eq!(grid_side(1 << 20), Ok(1 << 10));
        for p in [0, 2, 3, 5, 8, 10, 24].iter() {
            assert_eq!(grid_side(*p), Err(GridError::NotSquare { workers: *p }));
        }
    }

    #[test]
    fn test_grid_groups() {
        let out = ThreadUniverse::new(9).run(|world| {
            let grid = ProcessGrid::build(world).unwrap();
            // sum of world ranks along the row and along the column
            let me = [grid.rank() as f64];
            let mut row_sum = [0.];
            let mut col_sum = [0.];
            grid.row_group().reduce_sum_into(0, &me, &mut row_sum).unwrap();
            grid.col_group().reduce_sum_into(0, &me, &mut col_sum).unwrap();
            (
                grid.row,
                grid.col,
                grid.row_group().rank(),
                grid.col_group().rank(),
                row_sum[0],
                col_sum[0],
            )
        });
        for (rank, &(r, c, rr, cr, row_sum, col_sum)) in out.iter().enumerate() {
            assert_eq!((r, c), grid_coords(rank, 3));
            assert_eq!(rr, c);
            assert_eq!(cr, r);
            if c == 0 {
                assert_eq!(row_sum, (3 * r * 3 + 3) as f64);
            }
            if r == 0 {
                assert_eq!(col_sum, (c * 3 + 9) as f64);
            }
        }
    }

    #[test]
    fn test_non_square_world_fails_everywhere() {
        let out = ThreadUniverse::new(3).run(|world| ProcessGrid::build(world).err());
        assert!(out
            .iter()
            .all(|e| *e == Some(GridError::NotSquare { workers: 3 })));
    }
}
