//! 2D block distribution of a dense, row-major n x n matrix
use crate::error::{check_dim, JacobiError, Result};
use grid_decomp::functions::broadcast_scalar;
use grid_decomp::{block_size, grid_coords, Block, Collective, ProcessGrid};
use ndarray::prelude::*;

/// Rectangular block of the global matrix owned by one worker
#[derive(Debug, Clone, PartialEq)]
pub struct LocalBlock {
    /// Entries, `rows.sz x cols.sz`
    pub data: Array2<f64>,
    /// Global rows covered
    pub rows: Block,
    /// Global columns covered
    pub cols: Block,
}

impl LocalBlock {
    /// Cut the block `rows x cols` out of a row-major n x n matrix
    pub fn from_global(global: &[f64], n: usize, rows: Block, cols: Block) -> Result<Self> {
        check_dim("matrix", n * n, global.len())?;
        let reach = rows.en.max(cols.en);
        if reach > n {
            return Err(JacobiError::Dimension {
                what: "block range",
                expected: n,
                found: reach,
            });
        }
        let data = Array2::from_shape_fn((rows.sz, cols.sz), |(i, j)| {
            global[(rows.st + i) * n + cols.st + j]
        });
        Ok(Self { data, rows, cols })
    }
}

/// Number of matrix entries per world rank
fn block_counts(n: usize, q: usize) -> Vec<usize> {
    (0..q * q)
        .map(|rank| {
            let (r, c) = grid_coords(rank, q);
            block_size(n, q, r) * block_size(n, q, c)
        })
        .collect()
}

/// Blocks of all ranks laid out one after another, each row-major
fn pack_blocks(global: &[f64], n: usize, q: usize) -> Vec<f64> {
    let mut packed = Vec::with_capacity(n * n);
    for rank in 0..q * q {
        let (r, c) = grid_coords(rank, q);
        let (rows, cols) = (Block::new(n, q, r), Block::new(n, q, c));
        for i in rows.st..rows.en {
            packed.extend_from_slice(&global[i * n + cols.st..i * n + cols.en]);
        }
    }
    packed
}

/// Inverse of `pack_blocks`
fn unpack_blocks(packed: &[f64], n: usize, q: usize) -> Vec<f64> {
    let mut global = vec![0.; n * n];
    let mut offset = 0;
    for rank in 0..q * q {
        let (r, c) = grid_coords(rank, q);
        let (rows, cols) = (Block::new(n, q, r), Block::new(n, q, c));
        for i in rows.st..rows.en {
            global[i * n + cols.st..i * n + cols.en]
                .copy_from_slice(&packed[offset..offset + cols.sz]);
            offset += cols.sz;
        }
    }
    global
}

/// Distribute a row-major n x n matrix held by `root` to the grid.
///
/// Worker `(i, j)` receives the block of global rows `i` and global columns
/// `j`. `global` is only read on `root`; other workers may pass an empty
/// slice. Fails with `Dimension` on every worker if `root` holds a buffer of
/// the wrong size.
pub fn scatter_matrix<C: Collective>(
    grid: &ProcessGrid<C>,
    n: usize,
    global: &[f64],
    root: usize,
) -> Result<LocalBlock> {
    let world = grid.world();
    let mut len = global.len();
    broadcast_scalar(world, root, &mut len)?;
    check_dim("matrix", n * n, len)?;

    let (rows, cols) = (grid.row_block(n), grid.col_block(n));
    let send = if world.is_root(root) {
        pack_blocks(global, n, grid.q)
    } else {
        Vec::new()
    };
    let mut local = vec![0.; rows.sz * cols.sz];
    world.scatter_varcount_into(root, &send, &block_counts(n, grid.q), &mut local)?;

    let found = local.len();
    let data = Array2::from_shape_vec((rows.sz, cols.sz), local).map_err(|_| {
        JacobiError::Dimension {
            what: "matrix block",
            expected: rows.sz * cols.sz,
            found,
        }
    })?;
    log::trace!(
        "worker {} holds rows {:?} x cols {:?}",
        grid.rank(),
        rows,
        cols
    );
    Ok(LocalBlock { data, rows, cols })
}

/// Reassemble the global matrix on `root`, exact inverse of `scatter_matrix`.
///
/// Returns the row-major matrix on `root` and `None` elsewhere.
pub fn gather_matrix<C: Collective>(
    grid: &ProcessGrid<C>,
    n: usize,
    block: &LocalBlock,
    root: usize,
) -> Result<Option<Vec<f64>>> {
    let world = grid.world();
    let expected = grid.row_block(n).sz * grid.col_block(n).sz;
    check_dim("matrix block", expected, block.data.len())?;
    let send: Vec<f64> = block.data.iter().copied().collect();
    let mut packed = vec![0.; if world.is_root(root) { n * n } else { 0 }];
    world.gather_varcount_into(root, &send, &block_counts(n, grid.q), &mut packed)?;
    Ok(if world.is_root(root) {
        Some(unpack_blocks(&packed, n, grid.q))
    } else {
        None
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::distribute::COORDINATOR;
    use grid_decomp::ThreadUniverse;
    use ndarray::array;

    fn numbered(n: usize) -> Vec<f64> {
        (0..n * n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_pack_unpack() {
        for &(n, q) in [(7, 3), (5, 2), (1, 1), (2, 3)].iter() {
            let a = numbered(n);
            assert_eq!(unpack_blocks(&pack_blocks(&a, n, q), n, q), a);
        }
    }

    #[test]
    fn test_scatter_blocks() {
        let n = 5;
        let a = numbered(n);
        let blocks = ThreadUniverse::new(4).run(|world| {
            let grid = ProcessGrid::build(world).unwrap();
            let input = if grid.rank() == COORDINATOR { a.clone() } else { vec![] };
            scatter_matrix(&grid, n, &input, COORDINATOR).unwrap()
        });
        // rows/cols split as [0, 3) and [3, 5)
        assert_eq!(blocks[0].data, array![[0., 1., 2.], [5., 6., 7.], [10., 11., 12.]]);
        assert_eq!(blocks[1].data, array![[3., 4.], [8., 9.], [13., 14.]]);
        assert_eq!(blocks[2].data, array![[15., 16., 17.], [20., 21., 22.]]);
        assert_eq!(blocks[3].data, array![[18., 19.], [23., 24.]]);
        assert_eq!(blocks[3].rows, Block { st: 3, en: 5, sz: 2 });
        for b in blocks.iter() {
            assert_eq!(*b, LocalBlock::from_global(&a, n, b.rows, b.cols).unwrap());
        }
    }

    #[test]
    fn test_from_global_checks_sizes() {
        let a = numbered(3);
        let rows = Block::new(3, 2, 0);
        assert!(LocalBlock::from_global(&a, 3, rows, rows).is_ok());
        assert_eq!(
            LocalBlock::from_global(&a[..7], 3, rows, rows),
            Err(JacobiError::Dimension {
                what: "matrix",
                expected: 9,
                found: 7
            })
        );
        let outside = Block { st: 2, en: 4, sz: 2 };
        assert!(matches!(
            LocalBlock::from_global(&a, 3, rows, outside),
            Err(JacobiError::Dimension { what: "block range", .. })
        ));
    }

    #[test]
    fn test_scatter_gather_roundtrip() {
        for &p in [1, 4, 9].iter() {
            for &n in [1, 2, 7, 10].iter() {
                let a: Vec<f64> = (0..n * n).map(|i| (i as f64).sin()).collect();
                let out = ThreadUniverse::new(p).run(|world| {
                    let grid = ProcessGrid::build(world).unwrap();
                    let input = if grid.rank() == COORDINATOR { a.clone() } else { vec![] };
                    let block = scatter_matrix(&grid, n, &input, COORDINATOR).unwrap();
                    gather_matrix(&grid, n, &block, COORDINATOR).unwrap()
                });
                assert_eq!(out[0].as_ref(), Some(&a));
                assert!(out[1..].iter().all(Option::is_none));
            }
        }
    }

    #[test]
    fn test_wrong_size_fails_on_every_worker() {
        let out = ThreadUniverse::new(4).run(|world| {
            let grid = ProcessGrid::build(world).unwrap();
            let input = if grid.rank() == COORDINATOR { vec![1.; 8] } else { vec![] };
            scatter_matrix(&grid, 3, &input, COORDINATOR).err()
        });
        for e in out {
            assert_eq!(
                e,
                Some(JacobiError::Dimension {
                    what: "matrix",
                    expected: 9,
                    found: 8
                })
            );
        }
    }
}
