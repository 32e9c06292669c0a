//! # jacobi-grid
//!
//! Dense linear solver for
//! $$
//! A x = b,
//! $$
//! with a diagonally dominant $A$, based on the Jacobi iteration. The matrix
//! is split into a q x q grid of blocks, one per worker, so that memory and
//! work per worker shrink with the square of the grid side.
//!
//! Workers talk through the blocking collectives of [`grid_decomp`]; run
//! them as threads of one process with [`ThreadUniverse`] or as mpi
//! processes with feature `mpi`.
//!
//! ```
//! use jacobi_grid::{solve, Collective, JacobiConfig, ThreadUniverse};
//!
//! let a = [4., 1., 0., 0., 1., 4., 1., 0., 0., 1., 4., 1., 0., 0., 1., 4.];
//! let b = [5., 6., 6., 5.];
//! let solutions = ThreadUniverse::new(4).run(|world| {
//!     let root = world.rank() == 0;
//!     let (a, b) = if root { (&a[..], &b[..]) } else { (&[][..], &[][..]) };
//!     let mut x = vec![0.; if root { 4 } else { 0 }];
//!     solve(4, a, b, &mut x, world, &JacobiConfig::default()).unwrap();
//!     x
//! });
//! for v in &solutions[0] {
//!     assert!((v - 1.).abs() < 1e-9);
//! }
//! ```
pub mod config;
pub mod distribute;
pub mod error;
pub mod io;
pub mod jacobi;
pub mod matvec;
pub mod transpose;
pub mod utils;

pub use config::JacobiConfig;
pub use error::{JacobiError, Result};
pub use grid_decomp::{Collective, ProcessGrid, ThreadComm, ThreadUniverse};
pub use jacobi::{solve_distributed, solve_sequential, SolveReport, Solver, Termination};

/// Solve the row-major n x n system `a x = b` with all workers of `world`.
///
/// Collective: every worker of `world` must call it. Input and output are
/// significant only on world rank 0. A single worker falls back to the
/// sequential solver; otherwise the worker count must be a perfect square.
pub fn solve<C: Collective>(
    n: usize,
    a: &[f64],
    b: &[f64],
    x: &mut [f64],
    world: C,
    config: &JacobiConfig,
) -> Result<SolveReport> {
    if world.size() == 1 {
        log::warn!("single worker, running the sequential solver");
        return solve_sequential(n, a, b, x, config);
    }
    let grid = ProcessGrid::build(world)?;
    if grid.rank() == distribute::COORDINATOR {
        log::info!("solving n = {} on a {} x {} grid", n, grid.q, grid.q);
    }
    solve_distributed(n, a, b, x, &grid, config)
}
