//! Jacobi iteration on a q x q process grid
//!
//! $$
//! x^{(k+1)} = D^{-1} (b - R x^{(k)}),
//! $$
//! where $D$ is the diagonal of $A$ and $R = A - D$. Every worker keeps its
//! block of $A$ and of $R$; $b$, $D$ and the iterate live on the first grid
//! column. All workers run the iterations in lockstep and leave the loop in
//! the same iteration.
use super::monitor::{Monitor, SolveReport, Solver, Status};
use crate::config::JacobiConfig;
use crate::distribute::{
    gather_vector, scatter_matrix, scatter_vector, Layout, LocalBlock, Segment, COORDINATOR,
};
use crate::error::{check_dim, JacobiError, Result};
use crate::matvec::{distributed_matvec, multiply};
use crate::transpose::{to_column_axis, to_row_axis};
use crate::utils::inf_norm;
use grid_decomp::functions::broadcast_scalar;
use grid_decomp::{Collective, ProcessGrid};
use ndarray::prelude::*;

/// Split off the entries of `block` lying on the global diagonal.
///
/// Returns a vector of length `rows.sz` holding those entries at their
/// local row (zero elsewhere) and the block with them zeroed. No
/// communication; diagonal entries may sit on any worker whose row and
/// column ranges overlap.
pub fn split_block_diagonal(block: &LocalBlock) -> (Array1<f64>, LocalBlock) {
    let mut partial = Array1::zeros(block.rows.sz);
    let mut r = block.clone();
    let shared = block.rows.intersect(&block.cols);
    for g in shared.st..shared.en {
        let (i, j) = (g - block.rows.st, g - block.cols.st);
        partial[i] = block.data[[i, j]];
        r.data[[i, j]] = 0.;
    }
    (partial, r)
}

/// Maximum of a local norm over all workers.
///
/// NaN is folded into +inf first, so that every transport reduces it the
/// same way.
fn global_max<C: Collective>(grid: &ProcessGrid<C>, local: f64) -> Result<f64> {
    let local = if local.is_nan() { f64::INFINITY } else { local };
    Ok(grid.world().all_reduce_max(local)?)
}

/// Iteration state of one worker
pub struct DistributedJacobi<'g, C: Collective> {
    grid: &'g ProcessGrid<C>,
    n: usize,
    a: LocalBlock,
    r: LocalBlock,
    /// Diagonal, column layout
    d: Segment,
    /// Right hand side, column layout
    b: Segment,
    /// Current iterate, column layout
    x: Segment,
    monitor: Monitor,
    iteration: usize,
    residual: f64,
}

impl<'g, C: Collective> DistributedJacobi<'g, C> {
    /// Set up the iteration from the distributed matrix and right hand side.
    ///
    /// Collective over the grid: the diagonal is summed onto the first
    /// column once, and the norm of `b` is shared with every worker.
    pub fn new(
        grid: &'g ProcessGrid<C>,
        n: usize,
        a: LocalBlock,
        b: Segment,
        config: &JacobiConfig,
    ) -> Result<Self> {
        let (partial, r) = split_block_diagonal(&a);
        let d = to_column_axis(grid, n, &partial)?;

        let local_b = if grid.is_first_col() { inf_norm(&b.data) } else { 0. };
        let b_norm = global_max(grid, local_b)?;

        let x = if grid.is_first_col() {
            Segment::new(Array1::zeros(b.len()), Layout::Column, b.range)
        } else {
            Segment::empty(Layout::Column)
        };
        Ok(Self {
            grid,
            n,
            a,
            r,
            d,
            b,
            x,
            monitor: Monitor::new(config, n, b_norm),
            iteration: 0,
            residual: f64::INFINITY,
        })
    }

    /// Advance by one iteration; every worker returns the same status
    pub(crate) fn step(&mut self) -> Result<Status> {
        let (grid, n) = (self.grid, self.n);
        self.iteration += 1;

        let x_row = to_row_axis(grid, n, &self.x)?;
        let rx = multiply(grid, n, &self.r, &x_row)?;
        if grid.is_first_col() {
            let next = (&self.b.data - &rx.data) / &self.d.data;
            self.x = Segment::new(next, Layout::Column, self.x.range);
        }

        // infinity norm of A x - b
        let ax = distributed_matvec(grid, n, &self.a, &self.x)?;
        let local = if grid.is_first_col() {
            inf_norm(&(&ax.data - &self.b.data))
        } else {
            0.
        };
        self.residual = global_max(grid, local)?;

        let diverged = grid
            .world()
            .all_reduce_or(self.monitor.diverging(self.residual))?;
        if grid.rank() == COORDINATOR {
            log::debug!(
                "iteration {:>5}: residual {:.3e}",
                self.iteration,
                self.residual
            );
        }
        Ok(self.monitor.status(self.iteration, self.residual, diverged))
    }

    /// Iterate until convergence, the iteration cap or divergence.
    ///
    /// Returns the final iterate in column layout.
    pub fn run(mut self) -> Result<(Segment, SolveReport)> {
        loop {
            match self.step()? {
                Status::Continue => {}
                Status::Diverged => {
                    if self.grid.rank() == COORDINATOR {
                        log::error!("diverged after {} iterations", self.iteration);
                    }
                    return Err(JacobiError::Diverged {
                        iteration: self.iteration,
                        residual: self.residual,
                    });
                }
                Status::Done(termination) => {
                    let report = SolveReport {
                        iterations: self.iteration,
                        residual: self.residual,
                        termination,
                        solver: Solver::Grid { q: self.grid.q },
                    };
                    if self.grid.rank() == COORDINATOR {
                        super::log_report(&report);
                    }
                    return Ok((self.x, report));
                }
            }
        }
    }
}

/// Solve the row-major n x n system `a x = b` on a process grid.
///
/// Collective over the grid. `a`, `b` and `x` are significant only on the
/// coordinator (world rank 0), other workers may pass empty slices. On
/// success the solution is written to `x` on the coordinator. Size errors
/// and divergence are reported on every worker alike.
pub fn solve_distributed<C: Collective>(
    n: usize,
    a: &[f64],
    b: &[f64],
    x: &mut [f64],
    grid: &ProcessGrid<C>,
    config: &JacobiConfig,
) -> Result<SolveReport> {
    config.validate()?;
    let mut len = x.len();
    broadcast_scalar(grid.world(), COORDINATOR, &mut len)?;
    check_dim("solution", n, len)?;

    let block = scatter_matrix(grid, n, a, COORDINATOR)?;
    let b = scatter_vector(grid, n, b, COORDINATOR)?;
    let (solution, report) = DistributedJacobi::new(grid, n, block, b, config)?.run()?;

    if let Some(global) = gather_vector(grid, n, &solution, COORDINATOR)? {
        x.copy_from_slice(&global);
    }
    Ok(report)
}
