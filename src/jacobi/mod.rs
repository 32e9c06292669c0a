//! # Jacobi solver
//!
//! Sequential reference solver and its distributed counterpart on a
//! square process grid. Both share the termination rules in `monitor`.
mod distributed;
mod monitor;
mod sequential;

pub use distributed::{solve_distributed, split_block_diagonal, DistributedJacobi};
pub use monitor::{SolveReport, Solver, Termination};
pub use sequential::solve_sequential;

/// Log the outcome of a successful solve
pub(crate) fn log_report(report: &SolveReport) {
    match report.termination {
        Termination::Converged => log::info!(
            "converged after {} iterations, residual {:.3e}",
            report.iterations,
            report.residual
        ),
        Termination::MaxIterations => log::warn!(
            "no convergence within {} iterations, residual {:.3e}",
            report.iterations,
            report.residual
        ),
    }
}
