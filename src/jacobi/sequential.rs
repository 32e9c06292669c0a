//! Single worker Jacobi iteration
//!
//! Reference implementation without any distribution. The distributed
//! solver agrees with it within tolerance, not bit for bit, since the order
//! of floating point reductions depends on the grid size.
use super::monitor::{Monitor, SolveReport, Solver, Status};
use crate::config::JacobiConfig;
use crate::error::{check_dim, JacobiError, Result};
use crate::utils::inf_norm;
use ndarray::prelude::*;

/// Diagonal of a square matrix and a copy with the diagonal zeroed
pub(crate) fn split_diagonal(a: &ArrayView2<f64>) -> (Array1<f64>, Array2<f64>) {
    let d = a.diag().to_owned();
    let mut r = a.to_owned();
    r.diag_mut().fill(0.);
    (d, r)
}

/// Solve the row-major n x n system `a x = b`; writes the solution to `x`.
///
/// ```
/// use jacobi_grid::{solve_sequential, JacobiConfig};
///
/// let a = [4., 1., 2., 5.];
/// let b = [5., 7.];
/// let mut x = [0.; 2];
/// let report = solve_sequential(2, &a, &b, &mut x, &JacobiConfig::default()).unwrap();
/// assert!(report.converged());
/// assert!((x[0] - 1.).abs() < 1e-9 && (x[1] - 1.).abs() < 1e-9);
/// ```
pub fn solve_sequential(
    n: usize,
    a: &[f64],
    b: &[f64],
    x: &mut [f64],
    config: &JacobiConfig,
) -> Result<SolveReport> {
    config.validate()?;
    check_dim("matrix", n * n, a.len())?;
    check_dim("vector", n, b.len())?;
    check_dim("solution", n, x.len())?;
    let a = ArrayView2::from_shape((n, n), a).map_err(|_| JacobiError::Dimension {
        what: "matrix",
        expected: n * n,
        found: a.len(),
    })?;
    let b = ArrayView1::from(b);

    let (d, r) = split_diagonal(&a);
    let mut monitor = Monitor::new(config, n, inf_norm(&b));
    let mut xk = Array1::<f64>::zeros(n);
    let mut iteration = 0;
    loop {
        iteration += 1;
        xk = (&b - &r.dot(&xk)) / &d;
        let residual = inf_norm(&(a.dot(&xk) - &b));
        let diverged = monitor.diverging(residual);
        log::debug!("iteration {:>5}: residual {:.3e}", iteration, residual);

        match monitor.status(iteration, residual, diverged) {
            Status::Continue => {}
            Status::Diverged => {
                log::error!("diverged after {} iterations", iteration);
                return Err(JacobiError::Diverged {
                    iteration,
                    residual,
                });
            }
            Status::Done(termination) => {
                for (dst, src) in x.iter_mut().zip(xk.iter()) {
                    *dst = *src;
                }
                let report = SolveReport {
                    iterations: iteration,
                    residual,
                    termination,
                    solver: Solver::Sequential,
                };
                super::log_report(&report);
                return Ok(report);
            }
        }
    }
}
