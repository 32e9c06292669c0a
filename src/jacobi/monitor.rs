//! Termination rules shared by the sequential and the distributed solver
use crate::config::JacobiConfig;

/// How a successful solve ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Residual dropped below the threshold
    Converged,
    /// Iteration cap reached; the solution is the last iterate
    MaxIterations,
}

/// Which solver produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solver {
    /// Single worker, no communication
    Sequential,
    /// Process grid of side `q`
    Grid { q: usize },
}

/// Outcome of a successful solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    /// Number of performed iterations
    pub iterations: usize,
    /// Infinity norm of `Ax - b` for the returned `x`
    pub residual: f64,
    pub termination: Termination,
    pub solver: Solver,
}

impl SolveReport {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// Verdict after one iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Status {
    Continue,
    Diverged,
    Done(Termination),
}

/// Tracks residuals across iterations
#[derive(Debug, Clone)]
pub(crate) struct Monitor {
    threshold: f64,
    bound: f64,
    patience: usize,
    max_iterations: usize,
    strikes: usize,
}

impl Monitor {
    /// `b_norm` is the infinity norm of the right hand side
    pub fn new(config: &JacobiConfig, n: usize, b_norm: f64) -> Self {
        Self {
            threshold: config.threshold(n),
            bound: config.divergence_factor * b_norm.max(1.),
            patience: config.divergence_patience,
            max_iterations: config.max_iterations,
            strikes: 0,
        }
    }

    /// Local divergence predicate; call exactly once per iteration
    pub fn diverging(&mut self, residual: f64) -> bool {
        if !residual.is_finite() {
            return true;
        }
        if residual > self.bound {
            self.strikes += 1;
        } else {
            self.strikes = 0;
        }
        self.strikes >= self.patience
    }

    /// `diverged` is the group-wide verdict of `diverging`
    pub fn status(&self, iteration: usize, residual: f64, diverged: bool) -> Status {
        if diverged {
            Status::Diverged
        } else if residual < self.threshold {
            Status::Done(Termination::Converged)
        } else if iteration >= self.max_iterations {
            Status::Done(Termination::MaxIterations)
        } else {
            Status::Continue
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_monitor_converges() {
        let monitor = Monitor::new(&JacobiConfig::default(), 10, 1.);
        assert_eq!(monitor.status(1, 1e-3, false), Status::Continue);
        assert_eq!(monitor.status(2, 1e-12, false), Status::Done(Termination::Converged));
    }

    #[test]
    fn test_monitor_cap() {
        let config = JacobiConfig::default().with_max_iterations(5);
        let monitor = Monitor::new(&config, 10, 1.);
        assert_eq!(monitor.status(4, 1., false), Status::Continue);
        assert_eq!(monitor.status(5, 1., false), Status::Done(Termination::MaxIterations));
        // convergence wins over the cap
        assert_eq!(monitor.status(5, 0., false), Status::Done(Termination::Converged));
    }

    #[test]
    fn test_monitor_divergence_needs_consecutive_strikes() {
        let config = JacobiConfig::default().with_divergence(10., 2);
        let mut monitor = Monitor::new(&config, 4, 2.);
        assert!(!monitor.diverging(25.));
        assert!(!monitor.diverging(5.));
        assert!(!monitor.diverging(25.));
        assert!(monitor.diverging(25.));
    }

    #[test]
    fn test_monitor_non_finite_diverges_at_once() {
        let mut monitor = Monitor::new(&JacobiConfig::default(), 4, 1.);
        assert!(monitor.diverging(f64::NAN));
        assert!(monitor.diverging(f64::INFINITY));
        assert_eq!(monitor.status(1, f64::NAN, true), Status::Diverged);
    }
}
