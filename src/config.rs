//! Solver settings
//!
//! Deserializable from toml, missing keys fall back to the defaults:
//! ```toml
//! tolerance = 1e-10
//! max_iterations = 1000
//! divergence_factor = 1e8
//! divergence_patience = 3
//! ```
use crate::error::{JacobiError, Result};
use serde::Deserialize;

/// Termination settings shared by the sequential and distributed solver
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct JacobiConfig {
    /// Converged once `|Ax - b|_inf < tolerance * max(1, n)`
    pub tolerance: f64,
    /// Stop (without error) after this many iterations
    pub max_iterations: usize,
    /// Residual bound, relative to `max(1, |b|_inf)`, beyond which an
    /// iteration counts as diverging
    pub divergence_factor: f64,
    /// Consecutive diverging iterations before giving up
    pub divergence_patience: usize,
}

impl Default for JacobiConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 1000,
            divergence_factor: 1e8,
            divergence_patience: 3,
        }
    }
}

impl JacobiConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_divergence(mut self, factor: f64, patience: usize) -> Self {
        self.divergence_factor = factor;
        self.divergence_patience = patience;
        self
    }

    /// Parse toml settings and validate them
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| JacobiError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Residual threshold for a system of size `n`
    pub fn threshold(&self, n: usize) -> f64 {
        self.tolerance * n.max(1) as f64
    }

    /// Reject settings under which the iteration cannot terminate sensibly
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.) {
            return Err(JacobiError::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(JacobiError::InvalidConfig(
                "max_iterations must be at least 1".into(),
            ));
        }
        if !(self.divergence_factor > 1.) {
            return Err(JacobiError::InvalidConfig(format!(
                "divergence_factor must exceed 1, got {}",
                self.divergence_factor
            )));
        }
        if self.divergence_patience == 0 {
            return Err(JacobiError::InvalidConfig(
                "divergence_patience must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
