use thiserror::Error;

/// Configuration for the Dormand–Prince solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    abs_tol: f64,
    rel_tol: f64,
    min_step: f64,
    max_substeps: usize,
}

/// Errors that can occur when validating a Dormand–Prince config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("abs_tol must be finite and non-negative")]
    AbsTol,

    #[error("rel_tol must be finite and non-negative")]
    RelTol,

    #[error("abs_tol and rel_tol cannot both be zero")]
    ZeroTolerance,

    #[error("min_step must be finite and positive")]
    MinStep,

    #[error("max_substeps must be at least one")]
    MaxSubsteps,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1e-8, 1e-6, 1e-10, 100_000).unwrap()
    }
}

impl Config {
    /// Creates a new config with validated tolerances and limits.
    ///
    /// The local error of a substep is accepted when, for every component,
    /// `|y5 - y4| <= abs_tol + rel_tol * max(|y|, |y5|)`.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance is negative or non-finite, if both
    /// tolerances are zero, if `min_step` is not positive, or if
    /// `max_substeps` is zero.
    pub fn new(
        abs_tol: f64,
        rel_tol: f64,
        min_step: f64,
        max_substeps: usize,
    ) -> Result<Self, ConfigError> {
        if !abs_tol.is_finite() || abs_tol < 0.0 {
            return Err(ConfigError::AbsTol);
        }
        if !rel_tol.is_finite() || rel_tol < 0.0 {
            return Err(ConfigError::RelTol);
        }
        if abs_tol == 0.0 && rel_tol == 0.0 {
            return Err(ConfigError::ZeroTolerance);
        }
        if !min_step.is_finite() || min_step <= 0.0 {
            return Err(ConfigError::MinStep);
        }
        if max_substeps == 0 {
            return Err(ConfigError::MaxSubsteps);
        }

        Ok(Self {
            abs_tol,
            rel_tol,
            min_step,
            max_substeps,
        })
    }

    #[must_use]
    pub fn abs_tol(&self) -> f64 {
        self.abs_tol
    }

    #[must_use]
    pub fn rel_tol(&self) -> f64 {
        self.rel_tol
    }

    /// Smallest substep the controller may shrink to.
    #[must_use]
    pub fn min_step(&self) -> f64 {
        self.min_step
    }

    /// Most substep attempts, accepted or rejected, allowed per sample.
    #[must_use]
    pub fn max_substeps(&self) -> usize {
        self.max_substeps
    }
}
