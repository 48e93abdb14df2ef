use hhsim_core::constraint::{Constrained, ConstraintError, StrictlyPositive};
use thiserror::Error;
use uom::si::{f64::Time, time::millisecond};

/// Upper bound on the number of samples a span may produce.
pub const MAX_SAMPLES: usize = 100_000_000;

/// Fraction of a step within which a time is considered to be on the grid.
const SNAP_TOLERANCE: f64 = 1e-6;

/// Errors raised when building a [`TimeSpan`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TimeSpanError {
    #[error("start and end times must be finite")]
    NonFinite,

    #[error("end time {end} must be after start time {start}")]
    EmptySpan { start: f64, end: f64 },

    #[error("time step: {0}")]
    Step(#[source] ConstraintError),

    #[error("span of {samples} samples exceeds the limit of {max}", max = MAX_SAMPLES)]
    TooManySamples { samples: f64 },
}

/// A half-open interval `[start, end)` sampled every `step` ms.
///
/// Sample `k` lies at `start + k * step`. Times are always computed from the
/// index, never accumulated, so every run sees exactly the same grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    start: f64,
    end: f64,
    step: Constrained<f64, StrictlyPositive>,
    samples: usize,
}

impl TimeSpan {
    /// Creates a span from times in ms.
    ///
    /// # Errors
    ///
    /// Fails if a time is not finite, if `end <= start`, if `step` is not
    /// strictly positive and finite, or if the span holds too many samples.
    pub fn new(start: f64, end: f64, step: f64) -> Result<Self, TimeSpanError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(TimeSpanError::NonFinite);
        }
        if end <= start {
            return Err(TimeSpanError::EmptySpan { start, end });
        }
        let step = StrictlyPositive::new(step).map_err(TimeSpanError::Step)?;

        let samples = ((end - start) / step.get()).ceil().max(1.0);
        if samples > MAX_SAMPLES as f64 {
            return Err(TimeSpanError::TooManySamples { samples });
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mut samples = samples as usize;

        // The division can round up past a grid point that equals `end`.
        #[allow(clippy::cast_precision_loss)]
        while samples > 1 && start + (samples - 1) as f64 * step.get() >= end {
            samples -= 1;
        }

        Ok(Self {
            start,
            end,
            step,
            samples,
        })
    }

    /// Creates a span from typed time quantities.
    ///
    /// # Errors
    ///
    /// See [`TimeSpan::new`].
    pub fn from_quantities(start: Time, end: Time, step: Time) -> Result<Self, TimeSpanError> {
        Self::new(
            start.get::<millisecond>(),
            end.get::<millisecond>(),
            step.get::<millisecond>(),
        )
    }

    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step.get()
    }

    /// Number of samples in `[start, end)`, including the one at `start`.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Time of sample `k`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn time_at(&self, k: usize) -> f64 {
        self.start + k as f64 * self.step()
    }

    /// Iterates over every sample time.
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.samples).map(|k| self.time_at(k))
    }

    /// Moves `t` onto the nearest grid time if it is within rounding distance.
    ///
    /// Times between grid points are returned unchanged.
    #[must_use]
    pub fn snap(&self, t: f64) -> f64 {
        let k = ((t - self.start) / self.step()).round();
        if k < 0.0 || !k.is_finite() {
            return t;
        }
        let grid = self.start + k * self.step();
        if (t - grid).abs() <= SNAP_TOLERANCE * self.step() {
            grid
        } else {
            t
        }
    }
}
