//! Piecewise-constant injected current.

use thiserror::Error;

/// A point at which the injected current switches to a new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    /// Time at which `current` takes effect, in ms.
    pub threshold: f64,
    /// Injected current from `threshold` until the next breakpoint, in µA/cm².
    pub current: f64,
}

impl Breakpoint {
    #[must_use]
    pub fn new(threshold: f64, current: f64) -> Self {
        Self { threshold, current }
    }
}

/// Selects which side of a switching time a lookup sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lookup {
    /// The value in effect at `t`, so a breakpoint at exactly `t` applies.
    #[default]
    At,
    /// The left limit at `t`, so a breakpoint at exactly `t` does not apply yet.
    Before,
}

/// Errors raised when building a [`StimulusSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ScheduleError {
    #[error("breakpoint {index}: threshold {threshold} is not finite")]
    NonFiniteThreshold { index: usize, threshold: f64 },

    #[error("breakpoint {index}: current {current} is not finite")]
    NonFiniteCurrent { index: usize, current: f64 },

    #[error("breakpoint {index}: threshold {threshold} does not exceed the previous threshold {previous}")]
    NotIncreasing {
        index: usize,
        threshold: f64,
        previous: f64,
    },

    #[error("breakpoint {index}: threshold {threshold} precedes the start time {start}")]
    BeforeStart {
        index: usize,
        threshold: f64,
        start: f64,
    },
}

/// An ordered set of breakpoints defining a step-function current.
///
/// The current is zero before the first breakpoint and holds the value of the
/// most recent breakpoint afterwards. Lookups are independent of any solver
/// step size.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StimulusSchedule {
    breakpoints: Vec<Breakpoint>,
}

impl StimulusSchedule {
    /// Creates a schedule from breakpoints given in time order.
    ///
    /// # Errors
    ///
    /// Fails if any threshold or current is not finite, or if thresholds are
    /// not strictly increasing.
    pub fn new(breakpoints: impl IntoIterator<Item = Breakpoint>) -> Result<Self, ScheduleError> {
        let breakpoints: Vec<_> = breakpoints.into_iter().collect();

        for (index, point) in breakpoints.iter().enumerate() {
            if !point.threshold.is_finite() {
                return Err(ScheduleError::NonFiniteThreshold {
                    index,
                    threshold: point.threshold,
                });
            }
            if !point.current.is_finite() {
                return Err(ScheduleError::NonFiniteCurrent {
                    index,
                    current: point.current,
                });
            }
        }

        if let Some((index, pair)) = breakpoints
            .windows(2)
            .enumerate()
            .find(|(_, pair)| pair[1].threshold <= pair[0].threshold)
        {
            return Err(ScheduleError::NotIncreasing {
                index: index + 1,
                threshold: pair[1].threshold,
                previous: pair[0].threshold,
            });
        }

        Ok(Self { breakpoints })
    }

    /// Checks that no breakpoint lies before `start`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::BeforeStart`] naming the first breakpoint
    /// whose threshold is earlier than `start`.
    pub fn check_start(&self, start: f64) -> Result<(), ScheduleError> {
        match self.breakpoints.first() {
            Some(first) if first.threshold < start => Err(ScheduleError::BeforeStart {
                index: 0,
                threshold: first.threshold,
                start,
            }),
            _ => Ok(()),
        }
    }

    /// A schedule that never injects any current.
    #[must_use]
    pub fn silent() -> Self {
        Self::default()
    }

    /// Returns the breakpoints in time order.
    #[must_use]
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Returns the current in effect at time `t`.
    ///
    /// A breakpoint whose threshold equals `t` is already in effect.
    #[must_use]
    pub fn current_at(&self, t: f64) -> f64 {
        let index = self.breakpoints.partition_point(|b| b.threshold <= t);
        self.current_before_index(index)
    }

    /// Returns the left limit of the current at time `t`.
    ///
    /// A breakpoint whose threshold equals `t` is not yet in effect.
    #[must_use]
    pub fn current_before(&self, t: f64) -> f64 {
        let index = self.breakpoints.partition_point(|b| b.threshold < t);
        self.current_before_index(index)
    }

    /// Returns the current at `t` as seen from the side chosen by `lookup`.
    #[must_use]
    pub fn current(&self, t: f64, lookup: Lookup) -> f64 {
        match lookup {
            Lookup::At => self.current_at(t),
            Lookup::Before => self.current_before(t),
        }
    }

    fn current_before_index(&self, index: usize) -> f64 {
        index
            .checked_sub(1)
            .map_or(0.0, |last| self.breakpoints[last].current)
    }
}
