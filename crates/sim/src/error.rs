use std::{fmt, io, path::PathBuf};

use hhsim_membrane::{MembraneState, ParameterError, ScheduleError, StateError, TimeSpanError};
use hhsim_solvers::transient::{self, dopri5};
use thiserror::Error;

use crate::Trajectory;

/// Invalid or unreadable configuration, detected before integration starts.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid membrane parameters: {0}")]
    Parameters(#[from] ParameterError),

    #[error("invalid initial state: {0}")]
    InitialState(#[from] StateError),

    #[error("invalid stimulus schedule: {0}")]
    Stimulus(#[from] ScheduleError),

    #[error("invalid time span: {0}")]
    TimeSpan(#[from] TimeSpanError),

    #[error("invalid solver settings: {0}")]
    Solver(#[from] dopri5::ConfigError),

    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why integration could not continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstabilityCause {
    /// The state or a derived current became NaN or infinite.
    NonFinite,
    /// The adaptive solver could not meet its tolerance above the minimum step.
    StepSizeUnderflow,
    /// The adaptive solver needed too many substeps for one sample.
    SubstepLimit,
}

impl fmt::Display for InstabilityCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InstabilityCause::NonFinite => "non-finite state",
            InstabilityCause::StepSizeUnderflow => "step size underflow",
            InstabilityCause::SubstepLimit => "substep limit exceeded",
        })
    }
}

/// Errors returned by [`Simulation`](crate::Simulation) runs.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Integration halted. `trajectory` holds every valid sample before `time`.
    #[error("numerical instability at t = {time} ms: {cause}")]
    NumericalInstability {
        time: f64,
        state: MembraneState,
        cause: InstabilityCause,
        trajectory: Trajectory,
    },

    /// An observer stopped the run after the sample at `time`.
    #[error("run cancelled at t = {time} ms")]
    Cancelled { time: f64 },

    #[error("solver failure: {0}")]
    Solver(#[from] transient::Error),
}
