//! The Hodgkin–Huxley membrane patch.
//!
//! A single isopotential patch of excitable membrane with voltage-gated
//! sodium and potassium channels plus a passive leak, driven by a
//! piecewise-constant injected current. The state is the membrane potential
//! `V` and the gating probabilities `m`, `h`, and `n`.
//!
//! - [`rates`]: voltage-dependent gate transition rates
//! - [`StimulusSchedule`]: the injected current as a step function of time
//! - [`derivative`]: the right-hand side of the membrane equations
//! - [`MembraneModel`] / [`MembraneProblem`]: the same equations behind the
//!   core [`Model`](hhsim_core::Model) and [`OdeProblem`](hhsim_core::OdeProblem)
//!   traits, ready for the solvers
//! - [`TimeSpan`]: the sample grid of a run

pub mod rates;

mod currents;
mod model;
mod parameters;
mod problem;
mod state;
mod stimulus;
mod time;

pub use currents::IonicCurrents;
pub use model::{MembraneInput, MembraneModel, MembraneOutput, derivative};
pub use parameters::{Channel, Conductances, ParameterError, Parameters, ReversalPotentials};
pub use problem::MembraneProblem;
pub use rates::Gate;
pub use state::{MembraneState, StateDerivative, StateError};
pub use stimulus::{Breakpoint, Lookup, ScheduleError, StimulusSchedule};
pub use time::{MAX_SAMPLES, TimeSpan, TimeSpanError};
