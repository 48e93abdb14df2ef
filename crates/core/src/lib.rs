//! Core traits and types for the hhsim membrane simulator.
//!
//! This crate defines the shared abstractions that the membrane model, the
//! transient solvers, and the simulation driver build on:
//!
//! - [`Model`]: a deterministic callable that maps a typed input to a typed output
//! - [`Snapshot`]: a captured input/output pair from a model call
//! - [`Observer`]: receives solver events and optionally returns control actions
//! - [`OdeProblem`]: adapts a model to the state/derivative view a solver needs
//! - [`StepIntegrable`], [`Finite`], [`ErrorNorm`]: what a state must support
//!   to be advanced, checked, and error-controlled by a solver
//! - [`constraint`]: numeric invariants enforced at construction time

pub mod constraint;

mod model;
mod observer;
mod ode;
mod step;

pub use model::{Model, Snapshot};
pub use observer::Observer;
pub use ode::OdeProblem;
pub use step::{DerivativeOf, ErrorNorm, Finite, StepIntegrable};
