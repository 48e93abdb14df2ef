//! Numerical solvers for hhsim ODE problems.
//!
//! Solvers drive a [`Model`](hhsim_core::Model) through an
//! [`OdeProblem`](hhsim_core::OdeProblem) and never see the model's domain
//! types directly.

pub mod transient;
