//! Time-stepping solvers for transient ODE problems.
//!
//! Both solvers advance an [`OdeProblem`] on a fixed output grid and return
//! the snapshot history at every grid point, starting with the initial one.
//!
//! # Solvers
//!
//! - [`rk4`]: classical fourth-order Runge–Kutta, one step per sample
//! - [`dopri5`]: Dormand–Prince 5(4) with adaptive substeps between samples
//!
//! # Example
//!
//! ```ignore
//! use hhsim_solvers::transient::rk4;
//!
//! let solution = rk4::solve_unobserved(&model, &problem, initial_input, dt, steps)?;
//!
//! for snapshot in &solution.history {
//!     println!("{:?} -> {:?}", snapshot.input, snapshot.output);
//! }
//! ```

mod action;
mod error;
mod event;
mod solution;

pub mod dopri5;
pub mod rk4;

pub use action::Action;
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use std::ops::{Add, Mul};

use hhsim_core::{DerivativeOf, Model, OdeProblem, StepIntegrable};

/// Evaluates the problem derivative at `state`, located `delta` past `base`.
fn stage<M, P>(
    model: &M,
    problem: &P,
    base: &M::Input,
    state: &P::State,
    delta: f64,
) -> Result<DerivativeOf<P::State, f64>, Error>
where
    M: Model,
    P: OdeProblem<Input = M::Input, Output = M::Output, Delta = f64>,
{
    let input = problem
        .build_input(base, state, &delta)
        .map_err(Error::problem)?;
    let output = model.call(&input).map_err(Error::model)?;
    problem.derivative(&input, &output).map_err(Error::problem)
}

/// Returns `sum(weights[i] * slopes[i])`, skipping zero weights.
///
/// The first weight must be nonzero and `slopes` must not be empty.
fn weighted_sum<D>(weights: &[f64], slopes: &[D]) -> D
where
    D: Clone + Add<Output = D> + Mul<f64, Output = D>,
{
    let mut sum = slopes[0].clone() * weights[0];
    for (weight, slope) in weights.iter().zip(slopes).skip(1) {
        if *weight != 0.0 {
            sum = sum + slope.clone() * *weight;
        }
    }
    sum
}

/// Steps `state` along the weighted average of `slopes`.
fn advance<S>(state: &S, weights: &[f64], slopes: &[DerivativeOf<S, f64>], delta: f64) -> S
where
    S: StepIntegrable<f64>,
    DerivativeOf<S, f64>: Clone + Add<Output = DerivativeOf<S, f64>> + Mul<f64, Output = DerivativeOf<S, f64>>,
{
    state.step(weighted_sum(weights, slopes), delta)
}
