//! Classical fourth-order Runge–Kutta.
//!
//! Each grid step evaluates four slopes:
//!
//! ```text
//! k1 = f(t,        y)
//! k2 = f(t + dt/2, y + dt/2 k1)
//! k3 = f(t + dt/2, y + dt/2 k2)
//! k4 = f(t + dt,   y + dt   k3)
//! y' = y + dt (k1 + 2 k2 + 2 k3 + k4) / 6
//! ```
//!
//! `k1` is read from the model output already captured at the start of the
//! step, so a step costs three stage calls plus one call at the new point.
//!
//! The step size is fixed. On stiff stretches of a trajectory too large a
//! step grows without bound; the solver stops with [`Status::NonFinite`] as
//! soon as a NaN or infinity appears.

use std::ops::{Add, Mul};

use hhsim_core::{DerivativeOf, Finite, Model, Observer, OdeProblem, Snapshot, StepIntegrable};

use super::{Action, Error, Event, Solution, Status, advance, stage};

const WEIGHTS: [f64; 4] = [1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0];

/// Integrates an ODE problem for `steps` steps of size `dt`.
///
/// # Algorithm
///
/// 1. Call the model with the initial input to get the initial snapshot.
/// 2. For each step:
///    - Evaluate the three remaining stage slopes from the current snapshot.
///    - Step the state along their weighted average.
///    - Build and finalize the next input, then call the model.
///    - Stop with [`Status::NonFinite`] if the state or output is not finite.
///    - Emit an [`Event`]; stop if the observer returns [`Action::StopEarly`].
/// 3. Return the solution with the full history.
///
/// # Errors
///
/// Returns an error if the model or problem returns an error at any point.
pub fn solve<M, P, Obs>(
    model: &M,
    problem: &P,
    initial: M::Input,
    dt: f64,
    steps: usize,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone + Finite,
    P: OdeProblem<Input = M::Input, Output = M::Output, Delta = f64>,
    P::State: Finite,
    DerivativeOf<P::State, f64>: Clone
        + Add<Output = DerivativeOf<P::State, f64>>
        + Mul<f64, Output = DerivativeOf<P::State, f64>>,
    Obs: Observer<Event<M::Input, M::Output>, Action>,
{
    let mut evaluations = 1;
    let initial_output = model.call(&initial).map_err(Error::model)?;

    let done = |status: Status<M::Input>,
                history: Vec<Snapshot<M::Input, M::Output>>,
                steps: usize,
                evaluations: usize| Solution {
        status,
        history,
        steps,
        evaluations,
        rejected: 0,
    };

    if !initial_output.is_finite() {
        let status = Status::NonFinite {
            step: 0,
            input: initial,
        };
        return Ok(done(status, Vec::new(), 0, evaluations));
    }

    let initial_snapshot = Snapshot::new(initial, initial_output);

    let mut history = Vec::with_capacity(steps + 1);
    history.push(initial_snapshot.clone());

    let event = Event {
        step: 0,
        snapshot: initial_snapshot.clone(),
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return Ok(done(Status::StoppedByObserver, history, 0, evaluations));
    }

    let half = dt / 2.0;
    let mut current = initial_snapshot;

    for step in 1..=steps {
        let state = problem.state(&current.input).map_err(Error::problem)?;
        let k1 = problem
            .derivative(&current.input, &current.output)
            .map_err(Error::problem)?;

        let k2 = stage(model, problem, &current.input, &state.step(k1.clone(), half), half)?;
        let k3 = stage(model, problem, &current.input, &state.step(k2.clone(), half), half)?;
        let k4 = stage(model, problem, &current.input, &state.step(k3.clone(), dt), dt)?;
        evaluations += 3;

        let next_state = advance(&state, &WEIGHTS, &[k1, k2, k3, k4], dt);

        let next_input = problem
            .build_input(&current.input, &next_state, &dt)
            .map_err(Error::problem)?;
        let next_input = problem
            .finalize_step(next_input, &current.input, &current.output, &dt)
            .map_err(Error::problem)?;

        if !next_state.is_finite() {
            let status = Status::NonFinite {
                step,
                input: next_input,
            };
            return Ok(done(status, history, step - 1, evaluations));
        }

        let next_output = model.call(&next_input).map_err(Error::model)?;
        evaluations += 1;

        if !next_output.is_finite() {
            let status = Status::NonFinite {
                step,
                input: next_input,
            };
            return Ok(done(status, history, step - 1, evaluations));
        }

        let next_snapshot = Snapshot::new(next_input, next_output);
        history.push(next_snapshot.clone());

        let event = Event {
            step,
            snapshot: next_snapshot.clone(),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(done(Status::StoppedByObserver, history, step, evaluations));
        }

        current = next_snapshot;
    }

    Ok(done(Status::Complete, history, steps, evaluations))
}

/// Integrates an ODE problem with RK4 without observation.
///
/// # Errors
///
/// Returns an error if the model or problem returns an error at any point.
pub fn solve_unobserved<M, P>(
    model: &M,
    problem: &P,
    initial: M::Input,
    dt: f64,
    steps: usize,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone + Finite,
    P: OdeProblem<Input = M::Input, Output = M::Output, Delta = f64>,
    P::State: Finite,
    DerivativeOf<P::State, f64>: Clone
        + Add<Output = DerivativeOf<P::State, f64>>
        + Mul<f64, Output = DerivativeOf<P::State, f64>>,
{
    solve(model, problem, initial, dt, steps, ())
}
