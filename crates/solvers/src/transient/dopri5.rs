//! Dormand–Prince 5(4) with adaptive substeps between output samples.
//!
//! Each substep evaluates the seven-stage Dormand–Prince tableau and compares
//! the fifth-order solution with the embedded fourth-order one. Substeps whose
//! scaled error exceeds one are rejected and retried with a smaller size:
//!
//! ```text
//! factor = clamp(0.9 * err^(-1/5), 0.2, 5)
//! ```
//!
//! Substeps are clipped so that every sample lands exactly on the output
//! grid, which makes the history directly comparable with fixed-step
//! solvers. The substep size carries over from one sample to the next.
//!
//! A candidate containing NaN or infinity counts as a rejection. When the
//! controller can no longer shrink the substep the solve ends with
//! [`Status::NonFinite`] or [`Status::StepSizeUnderflow`].

mod config;

#[cfg(test)]
mod tests;

pub use config::{Config, ConfigError};

use std::ops::{Add, Mul};

use hhsim_core::{DerivativeOf, ErrorNorm, Finite, Model, Observer, OdeProblem, Snapshot};
use tracing::debug;

use super::{Action, Error, Event, Solution, Status, advance, stage};

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

/// Fraction of a sample interval below which a remainder is absorbed into
/// the final substep.
const LANDING_TOLERANCE: f64 = 1e-9;

const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

#[rustfmt::skip]
const A: [&[f64]; 5] = [
    &[1.0 / 5.0],
    &[3.0 / 40.0, 9.0 / 40.0],
    &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
    &[19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0],
    &[9017.0 / 3168.0, -355.0 / 33.0, 46732.0 / 5247.0, 49.0 / 176.0, -5103.0 / 18656.0],
];

/// Fifth-order weights, also the final row of the tableau.
const B5: [f64; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];

/// Embedded fourth-order weights.
const B4: [f64; 7] = [
    5179.0 / 57600.0,
    0.0,
    7571.0 / 16695.0,
    393.0 / 640.0,
    -92097.0 / 339200.0,
    187.0 / 2100.0,
    1.0 / 40.0,
];

/// Outcome of a single substep attempt.
enum Attempt<S, I, O> {
    Accepted { snapshot: Snapshot<I, O>, error: f64 },
    Rejected { error: f64 },
    NonFinite { candidate: S },
}

/// Integrates an ODE problem over `steps` samples spaced `dt` apart.
///
/// # Algorithm
///
/// 1. Call the model with the initial input to get the initial snapshot.
/// 2. For each sample, until the next grid point is reached:
///    - Attempt a substep of the current size, clipped to the grid point.
///    - On acceptance, finalize the input, call the model, and grow the size.
///    - On rejection, shrink the size and stop if it falls below the minimum.
///    - Stop if the sample needs more than `max_substeps` attempts.
/// 3. Emit an [`Event`] per sample; stop if the observer returns
///    [`Action::StopEarly`].
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
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone + Finite,
    P: OdeProblem<Input = M::Input, Output = M::Output, Delta = f64>,
    P::State: Finite + ErrorNorm,
    DerivativeOf<P::State, f64>: Clone
        + Add<Output = DerivativeOf<P::State, f64>>
        + Mul<f64, Output = DerivativeOf<P::State, f64>>,
    Obs: Observer<Event<M::Input, M::Output>, Action>,
{
    let mut solver = Solver {
        model,
        problem,
        config,
        evaluations: 1,
        rejected: 0,
    };

    let initial_output = model.call(&initial).map_err(Error::model)?;
    if !initial_output.is_finite() {
        let status = Status::NonFinite {
            step: 0,
            input: initial,
        };
        return Ok(solver.finish(status, Vec::new(), 0));
    }

    let initial_snapshot = Snapshot::new(initial, initial_output);

    let mut history = Vec::with_capacity(steps + 1);
    history.push(initial_snapshot.clone());

    let event = Event {
        step: 0,
        snapshot: initial_snapshot.clone(),
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return Ok(solver.finish(Status::StoppedByObserver, history, 0));
    }

    let mut current = initial_snapshot;
    let mut h = dt;

    for step in 1..=steps {
        let sample_start = current.input.clone();
        let mut elapsed = 0.0;
        let mut attempts = 0;

        loop {
            attempts += 1;
            if attempts > config.max_substeps() {
                debug!(step, attempts, "substep limit reached");
                let status = Status::SubstepLimit {
                    step,
                    input: current.input,
                };
                return Ok(solver.finish(status, history, step - 1));
            }

            let remaining = dt - elapsed;
            let landing = h >= remaining - LANDING_TOLERANCE * dt;
            let h_try = if landing { remaining } else { h };

            // The landing substep is rebuilt from the sample start so that the
            // sample time is exactly one grid step later.
            let end = landing.then(|| (&sample_start, dt));

            match solver.attempt(&current, h_try, end)? {
                Attempt::Accepted { snapshot, error } => {
                    let factor = (SAFETY * error.powf(ERROR_EXPONENT)).clamp(MIN_FACTOR, MAX_FACTOR);
                    h = if landing && h_try < h {
                        h.max(h_try * factor)
                    } else {
                        h_try * factor
                    };
                    current = snapshot;
                    if landing {
                        break;
                    }
                    elapsed += h_try;
                }
                Attempt::Rejected { error } => {
                    solver.rejected += 1;
                    let factor = (SAFETY * error.powf(ERROR_EXPONENT)).clamp(MIN_FACTOR, 1.0);
                    h = h_try * factor;
                    if h < config.min_step() {
                        debug!(step, h, error, "step size fell below minimum");
                        let status = Status::StepSizeUnderflow {
                            step,
                            input: current.input,
                        };
                        return Ok(solver.finish(status, history, step - 1));
                    }
                }
                Attempt::NonFinite { candidate } => {
                    solver.rejected += 1;
                    h = h_try * MIN_FACTOR;
                    if h < config.min_step() {
                        debug!(step, h, "no finite substep above minimum size");
                        let input = problem
                            .build_input(&current.input, &candidate, &h_try)
                            .map_err(Error::problem)?;
                        let status = Status::NonFinite { step, input };
                        return Ok(solver.finish(status, history, step - 1));
                    }
                }
            }
        }

        history.push(current.clone());

        let event = Event {
            step,
            snapshot: current.clone(),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(solver.finish(Status::StoppedByObserver, history, step));
        }
    }

    Ok(solver.finish(Status::Complete, history, steps))
}

/// Integrates an ODE problem with Dormand–Prince without observation.
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
    config: &Config,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone + Finite,
    P: OdeProblem<Input = M::Input, Output = M::Output, Delta = f64>,
    P::State: Finite + ErrorNorm,
    DerivativeOf<P::State, f64>: Clone
        + Add<Output = DerivativeOf<P::State, f64>>
        + Mul<f64, Output = DerivativeOf<P::State, f64>>,
{
    solve(model, problem, initial, dt, steps, config, ())
}

/// Borrowed context and counters shared by every substep attempt.
struct Solver<'a, M, P> {
    model: &'a M,
    problem: &'a P,
    config: &'a Config,
    evaluations: usize,
    rejected: usize,
}

impl<M, P> Solver<'_, M, P>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone + Finite,
    P: OdeProblem<Input = M::Input, Output = M::Output, Delta = f64>,
    P::State: Finite + ErrorNorm,
    DerivativeOf<P::State, f64>: Clone
        + Add<Output = DerivativeOf<P::State, f64>>
        + Mul<f64, Output = DerivativeOf<P::State, f64>>,
{
    /// Attempts one substep of size `h` from `current`.
    ///
    /// When `end` is given, an accepted state is placed at `end.1` past the
    /// input `end.0` instead of `h` past `current`.
    fn attempt(
        &mut self,
        current: &Snapshot<M::Input, M::Output>,
        h: f64,
        end: Option<(&M::Input, f64)>,
    ) -> Result<Attempt<P::State, M::Input, M::Output>, Error> {
        let (model, problem) = (self.model, self.problem);

        let state = problem.state(&current.input).map_err(Error::problem)?;
        let mut slopes = Vec::with_capacity(7);
        slopes.push(
            problem
                .derivative(&current.input, &current.output)
                .map_err(Error::problem)?,
        );

        for (row, c) in A.iter().zip(&C[1..]) {
            let stage_state = advance(&state, row, &slopes, h);
            slopes.push(stage(model, problem, &current.input, &stage_state, c * h)?);
        }

        let high = advance(&state, &B5, &slopes, h);
        slopes.push(stage(model, problem, &current.input, &high, h)?);
        self.evaluations += 6;

        if !high.is_finite() {
            return Ok(Attempt::NonFinite { candidate: high });
        }

        let low = advance(&state, &B4, &slopes, h);
        let error = state.error_norm(&high, &low, self.config.abs_tol(), self.config.rel_tol());
        if !error.is_finite() {
            return Ok(Attempt::NonFinite { candidate: high });
        }
        if error > 1.0 {
            return Ok(Attempt::Rejected { error });
        }

        let (base, delta) = end.unwrap_or((&current.input, h));
        let next_input = problem
            .build_input(base, &high, &delta)
            .map_err(Error::problem)?;
        let next_input = problem
            .finalize_step(next_input, &current.input, &current.output, &h)
            .map_err(Error::problem)?;

        let next_output = model.call(&next_input).map_err(Error::model)?;
        self.evaluations += 1;
        if !next_output.is_finite() {
            return Ok(Attempt::NonFinite { candidate: high });
        }

        Ok(Attempt::Accepted {
            snapshot: Snapshot::new(next_input, next_output),
            error,
        })
    }

    fn finish(
        &self,
        status: Status<M::Input>,
        history: Vec<Snapshot<M::Input, M::Output>>,
        steps: usize,
    ) -> Solution<M::Input, M::Output> {
        Solution {
            status,
            history,
            steps,
            evaluations: self.evaluations,
            rejected: self.rejected,
        }
    }
}
