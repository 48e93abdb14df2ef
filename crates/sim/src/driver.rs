use hhsim_core::Observer;
use hhsim_membrane::{
    MembraneInput, MembraneModel, MembraneOutput, MembraneProblem, MembraneState, Parameters,
    StimulusSchedule, TimeSpan,
};
use hhsim_solvers::transient::{Action, Event, Solution, Status, dopri5, rk4};
use tracing::{debug, info, warn};

use crate::{
    ConfigurationError, InstabilityCause, Record, SimulationConfig, SimulationError, Trajectory,
};

/// How the membrane equations are advanced between samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    /// One fixed RK4 step per sample.
    ///
    /// Cheap, but becomes unstable during action potentials unless the
    /// sample step is small (about 0.05 ms or less for the default axon).
    Rk4,
    /// Adaptive Dormand–Prince substeps between samples.
    Dopri5(dopri5::Config),
}

/// A validated, ready-to-run simulation.
///
/// Holds no mutable state, so one `Simulation` may be run any number of
/// times, from any thread, and always yields the same trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    model: MembraneModel,
    problem: MembraneProblem,
    initial: MembraneState,
    method: Method,
}

impl Simulation {
    /// Validates a configuration and builds the simulation it describes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] naming the first invalid value.
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigurationError> {
        let parameters = config.membrane.parameters()?;
        let initial = config.initial_state.state()?;
        let stimulus = config.stimulus_schedule()?;
        let span = config.time_span.span()?;
        stimulus.check_start(span.start())?;
        let method = config.method.method()?;

        Ok(Self::from_parts(parameters, stimulus, initial, span, method))
    }

    /// Assembles a simulation from already-validated parts.
    #[must_use]
    pub fn from_parts(
        parameters: Parameters,
        stimulus: StimulusSchedule,
        initial: MembraneState,
        span: TimeSpan,
        method: Method,
    ) -> Self {
        Self {
            model: MembraneModel::new(parameters, stimulus),
            problem: MembraneProblem::new(span),
            initial,
            method,
        }
    }

    #[must_use]
    pub fn model(&self) -> &MembraneModel {
        &self.model
    }

    #[must_use]
    pub fn span(&self) -> &TimeSpan {
        self.problem.span()
    }

    #[must_use]
    pub fn initial_state(&self) -> MembraneState {
        self.initial
    }

    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns a copy of this simulation using `method`.
    #[must_use]
    pub fn with_method(self, method: Method) -> Self {
        Self { method, ..self }
    }

    /// Runs to the end of the span.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NumericalInstability`] if the state stops
    /// being finite or the adaptive solver cannot make progress.
    pub fn run(&self) -> Result<Trajectory, SimulationError> {
        self.run_observed(())
    }

    /// Runs to the end of the span, showing each record to `observer`.
    ///
    /// The observer sees the initial record first and one record per sample
    /// after that. Returning [`Action::StopEarly`] cancels the run.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Cancelled`] if the observer stops the run,
    /// and otherwise fails as [`run`](Self::run) does.
    pub fn run_observed<Obs>(&self, mut observer: Obs) -> Result<Trajectory, SimulationError>
    where
        Obs: Observer<Record, Action>,
    {
        let span = self.problem.span();
        let steps = span.sample_count() - 1;
        let initial = self.problem.initial_input(self.initial);

        debug!(
            method = ?self.method,
            start = span.start(),
            end = span.end(),
            step = span.step(),
            samples = span.sample_count(),
            "starting run"
        );

        let forward = |event: &Event<MembraneInput, MembraneOutput>| {
            observer.observe(&Record::from(&event.snapshot))
        };

        let solution = match self.method {
            Method::Rk4 => {
                rk4::solve(&self.model, &self.problem, initial, span.step(), steps, forward)?
            }
            Method::Dopri5(config) => dopri5::solve(
                &self.model,
                &self.problem,
                initial,
                span.step(),
                steps,
                &config,
                forward,
            )?,
        };

        let Solution {
            status,
            history,
            evaluations,
            rejected,
            ..
        } = solution;
        let trajectory: Trajectory = history.iter().map(Record::from).collect();

        let (input, cause) = match status {
            Status::Complete => {
                info!(
                    records = trajectory.len(),
                    evaluations, rejected, "run complete"
                );
                return Ok(trajectory);
            }
            Status::StoppedByObserver => {
                let time = trajectory.last().map_or(span.start(), |r| r.t);
                info!(time, "run cancelled by observer");
                return Err(SimulationError::Cancelled { time });
            }
            Status::NonFinite { input, .. } => (input, InstabilityCause::NonFinite),
            Status::StepSizeUnderflow { input, .. } => (input, InstabilityCause::StepSizeUnderflow),
            Status::SubstepLimit { input, .. } => (input, InstabilityCause::SubstepLimit),
        };

        warn!(
            time = input.time,
            %cause,
            valid_records = trajectory.len(),
            "integration halted"
        );
        Err(SimulationError::NumericalInstability {
            time: input.time,
            state: input.state,
            cause,
            trajectory,
        })
    }
}
