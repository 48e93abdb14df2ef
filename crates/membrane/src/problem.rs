use std::convert::Infallible;

use hhsim_core::OdeProblem;

use crate::{Lookup, MembraneInput, MembraneOutput, MembraneState, StateDerivative, TimeSpan};

/// Adapts the [`MembraneModel`](crate::MembraneModel) to time-stepping solvers.
///
/// Inputs built for points inside a step read the stimulus as a left limit, so
/// a current switch that falls exactly on a step boundary belongs to the step
/// that starts there. Accepted step endpoints are switched back to
/// [`Lookup::At`] in [`finalize_step`](OdeProblem::finalize_step).
///
/// Times within rounding distance of the sample grid are snapped onto it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MembraneProblem {
    span: TimeSpan,
}

impl MembraneProblem {
    #[must_use]
    pub fn new(span: TimeSpan) -> Self {
        Self { span }
    }

    #[must_use]
    pub fn span(&self) -> &TimeSpan {
        &self.span
    }

    /// Model input for the first sample.
    #[must_use]
    pub fn initial_input(&self, state: MembraneState) -> MembraneInput {
        MembraneInput::at(self.span.start(), state)
    }
}

impl OdeProblem for MembraneProblem {
    type Input = MembraneInput;
    type Output = MembraneOutput;
    type Delta = f64;
    type State = MembraneState;
    type Error = Infallible;

    fn state(&self, input: &MembraneInput) -> Result<MembraneState, Infallible> {
        Ok(input.state)
    }

    fn derivative(
        &self,
        _input: &MembraneInput,
        output: &MembraneOutput,
    ) -> Result<StateDerivative, Infallible> {
        Ok(output.derivative)
    }

    fn build_input(
        &self,
        base: &MembraneInput,
        state: &MembraneState,
        delta: &f64,
    ) -> Result<MembraneInput, Infallible> {
        let lookup = if *delta > 0.0 {
            Lookup::Before
        } else {
            Lookup::At
        };
        Ok(MembraneInput {
            time: self.span.snap(base.time + delta),
            state: *state,
            lookup,
        })
    }

    fn finalize_step(
        &self,
        next_input: MembraneInput,
        _prev_input: &MembraneInput,
        _prev_output: &MembraneOutput,
        _step_delta: &f64,
    ) -> Result<MembraneInput, Infallible> {
        Ok(MembraneInput {
            lookup: Lookup::At,
            ..next_input
        })
    }
}
