use std::convert::Infallible;

use hhsim_core::{Finite, Model};

use crate::{Gate, IonicCurrents, Lookup, MembraneState, Parameters, StateDerivative, StimulusSchedule};

/// Right-hand side of the membrane equations at time `t`.
///
/// ```text
/// dV/dt = (I_stim(t) - I_Na - I_K - I_L) / Cm
/// dx/dt = alpha_x(u) (1 - x) - beta_x(u) x      for x in {m, h, n}
/// ```
///
/// where `u = V - V_rest`. The stimulus is read with [`Lookup::At`].
#[must_use]
pub fn derivative(
    state: &MembraneState,
    t: f64,
    params: &Parameters,
    stimulus: &StimulusSchedule,
) -> StateDerivative {
    let stimulus = stimulus.current_at(t);
    let currents = IonicCurrents::compute(state, params);
    balance(state, params, &currents, stimulus)
}

fn balance(
    state: &MembraneState,
    params: &Parameters,
    currents: &IonicCurrents,
    stimulus: f64,
) -> StateDerivative {
    let u = params.shifted(state.v);
    StateDerivative {
        v: (stimulus - currents.total()) / params.capacitance(),
        m: Gate::M.kinetics(u, state.m),
        h: Gate::H.kinetics(u, state.h),
        n: Gate::N.kinetics(u, state.n),
    }
}

/// Input to a [`MembraneModel`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MembraneInput {
    /// Time in ms.
    pub time: f64,
    pub state: MembraneState,
    /// Which side of a stimulus switch the call sees.
    pub lookup: Lookup,
}

impl MembraneInput {
    /// Input at a sample time, where a stimulus switch at `time` applies.
    #[must_use]
    pub fn at(time: f64, state: MembraneState) -> Self {
        Self {
            time,
            state,
            lookup: Lookup::At,
        }
    }
}

/// Everything the model computes from a [`MembraneInput`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MembraneOutput {
    pub derivative: StateDerivative,
    pub currents: IonicCurrents,
    /// Injected current used for this evaluation, in µA/cm².
    pub stimulus: f64,
}

impl Finite for MembraneOutput {
    fn is_finite(&self) -> bool {
        self.derivative.is_finite() && self.currents.is_finite() && self.stimulus.is_finite()
    }
}

/// The membrane patch as a callable [`Model`].
///
/// Stateless apart from its fixed parameters and stimulus, so the same input
/// always yields the same output.
#[derive(Debug, Clone, PartialEq)]
pub struct MembraneModel {
    parameters: Parameters,
    stimulus: StimulusSchedule,
}

impl MembraneModel {
    #[must_use]
    pub fn new(parameters: Parameters, stimulus: StimulusSchedule) -> Self {
        Self {
            parameters,
            stimulus,
        }
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn stimulus(&self) -> &StimulusSchedule {
        &self.stimulus
    }
}

impl Model for MembraneModel {
    type Input = MembraneInput;
    type Output = MembraneOutput;
    type Error = Infallible;

    fn call(&self, input: &MembraneInput) -> Result<MembraneOutput, Infallible> {
        let stimulus = self.stimulus.current(input.time, input.lookup);
        let currents = IonicCurrents::compute(&input.state, &self.parameters);
        let derivative = balance(&input.state, &self.parameters, &currents, stimulus);

        Ok(MembraneOutput {
            derivative,
            currents,
            stimulus,
        })
    }
}
