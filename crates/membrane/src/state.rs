use std::ops::{Add, Mul};

use hhsim_core::{
    ErrorNorm, Finite, StepIntegrable,
    constraint::{ConstraintError, UnitInterval},
};
use thiserror::Error;
use uom::si::{electric_potential::millivolt, f64::ElectricPotential};

use crate::{Gate, Parameters};

/// Errors raised when building a [`MembraneState`] from user values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("membrane potential must be finite")]
    Potential,

    #[error("gate {gate:?}: {source}")]
    Gate {
        gate: Gate,
        #[source]
        source: ConstraintError,
    },
}

/// The integrated variables: membrane potential and the three gates.
///
/// Fields are public because solvers produce intermediate states freely.
/// [`MembraneState::new`] is the validated entry point for initial conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MembraneState {
    /// Membrane potential in mV.
    pub v: f64,
    /// Sodium activation.
    pub m: f64,
    /// Sodium inactivation.
    pub h: f64,
    /// Potassium activation.
    pub n: f64,
}

impl MembraneState {
    /// Creates a state, checking that `v` is finite and each gate is in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] naming the first offending component.
    pub fn new(v: f64, m: f64, h: f64, n: f64) -> Result<Self, StateError> {
        if !v.is_finite() {
            return Err(StateError::Potential);
        }
        for (gate, value) in [(Gate::M, m), (Gate::H, h), (Gate::N, n)] {
            UnitInterval::new(value).map_err(|source| StateError::Gate { gate, source })?;
        }
        Ok(Self { v, m, h, n })
    }

    /// A state at potential `v` with every gate at its voltage-clamp value.
    #[must_use]
    pub fn clamped(v: f64, params: &Parameters) -> Self {
        let u = params.shifted(v);
        Self {
            v,
            m: Gate::M.steady_state(u),
            h: Gate::H.steady_state(u),
            n: Gate::N.steady_state(u),
        }
    }

    /// Returns the value of `gate`.
    #[must_use]
    pub fn gate(&self, gate: Gate) -> f64 {
        match gate {
            Gate::M => self.m,
            Gate::H => self.h,
            Gate::N => self.n,
        }
    }

    /// Returns the membrane potential as a typed quantity.
    #[must_use]
    pub fn potential(&self) -> ElectricPotential {
        ElectricPotential::new::<millivolt>(self.v)
    }

    fn components(&self) -> [f64; 4] {
        [self.v, self.m, self.h, self.n]
    }
}

/// Time derivative of a [`MembraneState`], in mV/ms and 1/ms.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateDerivative {
    pub v: f64,
    pub m: f64,
    pub h: f64,
    pub n: f64,
}

impl StateDerivative {
    /// Largest gate rate magnitude.
    #[must_use]
    pub fn max_gate_rate(&self) -> f64 {
        self.m.abs().max(self.h.abs()).max(self.n.abs())
    }
}

impl Add for StateDerivative {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            v: self.v + rhs.v,
            m: self.m + rhs.m,
            h: self.h + rhs.h,
            n: self.n + rhs.n,
        }
    }
}

impl Mul<f64> for StateDerivative {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self {
            v: self.v * rhs,
            m: self.m * rhs,
            h: self.h * rhs,
            n: self.n * rhs,
        }
    }
}

impl StepIntegrable<f64> for MembraneState {
    type Derivative = StateDerivative;

    fn step(&self, derivative: StateDerivative, dt: f64) -> Self {
        Self {
            v: self.v + derivative.v * dt,
            m: self.m + derivative.m * dt,
            h: self.h + derivative.h * dt,
            n: self.n + derivative.n * dt,
        }
    }
}

impl Finite for MembraneState {
    fn is_finite(&self) -> bool {
        Finite::is_finite(&self.components()[..])
    }
}

impl Finite for StateDerivative {
    fn is_finite(&self) -> bool {
        Finite::is_finite(&[self.v, self.m, self.h, self.n][..])
    }
}

impl ErrorNorm for MembraneState {
    fn error_norm(&self, high: &Self, low: &Self, abs_tol: f64, rel_tol: f64) -> f64 {
        self.components()
            .iter()
            .zip(high.components())
            .zip(low.components())
            .map(|((start, high), low)| start.error_norm(&high, &low, abs_tol, rel_tol))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn new_rejects_gates_outside_unit_interval() {
        assert_eq!(
            MembraneState::new(-65.0, 0.05, 1.5, 0.32),
            Err(StateError::Gate {
                gate: Gate::H,
                source: ConstraintError::AboveMaximum,
            })
        );
        assert!(matches!(
            MembraneState::new(-65.0, -0.1, 0.6, 0.32),
            Err(StateError::Gate { gate: Gate::M, .. })
        ));
        assert_eq!(
            MembraneState::new(f64::NAN, 0.05, 0.6, 0.32),
            Err(StateError::Potential)
        );
        assert!(MembraneState::new(-65.0, 0.0, 1.0, 0.32).is_ok());
    }

    #[test]
    fn clamped_state_uses_steady_state_gates() {
        let state = MembraneState::clamped(-65.0, &Parameters::default());
        assert_relative_eq!(state.m, 0.0529, epsilon = 1e-4);
        assert_relative_eq!(state.h, 0.5961, epsilon = 1e-4);
        assert_relative_eq!(state.n, 0.3177, epsilon = 1e-4);
    }

    #[test]
    fn weighted_derivatives_step_the_state() {
        let state = MembraneState::new(-65.0, 0.1, 0.5, 0.3).unwrap();
        let a = StateDerivative {
            v: 2.0,
            m: 0.1,
            h: -0.2,
            n: 0.0,
        };
        let b = StateDerivative {
            v: 4.0,
            m: 0.3,
            h: 0.0,
            n: 0.2,
        };

        let next = state.step((a + b) * 0.5, 0.5);
        assert_relative_eq!(next.v, -63.5);
        assert_relative_eq!(next.m, 0.2);
        assert_relative_eq!(next.h, 0.45);
        assert_relative_eq!(next.n, 0.35);
    }

    #[test]
    fn finiteness_covers_every_component() {
        let mut state = MembraneState::new(-65.0, 0.05, 0.6, 0.32).unwrap();
        assert!(state.is_finite());
        state.n = f64::NAN;
        assert!(!state.is_finite());
        assert!(
            !StateDerivative {
                v: f64::INFINITY,
                ..StateDerivative::default()
            }
            .is_finite()
        );
    }

    #[test]
    fn error_norm_takes_worst_component() {
        let start = MembraneState::new(-65.0, 0.5, 0.5, 0.5).unwrap();
        let high = start;
        let low = MembraneState { h: 0.5 + 2e-6, ..start };

        // Only h differs: 2e-6 / (1e-6 + 0 * 0.5)
        let norm = start.error_norm(&high, &low, 1e-6, 0.0);
        assert_relative_eq!(norm, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn potential_is_in_millivolts() {
        let state = MembraneState::new(-65.0, 0.05, 0.6, 0.32).unwrap();
        assert_relative_eq!(state.potential().get::<millivolt>(), -65.0);
    }
}
