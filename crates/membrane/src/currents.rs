use hhsim_core::Finite;

use crate::{Channel, MembraneState, Parameters};

/// Ionic current densities through each channel, in µA/cm².
///
/// Positive values are outward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IonicCurrents {
    pub sodium: f64,
    pub potassium: f64,
    pub leak: f64,
}

impl IonicCurrents {
    /// Evaluates the conductance-based current through each channel.
    ///
    /// ```text
    /// I_Na = gNa_max m³ h (V - E_Na)
    /// I_K  = gK_max  n⁴   (V - E_K)
    /// I_L  = gL           (V - E_L)
    /// ```
    #[must_use]
    pub fn compute(state: &MembraneState, params: &Parameters) -> Self {
        let driving = |channel| state.v - params.reversal_potential(channel);
        let g = |channel| params.max_conductance(channel);

        Self {
            sodium: g(Channel::Sodium) * state.m.powi(3) * state.h * driving(Channel::Sodium),
            potassium: g(Channel::Potassium) * state.n.powi(4) * driving(Channel::Potassium),
            leak: g(Channel::Leak) * driving(Channel::Leak),
        }
    }

    /// Returns the current through `channel`.
    #[must_use]
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Sodium => self.sodium,
            Channel::Potassium => self.potassium,
            Channel::Leak => self.leak,
        }
    }

    /// Net ionic current leaving the cell.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.sodium + self.potassium + self.leak
    }
}

impl Finite for IonicCurrents {
    fn is_finite(&self) -> bool {
        self.sodium.is_finite() && self.potassium.is_finite() && self.leak.is_finite()
    }
}
