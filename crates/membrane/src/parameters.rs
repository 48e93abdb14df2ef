use std::fmt;

use hhsim_core::constraint::{Constrained, ConstraintError, NonNegative, StrictlyPositive};
use thiserror::Error;

/// One of the three ionic pathways through the membrane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Sodium,
    Potassium,
    Leak,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::Sodium => "sodium",
            Channel::Potassium => "potassium",
            Channel::Leak => "leak",
        })
    }
}

/// Maximum conductances in mS/cm².
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conductances {
    pub sodium: f64,
    pub potassium: f64,
    pub leak: f64,
}

/// Reversal (Nernst) potentials in mV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReversalPotentials {
    pub sodium: f64,
    pub potassium: f64,
    pub leak: f64,
}

/// Errors raised when building [`Parameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("membrane capacitance: {0}")]
    Capacitance(#[source] ConstraintError),

    #[error("{channel} conductance: {source}")]
    Conductance {
        channel: Channel,
        #[source]
        source: ConstraintError,
    },

    #[error("{channel} reversal potential must be finite")]
    ReversalPotential { channel: Channel },

    #[error("resting potential must be finite")]
    RestingPotential,
}

/// Electrical properties of the membrane patch, fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    capacitance: Constrained<f64, StrictlyPositive>,
    g_na_max: Constrained<f64, NonNegative>,
    g_k_max: Constrained<f64, NonNegative>,
    g_leak: Constrained<f64, NonNegative>,
    reversal: ReversalPotentials,
    resting_potential: f64,
}

impl Parameters {
    /// Validates and assembles a parameter set.
    ///
    /// `capacitance` is in µF/cm² and `resting_potential` in mV. The resting
    /// potential is the origin of the voltage axis the rate laws are written
    /// in; it does not have to be the equilibrium of the full model.
    ///
    /// # Errors
    ///
    /// Fails if the capacitance is not strictly positive, a conductance is
    /// negative, or any value is not finite.
    pub fn new(
        capacitance: f64,
        conductances: Conductances,
        reversal: ReversalPotentials,
        resting_potential: f64,
    ) -> Result<Self, ParameterError> {
        let capacitance = StrictlyPositive::new(capacitance).map_err(ParameterError::Capacitance)?;

        let conductance = |channel, value| {
            NonNegative::new(value).map_err(|source| ParameterError::Conductance { channel, source })
        };
        let g_na_max = conductance(Channel::Sodium, conductances.sodium)?;
        let g_k_max = conductance(Channel::Potassium, conductances.potassium)?;
        let g_leak = conductance(Channel::Leak, conductances.leak)?;

        for (channel, value) in [
            (Channel::Sodium, reversal.sodium),
            (Channel::Potassium, reversal.potassium),
            (Channel::Leak, reversal.leak),
        ] {
            if !value.is_finite() {
                return Err(ParameterError::ReversalPotential { channel });
            }
        }

        if !resting_potential.is_finite() {
            return Err(ParameterError::RestingPotential);
        }

        Ok(Self {
            capacitance,
            g_na_max,
            g_k_max,
            g_leak,
            reversal,
            resting_potential,
        })
    }

    #[must_use]
    pub fn capacitance(&self) -> f64 {
        self.capacitance.get()
    }

    /// Maximum conductance of `channel` in mS/cm².
    #[must_use]
    pub fn max_conductance(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Sodium => self.g_na_max.get(),
            Channel::Potassium => self.g_k_max.get(),
            Channel::Leak => self.g_leak.get(),
        }
    }

    /// Reversal potential of `channel` in mV.
    #[must_use]
    pub fn reversal_potential(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Sodium => self.reversal.sodium,
            Channel::Potassium => self.reversal.potassium,
            Channel::Leak => self.reversal.leak,
        }
    }

    #[must_use]
    pub fn resting_potential(&self) -> f64 {
        self.resting_potential
    }

    /// Converts a membrane potential to the shifted voltage the rate laws take.
    #[must_use]
    pub fn shifted(&self, v: f64) -> f64 {
        v - self.resting_potential
    }
}

impl Default for Parameters {
    /// The squid giant axon values of Hodgkin and Huxley (1952).
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(
            1.0,
            Conductances {
                sodium: 120.0,
                potassium: 36.0,
                leak: 0.3,
            },
            ReversalPotentials {
                sodium: 60.0,
                potassium: -88.0,
                leak: -54.387,
            },
            -65.0,
        )
        .unwrap()
    }
}
