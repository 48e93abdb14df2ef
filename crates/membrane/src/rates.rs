//! Voltage-dependent transition rates for the `m`, `h`, and `n` gates.
//!
//! All rate laws take the shifted voltage `u = V - V_rest` in mV, i.e. the
//! depolarization from the resting potential, and return a rate in 1/ms.
//!
//! The opening rates of `m` and `n` have the form
//!
//! ```text
//! k (c - u) / (exp((c - u) / s) - 1)
//! ```
//!
//! which is 0/0 at `u = c`. The limit there is `k s`, and [`alpha_m`] and
//! [`alpha_n`] return it whenever the denominator is too small to divide by.

use tracing::trace;

/// Denominators with a magnitude below this are treated as the 0/0 point.
pub const SINGULARITY_TOLERANCE: f64 = 1e-7;

/// Largest exponent passed to `exp`, keeping every rate finite.
///
/// `exp(700)` is about `1e304`, just below `f64::MAX`.
const MAX_EXPONENT: f64 = 700.0;

fn exp(x: f64) -> f64 {
    x.min(MAX_EXPONENT).exp()
}

/// Evaluates `k (c - u) / (exp((c - u) / s) - 1)` with the removable
/// singularity at `u = c` replaced by its limit `k s`.
fn linoid(k: f64, c: f64, s: f64, u: f64) -> f64 {
    let x = (c - u) / s;
    let denominator = x.min(MAX_EXPONENT).exp_m1();
    if denominator.abs() < SINGULARITY_TOLERANCE {
        trace!(u, c, "rate law evaluated at its removable singularity");
        return k * s;
    }
    k * (c - u) / denominator
}

/// Opening rate of the sodium activation gate `m` (1/ms).
#[must_use]
pub fn alpha_m(u: f64) -> f64 {
    linoid(0.1, 25.0, 10.0, u)
}

/// Closing rate of the sodium activation gate `m` (1/ms).
#[must_use]
pub fn beta_m(u: f64) -> f64 {
    4.0 * exp(-u / 18.0)
}

/// Recovery rate of the sodium inactivation gate `h` (1/ms).
#[must_use]
pub fn alpha_h(u: f64) -> f64 {
    0.07 * exp(-u / 20.0)
}

/// Inactivation rate of the sodium inactivation gate `h` (1/ms).
#[must_use]
pub fn beta_h(u: f64) -> f64 {
    1.0 / (exp((30.0 - u) / 10.0) + 1.0)
}

/// Opening rate of the potassium activation gate `n` (1/ms).
#[must_use]
pub fn alpha_n(u: f64) -> f64 {
    linoid(0.01, 10.0, 10.0, u)
}

/// Closing rate of the potassium activation gate `n` (1/ms).
#[must_use]
pub fn beta_n(u: f64) -> f64 {
    0.125 * exp(-u / 80.0)
}

/// One of the three gating variables of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Sodium activation.
    M,
    /// Sodium inactivation.
    H,
    /// Potassium activation.
    N,
}

impl Gate {
    /// All gates, in state order.
    pub const ALL: [Gate; 3] = [Gate::M, Gate::H, Gate::N];

    /// Rate of transitions into the permissive state at shifted voltage `u`.
    #[must_use]
    pub fn alpha(self, u: f64) -> f64 {
        match self {
            Gate::M => alpha_m(u),
            Gate::H => alpha_h(u),
            Gate::N => alpha_n(u),
        }
    }

    /// Rate of transitions out of the permissive state at shifted voltage `u`.
    #[must_use]
    pub fn beta(self, u: f64) -> f64 {
        match self {
            Gate::M => beta_m(u),
            Gate::H => beta_h(u),
            Gate::N => beta_n(u),
        }
    }

    /// Time derivative of gate value `x` at shifted voltage `u`.
    #[must_use]
    pub fn kinetics(self, u: f64, x: f64) -> f64 {
        self.alpha(u) * (1.0 - x) - self.beta(u) * x
    }

    /// Value the gate relaxes to when `u` is held fixed.
    #[must_use]
    pub fn steady_state(self, u: f64) -> f64 {
        let alpha = self.alpha(u);
        alpha / (alpha + self.beta(u))
    }

    /// Relaxation time constant at fixed `u`, in ms.
    #[must_use]
    pub fn time_constant(self, u: f64) -> f64 {
        1.0 / (self.alpha(u) + self.beta(u))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn opening_rates_are_finite_at_their_singularities() {
        assert_relative_eq!(alpha_m(25.0), 1.0);
        assert_relative_eq!(alpha_n(10.0), 0.1);
    }

    #[test]
    fn opening_rates_are_continuous_across_singularities() {
        let cases: [(fn(f64) -> f64, f64, f64); 2] = [(alpha_m, 25.0, 1.0), (alpha_n, 10.0, 0.1)];
        for (f, c, limit) in cases {
            for offset in [1e-12, 1e-9, 1e-6, 1e-4] {
                assert_relative_eq!(f(c - offset), limit, max_relative = 1e-4);
                assert_relative_eq!(f(c + offset), limit, max_relative = 1e-4);
            }
        }
    }

    #[test]
    fn all_rates_finite_and_non_negative_over_wide_range() {
        let mut u = -5_000.0;
        while u <= 5_000.0 {
            for gate in Gate::ALL {
                let (alpha, beta) = (gate.alpha(u), gate.beta(u));
                assert!(alpha.is_finite() && alpha >= 0.0, "{gate:?} alpha({u}) = {alpha}");
                assert!(beta.is_finite() && beta >= 0.0, "{gate:?} beta({u}) = {beta}");
            }
            u += 0.25;
        }
    }

    #[test]
    fn rates_stay_finite_at_extreme_voltages() {
        for u in [-1e6, -1e4, 1e4, 1e6, f64::MAX, -f64::MAX] {
            for gate in Gate::ALL {
                assert!(gate.alpha(u).is_finite(), "{gate:?} alpha({u})");
                assert!(gate.beta(u).is_finite(), "{gate:?} beta({u})");
            }
        }
    }

    #[test]
    fn rates_at_rest_match_published_values() {
        assert_relative_eq!(alpha_m(0.0), 0.2236, epsilon = 1e-4);
        assert_relative_eq!(beta_m(0.0), 4.0);
        assert_relative_eq!(alpha_h(0.0), 0.07);
        assert_relative_eq!(beta_h(0.0), 0.0474, epsilon = 1e-4);
        assert_relative_eq!(alpha_n(0.0), 0.0582, epsilon = 1e-4);
        assert_relative_eq!(beta_n(0.0), 0.125);
    }

    #[test]
    fn steady_states_at_rest() {
        assert_relative_eq!(Gate::M.steady_state(0.0), 0.0529, epsilon = 1e-4);
        assert_relative_eq!(Gate::H.steady_state(0.0), 0.5961, epsilon = 1e-4);
        assert_relative_eq!(Gate::N.steady_state(0.0), 0.3177, epsilon = 1e-4);
    }

    #[test]
    fn steady_state_zeroes_kinetics() {
        for gate in Gate::ALL {
            for u in [-20.0, 0.0, 15.0, 60.0] {
                let x = gate.steady_state(u);
                assert_relative_eq!(gate.kinetics(u, x), 0.0, epsilon = 1e-12);
                assert!(gate.time_constant(u) > 0.0);
            }
        }
    }
}
