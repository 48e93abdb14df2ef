/// A trait for types that can be stepped using their derivative.
///
/// Implementing this trait enables generic ODE solvers to work with the type by
/// stepping it via `derivative * delta`, where the derivative is with respect
/// to `Delta`. Multi-stage solvers form weighted sums of several derivatives
/// before stepping, so they additionally require the derivative to support
/// `Add` and `Mul<f64>`.
pub trait StepIntegrable<Delta> {
    /// The derivative of the type with respect to `Delta`.
    type Derivative;

    /// Returns the value after stepping with a derivative and step size.
    #[must_use]
    fn step(&self, derivative: Self::Derivative, delta: Delta) -> Self;
}

/// Type alias for the derivative of a `StepIntegrable` type.
///
/// This is a convenience for accessing the [`StepIntegrable::Derivative`]
/// associated type without writing out the fully qualified syntax.
pub type DerivativeOf<T, Delta> = <T as StepIntegrable<Delta>>::Derivative;

/// Reports whether every component of a value is finite.
///
/// Solvers check this after each step and halt as soon as a NaN or infinity
/// shows up, rather than integrating garbage.
pub trait Finite {
    /// Returns `true` if no component is NaN or infinite.
    fn is_finite(&self) -> bool;
}

impl Finite for f64 {
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

impl<T: Finite> Finite for [T] {
    fn is_finite(&self) -> bool {
        self.iter().all(Finite::is_finite)
    }
}

/// A scaled error measure between two candidate states.
///
/// Adaptive solvers compare a high-order and a low-order solution of the same
/// step. The result is dimensionless: values at or below one mean the step is
/// within tolerance.
pub trait ErrorNorm {
    /// Returns the max-norm of `|high - low|` scaled per component by
    /// `abs_tol + rel_tol * max(|self|, |high|)`, where `self` is the state at
    /// the start of the step.
    fn error_norm(&self, high: &Self, low: &Self, abs_tol: f64, rel_tol: f64) -> f64;
}

impl ErrorNorm for f64 {
    fn error_norm(&self, high: &Self, low: &Self, abs_tol: f64, rel_tol: f64) -> f64 {
        (high - low).abs() / (abs_tol + rel_tol * self.abs().max(high.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    // Scalar state and derivative
    #[derive(Debug, PartialEq)]
    struct Position(f64);
    struct Velocity(f64);

    impl StepIntegrable<f64> for Position {
        type Derivative = Velocity;

        fn step(&self, derivative: Velocity, delta: f64) -> Self {
            Position(self.0 + derivative.0 * delta)
        }
    }

    #[test]
    fn step_scalar_state() {
        let pos = Position(0.0);
        let next = pos.step(Velocity(2.0), 0.5);
        assert_eq!(next, Position(1.0));
    }

    #[test]
    fn finite_slices_reject_nan_and_infinity() {
        assert!(Finite::is_finite(&[1.0_f64, -2.0, 0.0][..]));
        assert!(!Finite::is_finite(&[1.0_f64, f64::NAN][..]));
        assert!(!Finite::is_finite(&[f64::NEG_INFINITY][..]));
    }

    #[test]
    fn scalar_error_norm_scales_by_tolerance() {
        // |1.5 - 1.4| / (0.01 + 0.1 * 1.5) = 0.1 / 0.16
        let norm = 1.0_f64.error_norm(&1.5, &1.4, 0.01, 0.1);
        assert_relative_eq!(norm, 0.625, epsilon = 1e-12);
    }
}
