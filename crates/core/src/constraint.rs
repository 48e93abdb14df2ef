//! Type-level numeric constraints checked once at construction.
//!
//! Membrane parameters come from user configuration, so each one is checked
//! when it is turned into a model value and carried as a [`Constrained`]
//! wrapper afterwards. Code downstream of construction can trust the invariant
//! without re-checking it.
//!
//! # Provided Constraints
//!
//! - [`NonNegative`]: zero or greater (conductances)
//! - [`StrictlyPositive`]: greater than zero (capacitance, step sizes, tolerances)
//! - [`UnitInterval`]: within the closed interval `[0, 1]` (gating probabilities)
//!
//! All three reject NaN. Infinite values are rejected as well, since none of
//! the quantities they guard may be infinite.

use std::marker::PhantomData;

use thiserror::Error;

/// A trait for enforcing numeric invariants at construction time.
///
/// Implement this trait for any zero-sized marker type representing a numeric
/// constraint, such as [`NonNegative`] or [`StrictlyPositive`].
pub trait Constraint<T> {
    /// Checks that the given value satisfies this constraint.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] if the value does not satisfy the constraint.
    fn check(value: &T) -> Result<(), ConstraintError>;
}

/// An error returned when a [`Constraint`] is violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConstraintError {
    #[error("value must not be negative")]
    Negative,
    #[error("value must not be zero")]
    Zero,
    #[error("value is not a number")]
    NotANumber,
    #[error("value must be finite")]
    Infinite,
    #[error("value is below the minimum allowed")]
    BelowMinimum,
    #[error("value is above the maximum allowed")]
    AboveMaximum,
}

/// A wrapper enforcing a numeric constraint at construction time.
///
/// # Example
///
/// ```
/// use hhsim_core::constraint::{Constrained, StrictlyPositive};
///
/// let dt = Constrained::<f64, StrictlyPositive>::new(0.1).unwrap();
/// assert_eq!(dt.into_inner(), 0.1);
/// assert!(StrictlyPositive::new(0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Constrained<T, C: Constraint<T>> {
    value: T,
    _marker: PhantomData<C>,
}

impl<T, C: Constraint<T>> Constrained<T, C> {
    /// Constructs a new constrained value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not satisfy the constraint.
    pub fn new(value: T) -> Result<Self, ConstraintError> {
        C::check(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// Consumes the wrapper and returns the inner value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Copy, C: Constraint<T>> Constrained<T, C> {
    /// Returns a copy of the inner value.
    pub fn get(&self) -> T {
        self.value
    }
}

/// Returns a reference to the inner unconstrained value.
impl<T, C: Constraint<T>> AsRef<T> for Constrained<T, C> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

fn check_finite(value: f64) -> Result<(), ConstraintError> {
    if value.is_nan() {
        Err(ConstraintError::NotANumber)
    } else if value.is_infinite() {
        Err(ConstraintError::Infinite)
    } else {
        Ok(())
    }
}

/// Marker type enforcing that a value is finite and `>= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NonNegative;

impl NonNegative {
    /// Constructs `Constrained<f64, NonNegative>` if `value >= 0`.
    ///
    /// # Errors
    ///
    /// Fails with [`ConstraintError::Negative`] for negative values and with
    /// [`ConstraintError::NotANumber`] or [`ConstraintError::Infinite`] for
    /// non-finite values.
    pub fn new(value: f64) -> Result<Constrained<f64, NonNegative>, ConstraintError> {
        Constrained::new(value)
    }
}

impl Constraint<f64> for NonNegative {
    fn check(value: &f64) -> Result<(), ConstraintError> {
        check_finite(*value)?;
        if *value < 0.0 {
            Err(ConstraintError::Negative)
        } else {
            Ok(())
        }
    }
}

/// Marker type enforcing that a value is finite and `> 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StrictlyPositive;

impl StrictlyPositive {
    /// Constructs `Constrained<f64, StrictlyPositive>` if `value > 0`.
    ///
    /// # Errors
    ///
    /// Fails with [`ConstraintError::Zero`] or [`ConstraintError::Negative`]
    /// for non-positive values, and with [`ConstraintError::NotANumber`] or
    /// [`ConstraintError::Infinite`] for non-finite values.
    pub fn new(value: f64) -> Result<Constrained<f64, StrictlyPositive>, ConstraintError> {
        Constrained::new(value)
    }
}

impl Constraint<f64> for StrictlyPositive {
    fn check(value: &f64) -> Result<(), ConstraintError> {
        check_finite(*value)?;
        if *value == 0.0 {
            Err(ConstraintError::Zero)
        } else if *value < 0.0 {
            Err(ConstraintError::Negative)
        } else {
            Ok(())
        }
    }
}

/// Marker type enforcing that a value lies in the closed unit interval `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnitInterval;

impl UnitInterval {
    /// Constructs `Constrained<f64, UnitInterval>` if `0 <= value <= 1`.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::BelowMinimum`] if less than zero.
    /// - [`ConstraintError::AboveMaximum`] if greater than one.
    /// - [`ConstraintError::NotANumber`] for NaN.
    pub fn new(value: f64) -> Result<Constrained<f64, UnitInterval>, ConstraintError> {
        Constrained::new(value)
    }
}

impl Constraint<f64> for UnitInterval {
    fn check(value: &f64) -> Result<(), ConstraintError> {
        check_finite(*value)?;
        if *value < 0.0 {
            Err(ConstraintError::BelowMinimum)
        } else if *value > 1.0 {
            Err(ConstraintError::AboveMaximum)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn non_negative_accepts_zero() {
        assert_eq!(NonNegative::new(0.0).unwrap().get(), 0.0);
        assert_eq!(NonNegative::new(36.0).unwrap().into_inner(), 36.0);
    }

    #[test]
    fn non_negative_rejects_negative_and_nan() {
        assert_eq!(NonNegative::new(-0.3), Err(ConstraintError::Negative));
        assert_eq!(NonNegative::new(f64::NAN), Err(ConstraintError::NotANumber));
    }

    #[test]
    fn strictly_positive_rejects_zero_and_infinity() {
        assert_eq!(StrictlyPositive::new(0.0), Err(ConstraintError::Zero));
        assert_eq!(StrictlyPositive::new(-1.0), Err(ConstraintError::Negative));
        assert_eq!(
            StrictlyPositive::new(f64::INFINITY),
            Err(ConstraintError::Infinite)
        );
        assert!(StrictlyPositive::new(1e-12).is_ok());
    }

    #[test]
    fn unit_interval_is_closed() {
        assert!(UnitInterval::new(0.0).is_ok());
        assert!(UnitInterval::new(1.0).is_ok());
        assert_eq!(UnitInterval::new(1.5), Err(ConstraintError::AboveMaximum));
        assert_eq!(UnitInterval::new(-0.01), Err(ConstraintError::BelowMinimum));
    }
}
