/// A callable model that maps a typed input to a typed output.
///
/// Models must be deterministic, always producing the same result for a given
/// input. Multi-stage integrators rely on this: they evaluate the same model
/// several times per step at trial inputs and combine the results.
pub trait Model {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Calls the model with the given input.
    ///
    /// # Errors
    ///
    /// Each model defines its own `Error` type to represent domain-specific failures.
    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// A captured input/output pair from a model call.
///
/// Solvers record one snapshot per accepted sample, so the history carries
/// everything the model computed at that point and not just the state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<I, O> {
    pub input: I,
    pub output: O,
}

impl<I, O> Snapshot<I, O> {
    /// Creates a new snapshot from input and output values.
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    /// Calls `model` with `input` and captures the result.
    ///
    /// # Errors
    ///
    /// Returns the model's error if the call fails.
    pub fn capture<M>(model: &M, input: I) -> Result<Self, M::Error>
    where
        M: Model<Input = I, Output = O>,
    {
        let output = model.call(&input)?;
        Ok(Self { input, output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    struct Square;

    impl Model for Square {
        type Input = f64;
        type Output = f64;
        type Error = Infallible;

        fn call(&self, x: &f64) -> Result<f64, Self::Error> {
            Ok(x * x)
        }
    }

    #[test]
    fn capture_pairs_input_with_output() {
        let snapshot = Snapshot::capture(&Square, 3.0).unwrap();
        assert_eq!(snapshot, Snapshot::new(3.0, 9.0));
    }
}
