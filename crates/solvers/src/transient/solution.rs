use hhsim_core::Snapshot;

/// How a transient solve ended.
///
/// Variants other than [`Complete`](Status::Complete) and
/// [`StoppedByObserver`](Status::StoppedByObserver) carry the grid step that
/// could not be completed and the model input at which the solver gave up.
#[derive(Debug, Clone, PartialEq)]
pub enum Status<I> {
    /// Every requested step was taken.
    Complete,

    /// An observer returned [`Action::StopEarly`](super::Action::StopEarly).
    StoppedByObserver,

    /// A state or model output contained NaN or infinity.
    ///
    /// `input` holds the offending state.
    NonFinite { step: usize, input: I },

    /// The adaptive step size fell below its configured minimum.
    ///
    /// `input` is the last accepted point.
    StepSizeUnderflow { step: usize, input: I },

    /// A single sample needed more substeps than configured.
    ///
    /// `input` is the last accepted point.
    SubstepLimit { step: usize, input: I },
}

impl<I> Status<I> {
    /// Returns `true` unless the solve ended on a numerical failure.
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Complete | Status::StoppedByObserver)
    }
}

/// The result of a transient solve.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    pub status: Status<I>,

    /// Snapshot at every completed grid point, including the initial one.
    pub history: Vec<Snapshot<I, O>>,

    /// Number of grid steps completed.
    pub steps: usize,

    /// Number of model calls made.
    pub evaluations: usize,

    /// Number of rejected adaptive substeps, always zero for fixed-step solvers.
    pub rejected: usize,
}
