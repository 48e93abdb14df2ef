/// Control actions an observer can return to a transient solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the solver and return the history so far.
    StopEarly,
}
