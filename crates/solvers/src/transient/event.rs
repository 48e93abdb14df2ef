use hhsim_core::Snapshot;

/// Emitted once per output sample.
///
/// Step 0 is the initial snapshot; step `k` is the snapshot `k` grid steps
/// later. Adaptive substeps between samples are not reported.
#[derive(Debug, Clone)]
pub struct Event<I, O> {
    pub step: usize,
    pub snapshot: Snapshot<I, O>,
}
