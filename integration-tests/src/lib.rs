//! Shared helpers for the end-to-end tests.

use hhsim::{Gate, Record, Simulation, SimulationConfig, Trajectory};

/// Membrane potential the default axon settles to with no stimulus, in mV.
pub const REST: f64 = -67.487;

/// Slack allowed on gate bounds for floating-point round-off.
pub const GATE_SLACK: f64 = 1e-9;

/// Runs `config`, panicking with the error if it fails.
#[must_use]
pub fn run(config: &SimulationConfig) -> Trajectory {
    let simulation =
        Simulation::new(config).unwrap_or_else(|err| panic!("invalid configuration: {err}"));
    simulation
        .run()
        .unwrap_or_else(|err| panic!("run failed: {err}"))
}

/// Returns the record whose time is closest to `t`.
#[must_use]
pub fn record_near(trajectory: &Trajectory, t: f64) -> Record {
    *trajectory
        .iter()
        .min_by(|a, b| (a.t - t).abs().total_cmp(&(b.t - t).abs()))
        .expect("trajectory is not empty")
}

/// Returns true if every gate of every record lies in `[0, 1]` up to [`GATE_SLACK`].
#[must_use]
pub fn gates_in_unit_interval(trajectory: &Trajectory) -> bool {
    Gate::ALL.into_iter().all(|gate| {
        trajectory
            .gates(gate)
            .all(|x| (-GATE_SLACK..=1.0 + GATE_SLACK).contains(&x))
    })
}
