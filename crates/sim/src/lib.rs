//! Simulates a single Hodgkin–Huxley membrane patch under injected current.
//!
//! A run is described by a [`SimulationConfig`], usually parsed from TOML,
//! validated into a [`Simulation`], and executed to produce a [`Trajectory`]
//! with one [`Record`] per sample:
//!
//! ```no_run
//! use hhsim::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::load("experiment.toml")?;
//! let trajectory = Simulation::new(&config)?.run()?;
//!
//! for spike in trajectory.spike_times(0.0) {
//!     println!("spike at {spike:.2} ms");
//! }
//! # Ok::<(), hhsim::SimulationError>(())
//! ```
//!
//! Independent runs can be executed in parallel with [`sweep`].

mod config;
mod driver;
mod error;
mod sweep;
mod trajectory;

pub use config::{
    BreakpointConfig, Dopri5Config, InitialStateConfig, MembraneConfig, MethodConfig,
    SimulationConfig, TimeSpanConfig,
};
pub use driver::{Method, Simulation};
pub use error::{ConfigurationError, InstabilityCause, SimulationError};
pub use hhsim_membrane::{Channel, Gate, MembraneState};
pub use hhsim_solvers::transient::Action;
pub use sweep::sweep;
pub use trajectory::{Record, Trajectory};
