use rayon::prelude::*;
use tracing::debug;

use crate::{Simulation, SimulationConfig, SimulationError, Trajectory};

/// Runs independent simulations in parallel.
///
/// Each configuration is validated and run on its own, so one failure does
/// not affect the others. Results are returned in input order.
pub fn sweep(configs: &[SimulationConfig]) -> Vec<Result<Trajectory, SimulationError>> {
    debug!(runs = configs.len(), "starting sweep");
    configs
        .par_iter()
        .map(|config| -> Result<Trajectory, SimulationError> { Simulation::new(config)?.run() })
        .collect()
}
