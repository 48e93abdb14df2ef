use hhsim::{SimulationConfig, SimulationError, sweep};
use integration_tests::run;

fn with_current(current: f64) -> SimulationConfig {
    SimulationConfig::from_toml_str(&format!(
        r"
        [[stimulus]]
        threshold = 5.0
        current = {current:?}

        [time_span]
        end = 60.0
        "
    ))
    .unwrap()
}

#[test]
fn sweep_matches_sequential_runs() {
    let configs: Vec<_> = [0.0, 10.0, 35.0].into_iter().map(with_current).collect();

    let results = sweep(&configs);
    assert_eq!(results.len(), configs.len());
    for (config, result) in configs.iter().zip(results) {
        assert_eq!(result.unwrap(), run(config));
    }
}

#[test]
fn stronger_current_fires_sooner_and_more_often() {
    let results = sweep(&[with_current(0.0), with_current(10.0), with_current(35.0)]);
    let spikes: Vec<_> = results
        .into_iter()
        .map(|result| result.unwrap().spike_times(0.0))
        .collect();

    assert!(spikes[0].is_empty());
    assert!(!spikes[1].is_empty());
    assert!(spikes[2].len() > spikes[1].len());
    assert!(spikes[2][0] < spikes[1][0]);
}

#[test]
fn one_bad_config_does_not_spoil_the_sweep() {
    let mut bad = with_current(10.0);
    bad.initial_state.n = -0.5;

    let results = sweep(&[with_current(10.0), bad]);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(SimulationError::Configuration(_))));
}
