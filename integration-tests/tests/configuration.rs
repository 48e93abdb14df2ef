use hhsim::{ConfigurationError, MethodConfig, Simulation, SimulationConfig, SimulationError};
use hhsim_membrane::{ScheduleError, StateError, TimeSpanError};

fn reject(config: &SimulationConfig) -> ConfigurationError {
    Simulation::new(config).expect_err("configuration should be rejected")
}

#[test]
fn zero_step_is_rejected() {
    let mut config = SimulationConfig::default();
    config.time_span.step = 0.0;
    assert!(matches!(
        reject(&config),
        ConfigurationError::TimeSpan(TimeSpanError::Step(_))
    ));
}

#[test]
fn empty_span_is_rejected() {
    for end in [0.0, -10.0] {
        let mut config = SimulationConfig::default();
        config.time_span.end = end;
        assert!(matches!(
            reject(&config),
            ConfigurationError::TimeSpan(TimeSpanError::EmptySpan { .. })
        ));
    }
}

#[test]
fn gate_outside_unit_interval_is_rejected() {
    let mut config = SimulationConfig::default();
    config.initial_state.m = 1.5;
    assert!(matches!(
        reject(&config),
        ConfigurationError::InitialState(StateError::Gate { .. })
    ));
}

#[test]
fn bad_physical_parameters_are_rejected() {
    let mut config = SimulationConfig::default();
    config.membrane.capacitance = 0.0;
    assert!(matches!(reject(&config), ConfigurationError::Parameters(_)));

    let mut config = SimulationConfig::default();
    config.membrane.g_k_max = -1.0;
    assert!(matches!(reject(&config), ConfigurationError::Parameters(_)));
}

#[test]
fn unordered_stimulus_is_rejected() {
    let config = SimulationConfig::from_toml_str(
        r"
        [[stimulus]]
        threshold = 20.0
        current = 5.0

        [[stimulus]]
        threshold = 10.0
        current = 0.0
        ",
    )
    .unwrap();
    assert!(matches!(reject(&config), ConfigurationError::Stimulus(_)));
}

#[test]
fn stimulus_before_start_is_rejected() {
    let mut config = SimulationConfig::from_toml_str(
        r"
        [[stimulus]]
        threshold = 10.0
        current = 5.0

        [time_span]
        start = 50.0
        end = 60.0
        ",
    )
    .unwrap();
    assert!(matches!(
        reject(&config),
        ConfigurationError::Stimulus(ScheduleError::BeforeStart { index: 0, .. })
    ));

    config.stimulus[0].threshold = 50.0;
    assert!(Simulation::new(&config).is_ok());
}

#[test]
fn bad_tolerances_are_rejected() {
    let config = SimulationConfig::from_toml_str(
        r#"
        [method]
        kind = "dopri5"
        rel_tol = -1.0
        "#,
    )
    .unwrap();
    assert!(matches!(reject(&config), ConfigurationError::Solver(_)));
}

#[test]
fn toml_document_drives_a_short_run() {
    let text = r#"
        [membrane]
        g_na_max = 120.0

        [initial_state]
        v = -65.0

        [[stimulus]]
        threshold = 5.0
        current = 20.0

        [time_span]
        end = 25.0
        step = 0.05

        [method]
        kind = "rk4"
    "#;
    let config = SimulationConfig::from_toml_str(text).unwrap();
    assert_eq!(config.method, MethodConfig::Rk4);

    let trajectory = Simulation::new(&config).unwrap().run().unwrap();
    assert_eq!(trajectory.len(), 500);
    let spikes = trajectory.spike_times(0.0);
    assert_eq!(spikes.len(), 2);
    assert!((5.0..10.0).contains(&spikes[0]));
}

#[test]
fn malformed_toml_is_a_configuration_error() {
    let err = SimulationConfig::from_toml_str("[time_span]\nend = \"long\"\n").unwrap_err();
    let err = SimulationError::from(err);
    assert!(matches!(
        err,
        SimulationError::Configuration(ConfigurationError::Parse(_))
    ));
}
