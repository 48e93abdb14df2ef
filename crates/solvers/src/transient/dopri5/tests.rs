use approx::assert_relative_eq;

use crate::transient::{
    rk4,
    tests::fixtures::{Blowup, Decay, Input, Output, ScalarProblem},
};

use super::{Action, Config, ConfigError, Event, Status, solve, solve_unobserved};

#[test]
fn exponential_decay_within_tolerance() {
    let solution = solve_unobserved(
        &Decay,
        &ScalarProblem,
        Input::new(0.0, 1.0),
        0.1,
        10,
        &Config::default(),
    )
    .expect("should solve");

    assert_eq!(solution.status, Status::Complete);
    assert_eq!(solution.steps, 10);
    assert_eq!(solution.history.len(), 11);

    let last = solution.history.last().unwrap();
    assert_relative_eq!(last.input.y, (-1.0_f64).exp(), epsilon = 1e-8);
}

#[test]
#[allow(clippy::float_cmp)]
fn samples_land_on_the_same_grid_as_rk4() {
    let initial = Input::new(0.0, 1.0);
    let adaptive = solve_unobserved(&Decay, &ScalarProblem, initial, 0.1, 25, &Config::default())
        .expect("should solve");
    let fixed = rk4::solve_unobserved(&Decay, &ScalarProblem, initial, 0.1, 25).expect("should solve");

    let adaptive_times: Vec<_> = adaptive.history.iter().map(|s| s.input.t).collect();
    let fixed_times: Vec<_> = fixed.history.iter().map(|s| s.input.t).collect();
    assert_eq!(adaptive_times, fixed_times);
}

#[test]
fn long_samples_are_substepped() {
    let config = Config::new(1e-12, 1e-12, 1e-12, 1000).unwrap();
    let solution = solve_unobserved(&Decay, &ScalarProblem, Input::new(0.0, 1.0), 1.0, 1, &config)
        .expect("should solve");

    assert_eq!(solution.status, Status::Complete);
    assert!(solution.rejected > 0);
    assert!(solution.evaluations > 1 + 7);
    assert_relative_eq!(solution.history[1].input.y, (-1.0_f64).exp(), epsilon = 1e-10);
}

#[test]
fn non_finite_candidates_end_the_solve() {
    let solution = solve_unobserved(
        &Blowup,
        &ScalarProblem,
        Input::new(0.0, 1e150),
        0.1,
        5,
        &Config::default(),
    )
    .expect("should stop cleanly");

    assert!(matches!(solution.status, Status::NonFinite { step: 1, .. }));
    assert_eq!(solution.history.len(), 1);
    assert!(solution.rejected > 0);
}

#[test]
fn step_size_underflow_reports_last_good_point() {
    let config = Config::new(1e-14, 1e-14, 0.05, 100).unwrap();
    let solution = solve_unobserved(&Decay, &ScalarProblem, Input::new(0.0, 1.0), 0.1, 2, &config)
        .expect("should stop cleanly");

    assert_eq!(
        solution.status,
        Status::StepSizeUnderflow {
            step: 1,
            input: Input::new(0.0, 1.0),
        }
    );
    assert_eq!(solution.steps, 0);
}

#[test]
fn substep_limit_is_enforced() {
    let config = Config::new(1e-12, 1e-12, 1e-12, 2).unwrap();
    let solution = solve_unobserved(&Decay, &ScalarProblem, Input::new(0.0, 1.0), 1.0, 2, &config)
        .expect("should stop cleanly");

    assert!(matches!(solution.status, Status::SubstepLimit { step: 1, .. }));
}

#[test]
fn observer_can_stop_early() {
    let observer = |event: &Event<Input, Output>| (event.step == 2).then_some(Action::StopEarly);

    let solution = solve(
        &Decay,
        &ScalarProblem,
        Input::new(0.0, 1.0),
        0.1,
        50,
        &Config::default(),
        observer,
    )
    .expect("should stop early");

    assert_eq!(solution.status, Status::StoppedByObserver);
    assert_eq!(solution.steps, 2);
    assert_eq!(solution.history.len(), 3);
}

#[test]
fn config_rejects_bad_values() {
    assert_eq!(Config::new(-1.0, 1e-6, 1e-10, 10), Err(ConfigError::AbsTol));
    assert_eq!(Config::new(1e-8, f64::NAN, 1e-10, 10), Err(ConfigError::RelTol));
    assert_eq!(Config::new(0.0, 0.0, 1e-10, 10), Err(ConfigError::ZeroTolerance));
    assert_eq!(Config::new(1e-8, 1e-6, 0.0, 10), Err(ConfigError::MinStep));
    assert_eq!(Config::new(1e-8, 1e-6, 1e-10, 0), Err(ConfigError::MaxSubsteps));
    assert!(Config::new(0.0, 1e-6, 1e-10, 10).is_ok());
}
