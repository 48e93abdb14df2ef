//! Serializable run configuration.
//!
//! Every field has a default, so an empty document describes the classic
//! experiment: the squid axon parameters, two current pulses of 10 and
//! 35 µA/cm², and 450 ms sampled every 0.1 ms.
//!
//! ```toml
//! [membrane]
//! g_na_max = 120.0
//!
//! [[stimulus]]
//! threshold = 100.0
//! current = 10.0
//!
//! [time_span]
//! end = 200.0
//!
//! [method]
//! kind = "rk4"
//! ```

use std::{fs, path::Path};

use hhsim_membrane::{
    Breakpoint, Conductances, MembraneState, ParameterError, Parameters, ReversalPotentials,
    ScheduleError, StateError, StimulusSchedule, TimeSpan, TimeSpanError,
};
use hhsim_solvers::transient::dopri5;
use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, Method};

/// Complete description of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub membrane: MembraneConfig,
    pub initial_state: InitialStateConfig,
    pub stimulus: Vec<BreakpointConfig>,
    pub time_span: TimeSpanConfig,
    pub method: MethodConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            membrane: MembraneConfig::default(),
            initial_state: InitialStateConfig::default(),
            stimulus: [(100.0, 10.0), (200.0, 0.0), (300.0, 35.0), (400.0, 0.0)]
                .into_iter()
                .map(|(threshold, current)| BreakpointConfig { threshold, current })
                .collect(),
            time_span: TimeSpanConfig::default(),
            method: MethodConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] if the text is not valid TOML or
    /// does not match the configuration schema. Values are not validated here.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigurationError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Io`] if the file cannot be read, or
    /// [`ConfigurationError::Parse`] if its contents are malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Builds the validated stimulus schedule.
    ///
    /// # Errors
    ///
    /// See [`StimulusSchedule::new`].
    pub fn stimulus_schedule(&self) -> Result<StimulusSchedule, ScheduleError> {
        StimulusSchedule::new(
            self.stimulus
                .iter()
                .map(|point| Breakpoint::new(point.threshold, point.current)),
        )
    }
}

/// Membrane electrical properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MembraneConfig {
    /// µF/cm²
    pub capacitance: f64,
    /// mS/cm²
    pub g_na_max: f64,
    pub g_k_max: f64,
    pub g_leak: f64,
    /// mV
    pub e_na: f64,
    pub e_k: f64,
    pub e_leak: f64,
    pub resting_potential: f64,
}

impl Default for MembraneConfig {
    fn default() -> Self {
        Self {
            capacitance: 1.0,
            g_na_max: 120.0,
            g_k_max: 36.0,
            g_leak: 0.3,
            e_na: 60.0,
            e_k: -88.0,
            e_leak: -54.387,
            resting_potential: -65.0,
        }
    }
}

impl MembraneConfig {
    /// Builds validated [`Parameters`].
    ///
    /// # Errors
    ///
    /// See [`Parameters::new`].
    pub fn parameters(&self) -> Result<Parameters, ParameterError> {
        Parameters::new(
            self.capacitance,
            Conductances {
                sodium: self.g_na_max,
                potassium: self.g_k_max,
                leak: self.g_leak,
            },
            ReversalPotentials {
                sodium: self.e_na,
                potassium: self.e_k,
                leak: self.e_leak,
            },
            self.resting_potential,
        )
    }
}

/// State at the start of the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitialStateConfig {
    pub v: f64,
    pub m: f64,
    pub h: f64,
    pub n: f64,
}

impl Default for InitialStateConfig {
    fn default() -> Self {
        Self {
            v: -65.0,
            m: 0.05,
            h: 0.6,
            n: 0.32,
        }
    }
}

impl InitialStateConfig {
    /// Builds a validated [`MembraneState`].
    ///
    /// # Errors
    ///
    /// See [`MembraneState::new`].
    pub fn state(&self) -> Result<MembraneState, StateError> {
        MembraneState::new(self.v, self.m, self.h, self.n)
    }
}

/// A stimulus switch: from `threshold` ms on, inject `current` µA/cm².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BreakpointConfig {
    pub threshold: f64,
    pub current: f64,
}

/// Sample grid, in ms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeSpanConfig {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl Default for TimeSpanConfig {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 450.0,
            step: 0.1,
        }
    }
}

impl TimeSpanConfig {
    /// Builds a validated [`TimeSpan`].
    ///
    /// # Errors
    ///
    /// See [`TimeSpan::new`].
    pub fn span(&self) -> Result<TimeSpan, TimeSpanError> {
        TimeSpan::new(self.start, self.end, self.step)
    }
}

/// Integration method, selected by the `kind` key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MethodConfig {
    /// Fixed-step RK4, one step per sample.
    Rk4,
    /// Adaptive Dormand–Prince substeps between samples.
    Dopri5(Dopri5Config),
}

impl Default for MethodConfig {
    fn default() -> Self {
        Self::Dopri5(Dopri5Config::default())
    }
}

impl MethodConfig {
    /// Builds the validated [`Method`].
    ///
    /// # Errors
    ///
    /// See [`dopri5::Config::new`].
    pub fn method(&self) -> Result<Method, dopri5::ConfigError> {
        match *self {
            MethodConfig::Rk4 => Ok(Method::Rk4),
            MethodConfig::Dopri5(settings) => dopri5::Config::new(
                settings.abs_tol,
                settings.rel_tol,
                settings.min_step,
                settings.max_substeps,
            )
            .map(Method::Dopri5),
        }
    }
}

/// Error control settings for [`MethodConfig::Dopri5`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Dopri5Config {
    pub abs_tol: f64,
    pub rel_tol: f64,
    pub min_step: f64,
    pub max_substeps: usize,
}

impl Default for Dopri5Config {
    fn default() -> Self {
        let config = dopri5::Config::default();
        Self {
            abs_tol: config.abs_tol(),
            rel_tol: config.rel_tol(),
            min_step: config.min_step(),
            max_substeps: config.max_substeps(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = SimulationConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.stimulus.len(), 4);
        assert_eq!(config.method, MethodConfig::default());
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn partial_tables_keep_remaining_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [membrane]
            g_k_max = 30.0

            [time_span]
            end = 50.0

            [method]
            kind = "dopri5"
            rel_tol = 1e-8
            "#,
        )
        .unwrap();

        assert_eq!(config.membrane.g_k_max, 30.0);
        assert_eq!(config.membrane.g_na_max, 120.0);
        assert_eq!(config.time_span.end, 50.0);
        assert_eq!(config.time_span.step, 0.1);

        let MethodConfig::Dopri5(settings) = config.method else {
            panic!("expected dopri5, got {:?}", config.method);
        };
        assert_eq!(settings.rel_tol, 1e-8);
        assert_eq!(settings.abs_tol, 1e-8);
    }

    #[test]
    fn method_kind_selects_rk4() {
        let config = SimulationConfig::from_toml_str("[method]\nkind = \"rk4\"\n").unwrap();
        assert_eq!(config.method, MethodConfig::Rk4);
        assert_eq!(config.method.method(), Ok(Method::Rk4));
    }

    #[test]
    fn explicit_stimulus_replaces_default_schedule() {
        let config = SimulationConfig::from_toml_str(
            r"
            [[stimulus]]
            threshold = 5.0
            current = 20.0
            ",
        )
        .unwrap();

        let schedule = config.stimulus_schedule().unwrap();
        assert_eq!(schedule.breakpoints(), &[Breakpoint::new(5.0, 20.0)]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SimulationConfig::from_toml_str("[membrane]\ng_nak = 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SimulationConfig::load("/nonexistent/hhsim.toml").unwrap_err();
        assert!(matches!(err, ConfigurationError::Io { .. }));
    }

    #[test]
    fn serialized_defaults_parse_back() {
        let text = toml::to_string(&SimulationConfig::default()).unwrap();
        assert_eq!(
            SimulationConfig::from_toml_str(&text).unwrap(),
            SimulationConfig::default()
        );
    }
}
