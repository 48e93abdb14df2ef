mod export;

use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use hhsim::{
    Dopri5Config, MethodConfig, Simulation, SimulationConfig, SimulationError, Trajectory,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Simulate a Hodgkin-Huxley membrane patch and write the trajectory as CSV.
#[derive(Parser, Debug)]
#[command(name = "hhsim", version, about, long_about = None)]
struct Args {
    /// TOML run configuration; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the integration method
    #[arg(long, value_enum)]
    method: Option<MethodArg>,

    /// Override the sample step, in ms
    #[arg(long)]
    step: Option<f64>,

    /// Override the end time, in ms
    #[arg(long)]
    end: Option<f64>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MethodArg {
    Rk4,
    Dopri5,
}

impl Args {
    /// Applies command-line overrides on top of `config`.
    fn apply(&self, config: &mut SimulationConfig) {
        match (self.method, config.method) {
            (Some(MethodArg::Rk4), _) => config.method = MethodConfig::Rk4,
            (Some(MethodArg::Dopri5), MethodConfig::Rk4) => {
                config.method = MethodConfig::Dopri5(Dopri5Config::default());
            }
            _ => {}
        }
        if let Some(step) = self.step {
            config.time_span.step = step;
        }
        if let Some(end) = self.end {
            config.time_span.end = end;
        }
    }

    fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let mut config = match &args.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            SimulationConfig::load(path)?
        }
        None => SimulationConfig::default(),
    };
    args.apply(&mut config);

    if args.print_config {
        print!(
            "{}",
            toml::to_string_pretty(&config).context("failed to render configuration")?
        );
        return Ok(());
    }

    let simulation = Simulation::new(&config).context("invalid configuration")?;

    match simulation.run() {
        Ok(trajectory) => write_output(&trajectory, args.output.as_deref()),
        Err(err) => {
            // Keep whatever was computed before the solver gave up.
            if let SimulationError::NumericalInstability { trajectory, .. } = &err {
                write_output(trajectory, args.output.as_deref())?;
            }
            Err(err).context("simulation failed")
        }
    }
}

fn write_output(trajectory: &Trajectory, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            export::write_csv(trajectory, BufWriter::new(file))
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(records = trajectory.len(), "wrote {}", path.display());
        }
        None => {
            export::write_csv(trajectory, io::stdout().lock())
                .context("failed to write to stdout")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_need_no_arguments() {
        let args = Args::try_parse_from(["hhsim"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.output.is_none());
        assert_eq!(args.log_filter(), "info");

        let mut config = SimulationConfig::default();
        args.apply(&mut config);
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn overrides_replace_config_values() {
        let args = Args::try_parse_from([
            "hhsim", "--method", "rk4", "--step", "0.01", "--end", "50", "-vv",
        ])
        .unwrap();
        assert_eq!(args.log_filter(), "trace");

        let mut config = SimulationConfig::default();
        args.apply(&mut config);
        assert_eq!(config.method, MethodConfig::Rk4);
        assert_eq!(config.time_span.step, 0.01);
        assert_eq!(config.time_span.end, 50.0);
    }

    #[test]
    fn dopri5_override_keeps_configured_tolerances() {
        let args = Args::try_parse_from(["hhsim", "--method", "dopri5"]).unwrap();

        let tuned = MethodConfig::Dopri5(Dopri5Config {
            rel_tol: 1e-9,
            ..Dopri5Config::default()
        });
        let mut config = SimulationConfig {
            method: tuned,
            ..SimulationConfig::default()
        };
        args.apply(&mut config);
        assert_eq!(config.method, tuned);

        config.method = MethodConfig::Rk4;
        args.apply(&mut config);
        assert_eq!(config.method, MethodConfig::default());
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(Args::try_parse_from(["hhsim", "--method", "euler"]).is_err());
    }
}
