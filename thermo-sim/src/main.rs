// Thermo Sim - Simulated sensor driver
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Thermo Sim
//!
//! Drives the thermo pipeline with a simulated greenhouse sensor.
//!
//! ## Usage
//!
//! ```bash
//! # Reference cadence: one reading every 5 seconds, 10..35 degrees
//! thermo-sim
//!
//! # Faster, reproducible, with JSON alerts on stdout
//! thermo-sim --interval-ms 200 --seed 42 --max-ticks 100 --json
//!
//! # Custom wiring
//! thermo-sim --config monitor.json
//! ```

mod simulator;

use clap::Parser;
use simulator::{SimConfig, SimError};
use std::sync::Arc;
use std::time::Duration;
use thermo::{AlertSink, FanoutSink, JsonLinesSink, Monitor, MonitorConfig, TracingSink};
use tokio::sync::watch;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Simulated temperature sensor for the thermo pipeline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON monitor configuration (names, chain order, statistic)
    #[arg(short, long)]
    config: Option<String>,

    /// Milliseconds between readings
    #[arg(short, long, default_value = "5000")]
    interval_ms: u64,

    /// Lowest simulated temperature (inclusive)
    #[arg(long, default_value = "10.0")]
    min_temp: f64,

    /// Highest simulated temperature (exclusive)
    #[arg(long, default_value = "35.0")]
    max_temp: f64,

    /// Stop after this many readings
    #[arg(long)]
    max_ticks: Option<u64>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Also write alerts to stdout as JSON lines
    #[arg(long, default_value = "false")]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn sim_config(&self) -> SimConfig {
        SimConfig {
            interval: Duration::from_millis(self.interval_ms),
            min_temp: self.min_temp,
            max_temp: self.max_temp,
            max_ticks: self.max_ticks,
            seed: self.seed,
        }
    }

    fn monitor_config(&self) -> Result<MonitorConfig, SimError> {
        match &self.config {
            Some(path) => Ok(MonitorConfig::from_file(path)?),
            None => Ok(MonitorConfig::default()),
        }
    }

    fn sink(&self) -> Arc<dyn AlertSink> {
        if self.json {
            Arc::new(
                FanoutSink::new()
                    .with(Arc::new(TracingSink))
                    .with(Arc::new(JsonLinesSink::new(std::io::stdout()))),
            )
        } else {
            Arc::new(TracingSink)
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Thermo Sim v{} (thermo v{})", env!("CARGO_PKG_VERSION"), thermo::VERSION);

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), SimError> {
    let sim_config = args.sim_config();
    sim_config.validate()?;

    // Misconfiguration is fatal here, before the first reading
    let monitor = Monitor::init(args.monitor_config()?, args.sink())?;

    // The sender lives until the run ends, even if the Ctrl-C listener fails
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);
    let signal_tx = Arc::clone(&shutdown_tx);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, stopping after the current cycle");
                signal_tx.send(true).ok();
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    let summary = simulator::run(monitor, sim_config, shutdown_rx).await;
    drop(shutdown_tx);
    info!(
        "Simulation finished: {} readings, {} failed cycles",
        summary.ticks, summary.errors
    );
    Ok(())
}
