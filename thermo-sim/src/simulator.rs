// Thermo Sim - Simulated sensor driver
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Simulated sensor and the loop that feeds it into a monitor.
//!
//! Each tick draws a temperature, stamps it with the wall clock and pushes
//! it through the monitor. Per-tick errors are logged and the loop carries
//! on; only the shutdown signal or the tick limit stops it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use thermo::{Monitor, Reading};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Configuration for the simulated sensor.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Time between readings.
    pub interval: Duration,
    /// Lower bound of generated temperatures (inclusive).
    pub min_temp: f64,
    /// Upper bound of generated temperatures (exclusive).
    pub max_temp: f64,
    /// Stop after this many readings.
    pub max_ticks: Option<u64>,
    /// RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            min_temp: 10.0,
            max_temp: 35.0,
            max_ticks: None,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.min_temp.is_finite() && self.max_temp.is_finite())
            || self.min_temp >= self.max_temp
        {
            return Err(SimError::InvalidRange {
                min: self.min_temp,
                max: self.max_temp,
            });
        }
        if self.interval.is_zero() {
            return Err(SimError::ZeroInterval);
        }
        Ok(())
    }
}

/// Uniform temperature source.
#[derive(Debug)]
pub struct Simulator {
    rng: StdRng,
    min_temp: f64,
    max_temp: f64,
}

impl Simulator {
    pub fn new(config: &SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            min_temp: config.min_temp,
            max_temp: config.max_temp,
        }
    }

    /// Next temperature in `[min, max)`, rounded to 2 decimals.
    pub fn next_temperature(&mut self) -> f64 {
        let raw = self.rng.gen_range(self.min_temp..self.max_temp);
        let rounded = (raw * 100.0).round() / 100.0;
        // Rounding can land exactly on max; keep the bound exclusive
        if rounded >= self.max_temp {
            ((self.max_temp * 100.0).ceil() - 1.0) / 100.0
        } else {
            rounded
        }
    }

    /// Next reading stamped with the current time.
    pub fn next_reading(&mut self) -> Reading {
        Reading::now(self.next_temperature())
    }
}

/// Outcome of a driver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub errors: u64,
}

/// Feed readings into `monitor` until shutdown or the tick limit.
pub async fn run(
    monitor: Arc<Monitor>,
    config: SimConfig,
    mut shutdown: watch::Receiver<bool>,
) -> RunSummary {
    let mut simulator = Simulator::new(&config);
    let mut ticker = interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut summary = RunSummary::default();

    info!(
        "Starting simulation: interval={:?}, range=[{}, {})",
        config.interval, config.min_temp, config.max_temp
    );

    let mut listening = true;

    loop {
        if config.max_ticks.is_some_and(|max| summary.ticks >= max) {
            info!("Tick limit reached");
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            changed = shutdown.changed(), if listening => {
                match changed {
                    Ok(()) if *shutdown.borrow() => {
                        info!("Shutdown requested");
                        break;
                    }
                    Ok(()) => {}
                    Err(_) => {
                        warn!("Shutdown sender dropped, running until the tick limit");
                        listening = false;
                    }
                }
                continue;
            }
        }

        let reading = simulator.next_reading();
        debug!("Reading {}: {:.2}", summary.ticks, reading.value);
        summary.ticks += 1;

        if let Err(e) = monitor.feed(reading) {
            summary.errors += 1;
            warn!("Cycle {} failed: {}", summary.ticks, e);
        }
    }

    monitor.shutdown();
    summary
}

/// Errors raised while setting up the simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Invalid temperature range [{min}, {max})")]
    InvalidRange { min: f64, max: f64 },

    #[error("Interval must be greater than zero")]
    ZeroInterval,

    #[error("Monitor error: {0}")]
    Monitor(#[from] thermo::ThermoError),
}
