// Thermo - Temperature monitoring pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Process coordinator wiring a sensor to its operator.
//!
//! A [`Monitor`] is built once at startup and handed around as an
//! `Arc<Monitor>`. [`Monitor::install`] offers a single process-wide slot for
//! code that cannot receive the handle directly; it refuses a second install.

use crate::alert::AlertSink;
use crate::config::MonitorConfig;
use crate::error::{Result, ThermoError};
use crate::observer::{Observer, ObserverId, Operator, Sensor};
use crate::reading::Reading;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

static GLOBAL: OnceLock<Arc<Monitor>> = OnceLock::new();

/// Processing counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Readings pushed into the sensor.
    pub readings: u64,
    /// Readings whose notification returned an error.
    pub failures: u64,
}

/// One sensor, one operator with its check chain, and the alert sink.
pub struct Monitor {
    config: MonitorConfig,
    sensor: Mutex<Sensor>,
    operator: Arc<Operator>,
    operator_id: ObserverId,
    sink: Arc<dyn AlertSink>,
    readings: AtomicU64,
    failures: AtomicU64,
}

impl Monitor {
    /// Validate `config`, build the chain and register the operator.
    pub fn start(config: MonitorConfig, sink: Arc<dyn AlertSink>) -> Result<Arc<Self>> {
        config.validate()?;

        let chain = config.chain.build()?;
        let operator = Arc::new(Operator::new(
            config.operator.name.clone(),
            chain,
            Arc::clone(&sink),
        ));

        let mut sensor = Sensor::new(config.sensor.name.clone());
        let operator_id = sensor.register(operator.clone());

        tracing::info!(
            sensor = %config.sensor.name,
            operator = %config.operator.name,
            chain = ?operator.chain(),
            statistic = %config.chain.statistic,
            "monitor started"
        );

        Ok(Arc::new(Self {
            config,
            sensor: Mutex::new(sensor),
            operator,
            operator_id,
            sink,
            readings: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }))
    }

    /// Build a monitor and install it as the process-wide instance.
    pub fn init(config: MonitorConfig, sink: Arc<dyn AlertSink>) -> Result<Arc<Self>> {
        if GLOBAL.get().is_some() {
            return Err(ThermoError::AlreadyInitialized);
        }
        Self::install(Self::start(config, sink)?)
    }

    /// Install an existing monitor as the process-wide instance.
    pub fn install(monitor: Arc<Self>) -> Result<Arc<Self>> {
        GLOBAL
            .set(Arc::clone(&monitor))
            .map_err(|_| ThermoError::AlreadyInitialized)?;
        Ok(monitor)
    }

    /// The process-wide instance, if one was installed.
    pub fn global() -> Option<Arc<Self>> {
        GLOBAL.get().cloned()
    }

    /// Attach another observer to the sensor, after the operator.
    pub fn register(&self, observer: Arc<dyn Observer>) -> ObserverId {
        self.lock_sensor().register(observer)
    }

    /// Detach an observer, including the operator itself.
    pub fn unregister(&self, id: ObserverId) -> Result<Arc<dyn Observer>> {
        self.lock_sensor().unregister(id)
    }

    /// Push one reading through the sensor.
    pub fn feed(&self, reading: Reading) -> Result<()> {
        self.readings.fetch_add(1, Ordering::Relaxed);
        let result = self.lock_sensor().set_value(reading);
        if result.is_err() {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    /// Push `(timestamp, temperature)` through the sensor.
    pub fn set_value(&self, timestamp: chrono::DateTime<chrono::Utc>, value: f64) -> Result<()> {
        self.feed(Reading::new(timestamp, value))
    }

    /// Last reading the sensor received.
    pub fn current(&self) -> Option<Reading> {
        self.lock_sensor().value().copied()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn operator_id(&self) -> ObserverId {
        self.operator_id
    }

    pub fn stats(&self) -> MonitorStats {
        MonitorStats {
            readings: self.readings.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    /// Flush the alert sink.
    pub fn shutdown(&self) {
        let stats = self.stats();
        tracing::info!(
            readings = stats.readings,
            failures = stats.failures,
            "monitor stopping"
        );
        self.sink.flush();
    }

    fn lock_sensor(&self) -> MutexGuard<'_, Sensor> {
        self.sensor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("sensor", &self.config.sensor.name)
            .field("operator", &self.operator)
            .field("stats", &self.stats())
            .finish()
    }
}
