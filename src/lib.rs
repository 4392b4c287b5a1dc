// Thermo - Temperature monitoring pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # thermo - temperature monitoring pipeline
//!
//! A sensor publishes timestamped readings to its observers. Each observer
//! keeps a short rolling history and runs it through a chain of checks that
//! report on an alert sink.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use thermo::{AlertKind, MemorySink, Monitor, MonitorConfig, Reading};
//!
//! let sink = Arc::new(MemorySink::default());
//! let monitor = Monitor::start(MonitorConfig::default(), sink.clone()).unwrap();
//!
//! for (i, value) in [20.0, 21.5, 23.0, 25.0, 28.0, 32.5].into_iter().enumerate() {
//!     monitor.feed(Reading::at_millis(i as i64 * 5_000, value)).unwrap();
//! }
//!
//! assert_eq!(sink.count_of(AlertKind::Threshold), 1);
//! assert_eq!(sink.count_of(AlertKind::Growth), 1);
//! assert_eq!(sink.count_of(AlertKind::Statistics), 6);
//! ```
//!
//! ## Modules
//!
//! - [`reading`]: Timestamped samples
//! - [`history`]: Bounded history and derived windows
//! - [`stats`]: Statistic strategies and their context
//! - [`chain`]: Growth, threshold and statistics checks
//! - [`observer`]: Sensor fan-out and the operator observer
//! - [`alert`]: Alerts and sinks
//! - [`config`]: JSON configuration
//! - [`monitor`]: Process coordinator

// Modules
pub mod alert;
pub mod chain;
pub mod config;
pub mod error;
pub mod history;
pub mod monitor;
pub mod observer;
pub mod reading;
pub mod stats;

// Re-exports for convenient access
pub use alert::{
    Alert, AlertDetails, AlertKind, AlertSeverity, AlertSink, FanoutSink, JsonLinesSink,
    MemorySink, TracingSink,
};
pub use chain::{
    build_chain, default_chain, ChainLink, GrowthCheck, LinkKind, StatisticsCheck,
    ThresholdCheck,
};
pub use config::{ChainConfig, MonitorConfig};
pub use error::{ChainError, ConfigError, RegistryError, Result, StatsError, ThermoError};
pub use history::{History, Window};
pub use monitor::{Monitor, MonitorStats};
pub use observer::{Observer, ObserverId, Operator, Sensor};
pub use reading::Reading;
pub use stats::{MeanStdDev, Median, MinMax, StatContext, StatKind, StatStrategy, StatSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_basic_pipeline() {
        let sink = Arc::new(MemorySink::default());
        let monitor = Monitor::start(MonitorConfig::default(), sink.clone()).unwrap();

        monitor.feed(Reading::at_millis(0, 21.0)).unwrap();
        monitor.feed(Reading::at_millis(5_000, 22.0)).unwrap();

        assert_eq!(sink.len(), 2);
        assert!(sink
            .alerts()
            .iter()
            .all(|a| a.kind == AlertKind::Statistics));
    }
}
