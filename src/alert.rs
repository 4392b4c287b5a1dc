// Thermo - Temperature monitoring pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Alerts emitted by the check chain, and the sinks that receive them.

use crate::stats::StatSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Kind of condition an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// Temperature rose too fast over the growth span.
    Growth,
    /// Temperature exceeded the absolute limit.
    Threshold,
    /// Periodic statistical summary of the recent window.
    Statistics,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Growth => "GROWTH",
            AlertKind::Threshold => "THRESHOLD",
            AlertKind::Statistics => "STATISTICS",
        }
    }
}

/// Severity level of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "INFO",
            AlertSeverity::Warning => "WARN",
            AlertSeverity::Critical => "CRIT",
        }
    }
}

/// Structured fields carried by each alert kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlertDetails {
    /// Rise between the oldest and newest sample of the span.
    Growth {
        from: f64,
        to: f64,
        delta: f64,
        limit: f64,
        span_samples: usize,
        span_secs: u64,
    },
    /// Observed value against the fixed limit.
    Threshold { observed: f64, limit: f64 },
    /// Summary computed over the last `samples` values.
    Statistics { summary: StatSummary, samples: usize },
}

/// One emitted alert or report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    /// Timestamp of the newest reading in the window that triggered it.
    pub timestamp: DateTime<Utc>,
    /// Human-readable message. Wording is not stable.
    pub message: String,
    pub details: AlertDetails,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        severity: AlertSeverity,
        timestamp: DateTime<Utc>,
        message: impl Into<String>,
        details: AlertDetails,
    ) -> Self {
        Self {
            kind,
            severity,
            timestamp,
            message: message.into(),
            details,
        }
    }

    /// Create a growth alert.
    pub fn growth(
        timestamp: DateTime<Utc>,
        from: f64,
        to: f64,
        limit: f64,
        span_samples: usize,
        span_secs: u64,
    ) -> Self {
        let delta = to - from;
        Self::new(
            AlertKind::Growth,
            AlertSeverity::Warning,
            timestamp,
            format!(
                "Temperature rose {:.2} degrees in the last {} seconds (limit: {:.2})",
                delta, span_secs, limit
            ),
            AlertDetails::Growth {
                from,
                to,
                delta,
                limit,
                span_samples,
                span_secs,
            },
        )
    }

    /// Create a threshold alert.
    pub fn threshold(timestamp: DateTime<Utc>, observed: f64, limit: f64) -> Self {
        Self::new(
            AlertKind::Threshold,
            AlertSeverity::Critical,
            timestamp,
            format!(
                "Temperature {:.2} exceeded {:.2} degrees",
                observed, limit
            ),
            AlertDetails::Threshold { observed, limit },
        )
    }

    /// Create a statistics report.
    pub fn statistics(
        timestamp: DateTime<Utc>,
        summary: StatSummary,
        samples: usize,
        span_secs: u64,
    ) -> Self {
        Self::new(
            AlertKind::Statistics,
            AlertSeverity::Info,
            timestamp,
            format!("Last {} seconds ({} samples): {}", span_secs, samples, summary),
            AlertDetails::Statistics { summary, samples },
        )
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Format as a log line
    pub fn to_log_line(&self) -> String {
        format!(
            "[{}] {} {} - {}",
            self.timestamp.to_rfc3339(),
            self.severity.as_str(),
            self.kind.as_str(),
            self.message
        )
    }
}

/// Receives alerts as the chain produces them.
pub trait AlertSink: Send + Sync {
    /// Deliver one alert.
    fn emit(&self, alert: Alert);

    /// Flush anything buffered.
    fn flush(&self) {}
}

/// Keeps alerts in memory, evicting the oldest past `max_alerts`.
#[derive(Debug)]
pub struct MemorySink {
    alerts: Mutex<VecDeque<Alert>>,
    max_alerts: usize,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl MemorySink {
    pub fn new(max_alerts: usize) -> Self {
        Self {
            alerts: Mutex::new(VecDeque::with_capacity(max_alerts.min(1000))),
            max_alerts: max_alerts.max(1),
        }
    }

    /// Get all stored alerts
    pub fn alerts(&self) -> Vec<Alert> {
        self.lock().iter().cloned().collect()
    }

    /// Get alerts of one kind
    pub fn alerts_of(&self, kind: AlertKind) -> Vec<Alert> {
        self.lock()
            .iter()
            .filter(|a| a.kind == kind)
            .cloned()
            .collect()
    }

    pub fn count_of(&self, kind: AlertKind) -> usize {
        self.lock().iter().filter(|a| a.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Alert>> {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AlertSink for MemorySink {
    fn emit(&self, alert: Alert) {
        let mut alerts = self.lock();
        if alerts.len() >= self.max_alerts {
            alerts.pop_front();
        }
        alerts.push_back(alert);
    }
}

/// Forwards alerts to `tracing` with structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AlertSink for TracingSink {
    fn emit(&self, alert: Alert) {
        let kind = alert.kind.as_str();
        let timestamp = alert.timestamp.to_rfc3339();
        match alert.severity {
            AlertSeverity::Critical => {
                tracing::error!(kind, %timestamp, details = ?alert.details, "{}", alert.message)
            }
            AlertSeverity::Warning => {
                tracing::warn!(kind, %timestamp, details = ?alert.details, "{}", alert.message)
            }
            AlertSeverity::Info => {
                tracing::info!(kind, %timestamp, details = ?alert.details, "{}", alert.message)
            }
        }
    }
}

/// Writes one JSON document per alert, newline separated.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> AlertSink for JsonLinesSink<W> {
    fn emit(&self, alert: Alert) {
        let line = match alert.to_json() {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to serialize alert: {}", e);
                return;
            }
        };
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{}", line) {
            tracing::warn!("Failed to write alert: {}", e);
        }
    }

    fn flush(&self) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writer.flush() {
            tracing::warn!("Failed to flush alerts: {}", e);
        }
    }
}

/// Delivers every alert to each inner sink in order.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<std::sync::Arc<dyn AlertSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: std::sync::Arc<dyn AlertSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl AlertSink for FanoutSink {
    fn emit(&self, alert: Alert) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.emit(alert.clone());
            }
            last.emit(alert);
        }
    }

    fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ts() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(30_000).unwrap()
    }

    #[test]
    fn test_kind_as_str() {
        assert_eq!(AlertKind::Growth.as_str(), "GROWTH");
        assert_eq!(AlertKind::Threshold.as_str(), "THRESHOLD");
        assert_eq!(AlertKind::Statistics.as_str(), "STATISTICS");
    }

    #[test]
    fn test_threshold_alert() {
        let alert = Alert::threshold(ts(), 33.5, 32.0);
        assert_eq!(alert.kind, AlertKind::Threshold);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert!(alert.message.contains("33.50"));
        match alert.details {
            AlertDetails::Threshold { observed, limit } => {
                assert_eq!(observed, 33.5);
                assert_eq!(limit, 32.0);
            }
            _ => panic!("Wrong details type"),
        }
    }

    #[test]
    fn test_growth_alert() {
        let alert = Alert::growth(ts(), 15.0, 26.0, 10.0, 6, 30);
        assert_eq!(alert.kind, AlertKind::Growth);
        assert!(alert.message.contains("30 seconds"));
        match alert.details {
            AlertDetails::Growth { delta, .. } => assert_eq!(delta, 11.0),
            _ => panic!("Wrong details type"),
        }
    }

    #[test]
    fn test_alert_json() {
        let alert = Alert::threshold(ts(), 33.0, 32.0);
        let json = alert.to_json().unwrap();
        assert!(json.contains("Threshold"));
        assert!(json.contains("33"));

        let back: Alert = serde_json::from_str(&json).unwrap();
        assert_eq!(back, alert);
    }

    #[test]
    fn test_log_line() {
        let line = Alert::threshold(ts(), 33.0, 32.0).to_log_line();
        assert_eq!(
            line,
            "[1970-01-01T00:00:30+00:00] CRIT THRESHOLD - Temperature 33.00 exceeded 32.00 degrees"
        );
    }

    #[test]
    fn test_memory_sink_eviction() {
        let sink = MemorySink::new(2);
        sink.emit(Alert::threshold(ts(), 33.0, 32.0));
        sink.emit(Alert::threshold(ts(), 34.0, 32.0));
        sink.emit(Alert::growth(ts(), 10.0, 21.0, 10.0, 6, 30));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.count_of(AlertKind::Threshold), 1);
        assert_eq!(sink.alerts_of(AlertKind::Growth).len(), 1);
        // Oldest goes first, order of the rest is kept
        let kept = sink.alerts();
        assert_eq!(kept[0].details, AlertDetails::Threshold { observed: 34.0, limit: 32.0 });
        assert_eq!(kept[1].kind, AlertKind::Growth);

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_json_lines_sink() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.emit(Alert::threshold(ts(), 33.0, 32.0));
        sink.emit(Alert::threshold(ts(), 35.0, 32.0));
        sink.flush();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 2);
        for line in out.lines() {
            let alert: Alert = serde_json::from_str(line).unwrap();
            assert_eq!(alert.kind, AlertKind::Threshold);
        }
    }

    #[test]
    fn test_fanout_sink() {
        let a = Arc::new(MemorySink::default());
        let b = Arc::new(MemorySink::default());
        let fanout = FanoutSink::new().with(a.clone()).with(b.clone());

        fanout.emit(Alert::threshold(ts(), 33.0, 32.0));
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
    }
}
