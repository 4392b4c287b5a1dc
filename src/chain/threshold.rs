// Thermo - Temperature monitoring pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Absolute temperature check.

use super::ChainLink;
use crate::alert::{Alert, AlertSink};
use crate::error::ChainError;
use crate::history::Window;

/// Temperature above which the newest reading raises an alert.
pub const THRESHOLD_LIMIT: f64 = 32.0;

/// Alerts when the newest value is strictly above [`THRESHOLD_LIMIT`].
#[derive(Debug, Default)]
pub struct ThresholdCheck {
    pub(super) next: Option<Box<dyn ChainLink>>,
}

impl ThresholdCheck {
    /// Terminal threshold check.
    pub fn new() -> Self {
        Self { next: None }
    }

    pub fn with_successor(next: Box<dyn ChainLink>) -> Self {
        Self { next: Some(next) }
    }
}

impl ChainLink for ThresholdCheck {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn inspect(&self, window: &Window, sink: &dyn AlertSink) -> Result<(), ChainError> {
        let observed = window
            .last()
            .ok_or(ChainError::EmptyWindow { link: self.name() })?;

        if observed > THRESHOLD_LIMIT {
            sink.emit(Alert::threshold(
                window.timestamp(),
                observed,
                THRESHOLD_LIMIT,
            ));
        }
        Ok(())
    }

    fn successor(&self) -> Option<&dyn ChainLink> {
        self.next.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{AlertKind, MemorySink};
    use crate::chain::GrowthCheck;

    fn run(values: Vec<f64>) -> MemorySink {
        let sink = MemorySink::default();
        ThresholdCheck::new()
            .handle(&Window::from_values(values), &sink)
            .unwrap();
        sink
    }

    #[test]
    fn test_threshold_strictly_above() {
        assert_eq!(run(vec![32.01]).count_of(AlertKind::Threshold), 1);
        assert!(run(vec![32.0]).is_empty());
    }

    #[test]
    fn test_threshold_only_newest_value() {
        assert!(run(vec![40.0, 35.0, 20.0]).is_empty());
        assert_eq!(run(vec![10.0, 33.0]).len(), 1);
    }

    #[test]
    fn test_threshold_empty_window() {
        let sink = MemorySink::default();
        let err = ThresholdCheck::new()
            .handle(&Window::from_values(Vec::new()), &sink)
            .unwrap_err();
        assert_eq!(err, ChainError::EmptyWindow { link: "threshold" });
    }

    #[test]
    fn test_threshold_forwards_after_alert() {
        let sink = MemorySink::default();
        let chain = ThresholdCheck::with_successor(Box::new(GrowthCheck::new()));
        let window = Window::from_values(vec![20.0, 21.0, 22.0, 23.0, 24.0, 33.0]);

        chain.handle(&window, &sink).unwrap();
        assert_eq!(sink.count_of(AlertKind::Threshold), 1);
        assert_eq!(sink.count_of(AlertKind::Growth), 1);
    }
}
