// Thermo - Temperature monitoring pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Rate-of-change check.

use super::{span_secs, ChainLink};
use crate::alert::{Alert, AlertSink};
use crate::error::ChainError;
use crate::history::Window;

/// Number of samples the rise is measured across.
pub const GROWTH_SPAN: usize = 6;

/// Minimum rise, in degrees, that raises a growth alert.
pub const GROWTH_LIMIT: f64 = 10.0;

/// Alerts when `window[-1] - window[-6] >= 10`.
///
/// Windows shorter than [`GROWTH_SPAN`] never alert.
#[derive(Debug, Default)]
pub struct GrowthCheck {
    pub(super) next: Option<Box<dyn ChainLink>>,
}

impl GrowthCheck {
    /// Terminal growth check.
    pub fn new() -> Self {
        Self { next: None }
    }

    pub fn with_successor(next: Box<dyn ChainLink>) -> Self {
        Self { next: Some(next) }
    }
}

impl ChainLink for GrowthCheck {
    fn name(&self) -> &'static str {
        "growth"
    }

    fn inspect(&self, window: &Window, sink: &dyn AlertSink) -> Result<(), ChainError> {
        let (Some(to), Some(from)) = (window.last(), window.nth_from_end(GROWTH_SPAN)) else {
            return Ok(());
        };

        if to - from >= GROWTH_LIMIT {
            tracing::debug!(from, to, "growth limit reached");
            sink.emit(Alert::growth(
                window.timestamp(),
                from,
                to,
                GROWTH_LIMIT,
                GROWTH_SPAN,
                span_secs(GROWTH_SPAN),
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
    use crate::alert::{AlertDetails, AlertKind, MemorySink};

    fn run(values: Vec<f64>) -> MemorySink {
        let sink = MemorySink::default();
        GrowthCheck::new()
            .handle(&Window::from_values(values), &sink)
            .unwrap();
        sink
    }

    #[test]
    fn test_growth_triggers_at_limit() {
        let sink = run(vec![15.0, 16.0, 17.0, 18.0, 19.0, 25.0]);
        assert_eq!(sink.count_of(AlertKind::Growth), 1);

        match &sink.alerts()[0].details {
            AlertDetails::Growth {
                delta, span_secs, ..
            } => {
                assert_eq!(*delta, 10.0);
                assert_eq!(*span_secs, 30);
            }
            other => panic!("Wrong details type: {:?}", other),
        }
    }

    #[test]
    fn test_growth_below_limit() {
        let sink = run(vec![15.0, 30.0, 30.0, 30.0, 30.0, 24.99]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_growth_short_window_never_triggers() {
        assert!(run(vec![0.0, 50.0, 100.0, 150.0, 200.0]).is_empty());
        assert!(run(vec![]).is_empty());
    }

    #[test]
    fn test_growth_uses_sixth_from_end() {
        // Large early rise is outside the 6-sample span
        let sink = run(vec![0.0, 20.0, 20.0, 21.0, 22.0, 23.0, 25.0]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_growth_falling_temperature() {
        assert!(run(vec![30.0, 28.0, 26.0, 24.0, 22.0, 10.0]).is_empty());
    }
}
