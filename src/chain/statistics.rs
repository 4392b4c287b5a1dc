// Thermo - Temperature monitoring pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Statistical summary of the recent window.

use super::{span_secs, ChainLink};
use crate::alert::{Alert, AlertSink};
use crate::error::ChainError;
use crate::history::Window;
use crate::stats::{StatContext, StatKind};

/// Number of most recent values the summary covers.
pub const STATS_WINDOW: usize = 12;

/// Summarizes the last [`STATS_WINDOW`] values with a selectable strategy.
#[derive(Debug, Default)]
pub struct StatisticsCheck {
    pub(super) strategy: StatKind,
    pub(super) next: Option<Box<dyn ChainLink>>,
}

impl StatisticsCheck {
    /// Terminal statistics check.
    pub fn new(strategy: StatKind) -> Self {
        Self {
            strategy,
            next: None,
        }
    }

    pub fn with_successor(strategy: StatKind, next: Box<dyn ChainLink>) -> Self {
        Self {
            strategy,
            next: Some(next),
        }
    }

    pub fn strategy(&self) -> StatKind {
        self.strategy
    }
}

impl ChainLink for StatisticsCheck {
    fn name(&self) -> &'static str {
        "statistics"
    }

    fn inspect(&self, window: &Window, sink: &dyn AlertSink) -> Result<(), ChainError> {
        let data = window.suffix(STATS_WINDOW);
        let context = StatContext::with_strategy(data, self.strategy.strategy());
        let summary = context.compute()?;

        sink.emit(Alert::statistics(
            window.timestamp(),
            summary,
            data.len(),
            span_secs(STATS_WINDOW),
        ));
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
    use crate::chain::ThresholdCheck;
    use crate::error::StatsError;
    use crate::stats::StatSummary;

    fn summary_of(sink: &MemorySink) -> (StatSummary, usize) {
        match &sink.alerts()[0].details {
            AlertDetails::Statistics { summary, samples } => (*summary, *samples),
            other => panic!("Wrong details type: {:?}", other),
        }
    }

    #[test]
    fn test_statistics_truncates_to_last_twelve() {
        let sink = MemorySink::default();
        // 0..20: the last twelve are 8..=19
        let window = Window::from_values((0..20).map(|v| v as f64).collect());

        StatisticsCheck::new(StatKind::MinMax)
            .handle(&window, &sink)
            .unwrap();

        let (summary, samples) = summary_of(&sink);
        assert_eq!(samples, 12);
        assert_eq!(
            summary,
            StatSummary::MinMax {
                max: 19.0,
                min: 8.0
            }
        );
    }

    #[test]
    fn test_statistics_short_window_uses_all() {
        let sink = MemorySink::default();
        let window = Window::from_values(vec![20.0, 22.0, 24.0]);

        StatisticsCheck::new(StatKind::MeanStdDev)
            .handle(&window, &sink)
            .unwrap();

        let (summary, samples) = summary_of(&sink);
        assert_eq!(samples, 3);
        match summary {
            StatSummary::MeanStdDev { mean, .. } => assert!((mean - 22.0).abs() < 1e-9),
            other => panic!("Wrong summary: {:?}", other),
        }
    }

    #[test]
    fn test_statistics_each_strategy() {
        let window = Window::from_values(vec![
            5.0, 10.0, -3.0, 8.0, 0.0, -7.0, 20.0, -1.0, 15.0, -10.0,
        ]);
        for kind in StatKind::ALL {
            let sink = MemorySink::default();
            let check = StatisticsCheck::new(kind);
            assert_eq!(check.strategy(), kind);
            check.handle(&window, &sink).unwrap();
            assert_eq!(summary_of(&sink).0.kind(), kind);
        }
    }

    #[test]
    fn test_statistics_forwards_to_successor() {
        let sink = MemorySink::default();
        let check = StatisticsCheck::with_successor(
            StatKind::Median,
            Box::new(ThresholdCheck::new()),
        );
        assert_eq!(check.strategy(), StatKind::Median);

        check.handle(&Window::from_values(vec![30.0, 33.0]), &sink).unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.count_of(AlertKind::Threshold), 1);
    }

    #[test]
    fn test_statistics_empty_window() {
        let sink = MemorySink::default();
        let err = StatisticsCheck::new(StatKind::Median)
            .handle(&Window::from_values(Vec::new()), &sink)
            .unwrap_err();
        assert_eq!(
            err,
            ChainError::Stats(StatsError::EmptyData { strategy: "median" })
        );
    }
}
