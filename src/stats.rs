// Thermo - Temperature monitoring pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Pluggable statistics over a window of temperatures.
//!
//! A [`StatContext`] borrows a fixed slice of values and delegates to the
//! currently selected [`StatStrategy`]. Strategies are stateless; swapping one
//! for another never changes the data the context holds.
//!
//! ```rust
//! use thermo::stats::{MeanStdDev, StatContext, StatSummary};
//!
//! let data = [20.0, 22.0, 24.0];
//! let mut context = StatContext::new(&data);
//! context.set_strategy(Box::new(MeanStdDev));
//!
//! match context.compute().unwrap() {
//!     StatSummary::MeanStdDev { mean, .. } => assert!((mean - 22.0).abs() < 1e-9),
//!     other => panic!("unexpected summary {:?}", other),
//! }
//! ```

use crate::error::StatsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result of a statistics computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StatSummary {
    /// Arithmetic mean and population standard deviation.
    MeanStdDev { mean: f64, std_dev: f64 },
    /// Middle value of the sorted data.
    Median { median: f64 },
    /// Extremes of the data.
    MinMax { max: f64, min: f64 },
}

impl StatSummary {
    /// Strategy kind that produced this summary.
    pub fn kind(&self) -> StatKind {
        match self {
            StatSummary::MeanStdDev { .. } => StatKind::MeanStdDev,
            StatSummary::Median { .. } => StatKind::Median,
            StatSummary::MinMax { .. } => StatKind::MinMax,
        }
    }
}

impl fmt::Display for StatSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatSummary::MeanStdDev { mean, std_dev } => {
                write!(f, "mean={:.2} std_dev={:.2}", mean, std_dev)
            }
            StatSummary::Median { median } => write!(f, "median={:.2}", median),
            StatSummary::MinMax { max, min } => write!(f, "max={:.2} min={:.2}", max, min),
        }
    }
}

/// A stateless computation over a fixed dataset.
pub trait StatStrategy: Send + Sync {
    /// Short identifier, as accepted by [`StatKind::from_str`].
    fn name(&self) -> &'static str;

    /// Compute the summary. Fails with [`StatsError::EmptyData`] on empty input.
    fn calculate(&self, data: &[f64]) -> Result<StatSummary, StatsError>;
}

/// Mean and population standard deviation (divisor `N`).
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanStdDev;

impl StatStrategy for MeanStdDev {
    fn name(&self) -> &'static str {
        StatKind::MeanStdDev.as_str()
    }

    fn calculate(&self, data: &[f64]) -> Result<StatSummary, StatsError> {
        if data.is_empty() {
            return Err(StatsError::EmptyData {
                strategy: self.name(),
            });
        }

        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        Ok(StatSummary::MeanStdDev {
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

/// Median; averages the two central values for even counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Median;

impl StatStrategy for Median {
    fn name(&self) -> &'static str {
        StatKind::Median.as_str()
    }

    fn calculate(&self, data: &[f64]) -> Result<StatSummary, StatsError> {
        if data.is_empty() {
            return Err(StatsError::EmptyData {
                strategy: self.name(),
            });
        }

        let mut sorted = data.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Ok(StatSummary::Median { median })
    }
}

/// Maximum and minimum.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinMax;

impl StatStrategy for MinMax {
    fn name(&self) -> &'static str {
        StatKind::MinMax.as_str()
    }

    fn calculate(&self, data: &[f64]) -> Result<StatSummary, StatsError> {
        let (first, rest) = data.split_first().ok_or(StatsError::EmptyData {
            strategy: self.name(),
        })?;

        let (max, min) = rest
            .iter()
            .fold((*first, *first), |(max, min), &x| (max.max(x), min.min(x)));

        Ok(StatSummary::MinMax { max, min })
    }
}

/// Names the available strategies.
///
/// This is the runtime boundary: configuration carries a strategy as a
/// string, and parsing it is where an unknown strategy is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    #[default]
    MeanStdDev,
    Median,
    MinMax,
}

impl StatKind {
    pub const ALL: [StatKind; 3] = [StatKind::MeanStdDev, StatKind::Median, StatKind::MinMax];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::MeanStdDev => "mean",
            StatKind::Median => "median",
            StatKind::MinMax => "minmax",
        }
    }

    /// Instantiate the strategy this kind names.
    pub fn strategy(&self) -> Box<dyn StatStrategy> {
        match self {
            StatKind::MeanStdDev => Box::new(MeanStdDev),
            StatKind::Median => Box::new(Median),
            StatKind::MinMax => Box::new(MinMax),
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatKind {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" | "mean_std_dev" | "media" => Ok(StatKind::MeanStdDev),
            "median" | "mediana" => Ok(StatKind::Median),
            "minmax" | "min_max" | "maximo" => Ok(StatKind::MinMax),
            _ => Err(StatsError::InvalidStrategy(s.to_string())),
        }
    }
}

/// Holds a fixed dataset and the strategy currently applied to it.
pub struct StatContext<'a> {
    data: &'a [f64],
    strategy: Option<Box<dyn StatStrategy>>,
}

impl<'a> StatContext<'a> {
    /// Context with no strategy selected yet.
    pub fn new(data: &'a [f64]) -> Self {
        Self {
            data,
            strategy: None,
        }
    }

    pub fn with_strategy(data: &'a [f64], strategy: Box<dyn StatStrategy>) -> Self {
        Self {
            data,
            strategy: Some(strategy),
        }
    }

    /// Replace the held strategy.
    pub fn set_strategy(&mut self, strategy: Box<dyn StatStrategy>) {
        self.strategy = Some(strategy);
    }

    /// Replace the held strategy by name. The current strategy is kept on failure.
    pub fn set_strategy_by_name(&mut self, name: &str) -> Result<(), StatsError> {
        let kind: StatKind = name.parse()?;
        self.set_strategy(kind.strategy());
        Ok(())
    }

    /// Name of the held strategy, if any.
    pub fn strategy_name(&self) -> Option<&'static str> {
        self.strategy.as_ref().map(|s| s.name())
    }

    pub fn data(&self) -> &[f64] {
        self.data
    }

    /// Run the held strategy over the data.
    pub fn compute(&self) -> Result<StatSummary, StatsError> {
        let strategy = self
            .strategy
            .as_ref()
            .ok_or(StatsError::NoStrategySelected)?;
        strategy.calculate(self.data)
    }
}

impl fmt::Debug for StatContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatContext")
            .field("data", &self.data)
            .field("strategy", &self.strategy_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE: [f64; 10] = [5.0, 10.0, -3.0, 8.0, 0.0, -7.0, 20.0, -1.0, 15.0, -10.0];

    fn round2(x: f64) -> f64 {
        (x * 100.0).round() / 100.0
    }

    #[test]
    fn test_mean_std_dev() {
        let context = StatContext::with_strategy(&SAMPLE, Box::new(MeanStdDev));
        match context.compute().unwrap() {
            StatSummary::MeanStdDev { mean, std_dev } => {
                assert_relative_eq!(mean, 3.7, epsilon = 1e-9);
                // Population deviation: sqrt(836.1 / 10)
                assert_eq!(round2(std_dev), 9.14);
            }
            other => panic!("Wrong summary: {:?}", other),
        }
    }

    #[test]
    fn test_median_even() {
        let context = StatContext::with_strategy(&SAMPLE, Box::new(Median));
        assert_eq!(
            context.compute().unwrap(),
            StatSummary::Median { median: 2.5 }
        );
    }

    #[test]
    fn test_median_odd() {
        let data = [3.0, -1.0, 7.0, 2.0, 5.0];
        assert_eq!(
            Median.calculate(&data).unwrap(),
            StatSummary::Median { median: 3.0 }
        );
    }

    #[test]
    fn test_min_max() {
        let context = StatContext::with_strategy(&SAMPLE, Box::new(MinMax));
        assert_eq!(
            context.compute().unwrap(),
            StatSummary::MinMax {
                max: 20.0,
                min: -10.0
            }
        );
    }

    #[test]
    fn test_single_value() {
        let data = [21.0];
        assert_eq!(
            MeanStdDev.calculate(&data).unwrap(),
            StatSummary::MeanStdDev {
                mean: 21.0,
                std_dev: 0.0
            }
        );
        assert_eq!(
            MinMax.calculate(&data).unwrap(),
            StatSummary::MinMax {
                max: 21.0,
                min: 21.0
            }
        );
    }

    #[test]
    fn test_empty_data_every_strategy() {
        for kind in StatKind::ALL {
            let err = kind.strategy().calculate(&[]).unwrap_err();
            assert_eq!(
                err,
                StatsError::EmptyData {
                    strategy: kind.as_str()
                }
            );
        }
    }

    #[test]
    fn test_no_strategy_selected() {
        let context = StatContext::new(&SAMPLE);
        assert_eq!(context.strategy_name(), None);
        assert_eq!(context.compute(), Err(StatsError::NoStrategySelected));
    }

    #[test]
    fn test_set_strategy_by_name() {
        let mut context = StatContext::new(&SAMPLE);
        context.set_strategy_by_name("mediana").unwrap();
        assert_eq!(context.strategy_name(), Some("median"));

        let err = context.set_strategy_by_name("ejemplo").unwrap_err();
        assert_eq!(err, StatsError::InvalidStrategy("ejemplo".to_string()));
        // Previous strategy survives a rejected assignment
        assert_eq!(context.strategy_name(), Some("median"));
    }

    #[test]
    fn test_replace_strategy_keeps_data() {
        let mut context = StatContext::with_strategy(&SAMPLE, Box::new(MeanStdDev));
        context.set_strategy(Box::new(MinMax));
        assert_eq!(context.data().len(), SAMPLE.len());
        assert_eq!(context.compute().unwrap().kind(), StatKind::MinMax);
    }

    #[test]
    fn test_stat_kind_parse() {
        assert_eq!("mean".parse::<StatKind>().unwrap(), StatKind::MeanStdDev);
        assert_eq!(" MinMax ".parse::<StatKind>().unwrap(), StatKind::MinMax);
        assert_eq!("maximo".parse::<StatKind>().unwrap(), StatKind::MinMax);
        assert!("".parse::<StatKind>().is_err());
    }

    #[test]
    fn test_summary_display() {
        let summary = StatSummary::MeanStdDev {
            mean: 3.7,
            std_dev: 9.1439,
        };
        assert_eq!(summary.to_string(), "mean=3.70 std_dev=9.14");
    }
}
