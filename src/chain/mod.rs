// Thermo - Temperature monitoring pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Responsibility chain of checks over a temperature window.
//!
//! Each link inspects the window, emits zero or more alerts on the sink, then
//! hands the same window to its successor. A link without a successor is the
//! end of the chain. An error in any link stops the walk for that window.
//!
//! ```rust
//! use thermo::alert::{AlertKind, MemorySink};
//! use thermo::chain::{ChainLink, GrowthCheck, ThresholdCheck};
//! use thermo::history::Window;
//!
//! let chain = ThresholdCheck::with_successor(Box::new(GrowthCheck::new()));
//! let sink = MemorySink::default();
//!
//! chain.handle(&Window::from_values(vec![20.0, 33.0]), &sink).unwrap();
//! assert_eq!(sink.count_of(AlertKind::Threshold), 1);
//! ```

mod growth;
mod statistics;
mod threshold;

pub use growth::{GrowthCheck, GROWTH_LIMIT, GROWTH_SPAN};
pub use statistics::{StatisticsCheck, STATS_WINDOW};
pub use threshold::{ThresholdCheck, THRESHOLD_LIMIT};

use crate::alert::AlertSink;
use crate::error::ChainError;
use crate::history::Window;
use crate::stats::StatKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Assumed time between two consecutive readings, in seconds.
///
/// Only used to label spans in alert messages: a 6-sample delta is reported
/// as "the last 30 seconds", a 12-sample summary as "the last 60 seconds".
pub const SAMPLE_PERIOD_SECS: u64 = 5;

/// Seconds covered by `samples` consecutive readings.
pub fn span_secs(samples: usize) -> u64 {
    samples as u64 * SAMPLE_PERIOD_SECS
}

/// One stage of the check chain.
pub trait ChainLink: Send + Sync {
    /// Short identifier of the check.
    fn name(&self) -> &'static str;

    /// Run this link's own check.
    fn inspect(&self, window: &Window, sink: &dyn AlertSink) -> Result<(), ChainError>;

    /// Next link, if any.
    fn successor(&self) -> Option<&dyn ChainLink>;

    /// Check, then forward the unchanged window to the successor.
    fn handle(&self, window: &Window, sink: &dyn AlertSink) -> Result<(), ChainError> {
        self.inspect(window, sink)?;
        match self.successor() {
            Some(next) => next.handle(window, sink),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for dyn ChainLink + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(link_names(self)).finish()
    }
}

/// Names of the links from `head` to the end of the chain.
pub fn link_names(head: &dyn ChainLink) -> Vec<&'static str> {
    let mut names = Vec::new();
    let mut current = Some(head);
    while let Some(link) = current {
        names.push(link.name());
        current = link.successor();
    }
    names
}

/// Names the available checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Growth,
    Threshold,
    Statistics,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Growth => "growth",
            LinkKind::Threshold => "threshold",
            LinkKind::Statistics => "statistics",
        }
    }

    /// Build this link in front of `next`.
    fn build(
        &self,
        next: Option<Box<dyn ChainLink>>,
        strategy: StatKind,
    ) -> Box<dyn ChainLink> {
        match self {
            LinkKind::Growth => Box::new(GrowthCheck { next }),
            LinkKind::Threshold => Box::new(ThresholdCheck { next }),
            LinkKind::Statistics => Box::new(StatisticsCheck {
                strategy,
                next,
            }),
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkKind {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "growth" | "crecimiento" => Ok(LinkKind::Growth),
            "threshold" | "umbral" => Ok(LinkKind::Threshold),
            "statistics" | "estadisticos" => Ok(LinkKind::Statistics),
            _ => Err(ChainError::InvalidSuccessor {
                name: s.to_string(),
                reason: "not a chain link".to_string(),
            }),
        }
    }
}

/// Link order used when nothing else is configured.
pub const DEFAULT_ORDER: [LinkKind; 3] =
    [LinkKind::Statistics, LinkKind::Threshold, LinkKind::Growth];

/// Assemble a chain from link names, head first.
///
/// Fails with [`ChainError::InvalidSuccessor`] on an unknown or repeated
/// name and [`ChainError::EmptyChain`] when `names` is empty.
pub fn build_chain<S: AsRef<str>>(
    names: &[S],
    strategy: StatKind,
) -> Result<Box<dyn ChainLink>, ChainError> {
    let mut kinds = Vec::with_capacity(names.len());
    let mut seen = HashSet::new();
    for name in names {
        let kind: LinkKind = name.as_ref().parse()?;
        if !seen.insert(kind) {
            return Err(ChainError::InvalidSuccessor {
                name: name.as_ref().to_string(),
                reason: "link already in chain".to_string(),
            });
        }
        kinds.push(kind);
    }
    chain_from_kinds(&kinds, strategy)
}

/// Assemble a chain from link kinds, head first.
pub fn chain_from_kinds(
    kinds: &[LinkKind],
    strategy: StatKind,
) -> Result<Box<dyn ChainLink>, ChainError> {
    kinds
        .iter()
        .rev()
        .fold(None, |next, kind| Some(kind.build(next, strategy)))
        .ok_or(ChainError::EmptyChain)
}

/// Statistics → Threshold → Growth, with the given strategy.
pub fn default_chain(strategy: StatKind) -> Box<dyn ChainLink> {
    Box::new(StatisticsCheck::with_successor(
        strategy,
        Box::new(ThresholdCheck::with_successor(Box::new(GrowthCheck::new()))),
    ))
}
