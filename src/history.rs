// Thermo - Temperature monitoring pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Bounded reading history and the windows derived from it.

use crate::reading::Reading;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Largest suffix any chain link reads. History never needs more.
pub const HISTORY_CAPACITY: usize = 12;

/// Ring buffer of the most recent readings, oldest first.
#[derive(Debug, Clone)]
pub struct History {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl History {
    /// Create a history holding at most `capacity` readings (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a reading, evicting the oldest once full.
    pub fn push(&mut self, reading: Reading) {
        self.readings.push_back(reading);
        while self.readings.len() > self.capacity {
            self.readings.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent reading.
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    /// Same readings under a new capacity, keeping the newest when shrinking.
    pub fn resized(&self, capacity: usize) -> Self {
        let mut resized = Self::new(capacity);
        for reading in self.iter() {
            resized.push(*reading);
        }
        resized
    }

    /// Derive the temperature window, oldest to newest.
    ///
    /// Recomputed on every call; nothing is cached.
    pub fn window(&self) -> Window {
        Window {
            values: self.readings.iter().map(|r| r.value).collect(),
            as_of: self.latest().map(|r| r.timestamp),
        }
    }
}

/// Temperature values visible to one chain invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    values: Vec<f64>,
    as_of: Option<DateTime<Utc>>,
}

impl Window {
    /// Build a window directly from values, stamped `as_of`.
    pub fn new(values: Vec<f64>, as_of: DateTime<Utc>) -> Self {
        Self {
            values,
            as_of: Some(as_of),
        }
    }

    /// Window with no timestamp, used where only values matter.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values,
            as_of: None,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Newest value.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Value `n` positions from the end, 1-based (`nth_from_end(1)` is the newest).
    pub fn nth_from_end(&self, n: usize) -> Option<f64> {
        if n == 0 || n > self.values.len() {
            return None;
        }
        Some(self.values[self.values.len() - n])
    }

    /// Last `min(len, n)` values.
    pub fn suffix(&self, n: usize) -> &[f64] {
        let start = self.values.len().saturating_sub(n);
        &self.values[start..]
    }

    /// Timestamp of the newest reading, falling back to now.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }
}
