// Thermo - Temperature monitoring pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Timestamped temperature samples.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped temperature sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// When the sample was taken.
    pub timestamp: DateTime<Utc>,
    /// Temperature in degrees Celsius.
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Sample stamped with the current wall-clock time.
    pub fn now(value: f64) -> Self {
        Self::new(Utc::now(), value)
    }

    /// Sample at `millis` since the Unix epoch. Out-of-range values clamp to the epoch.
    pub fn at_millis(millis: i64, value: f64) -> Self {
        let timestamp = DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default();
        Self::new(timestamp, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_millis() {
        let reading = Reading::at_millis(5_000, 21.5);
        assert_eq!(reading.timestamp.timestamp_millis(), 5_000);
        assert_eq!(reading.value, 21.5);
    }

    #[test]
    fn test_reading_json() {
        let reading = Reading::at_millis(1_000, 30.25);
        let json = serde_json::to_string(&reading).unwrap();
        assert!(json.contains("30.25"));

        let back: Reading = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reading);
    }
}
