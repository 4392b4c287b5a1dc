// Thermo - Temperature monitoring pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Monitor configuration.
//!
//! Names and wiring only. Alert thresholds are constants in [`crate::chain`].

use crate::chain::{build_chain, ChainLink, LinkKind, DEFAULT_ORDER};
use crate::error::{ConfigError, Result, ThermoError};
use crate::stats::StatKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Master configuration for a monitor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Sensor settings.
    pub sensor: SensorConfig,

    /// Operator settings.
    pub operator: OperatorConfig,

    /// Check chain wiring.
    pub chain: ChainConfig,
}

/// Sensor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Display name of the sensor.
    pub name: String,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            name: "Invernadero".to_string(),
        }
    }
}

/// Operator (observer) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    /// Display name of the operator.
    pub name: String,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            name: "Observer".to_string(),
        }
    }
}

/// Check chain wiring.
///
/// Both fields stay strings until [`ChainConfig::build`] so that unknown
/// names are reported as chain or strategy errors, not parse errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Link names, head first.
    pub links: Vec<String>,

    /// Strategy used by the statistics link.
    pub statistic: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            links: DEFAULT_ORDER.iter().map(|k| k.as_str().to_string()).collect(),
            statistic: StatKind::default().as_str().to_string(),
        }
    }
}

impl ChainConfig {
    /// Resolve the configured strategy.
    pub fn strategy(&self) -> Result<StatKind> {
        Ok(self.statistic.parse::<StatKind>()?)
    }

    /// Resolve the configured link kinds, head first.
    pub fn link_kinds(&self) -> Result<Vec<LinkKind>> {
        self.links
            .iter()
            .map(|name| name.parse::<LinkKind>().map_err(ThermoError::from))
            .collect()
    }

    /// Assemble the configured chain.
    ///
    /// `statistic` is only resolved when a statistics link is configured.
    pub fn build(&self) -> Result<Box<dyn ChainLink>> {
        let strategy = if self.link_kinds()?.contains(&LinkKind::Statistics) {
            self.strategy()?
        } else {
            StatKind::default()
        };
        Ok(build_chain(&self.links, strategy)?)
    }
}

impl MonitorConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check every field, including that the chain can be assembled.
    pub fn validate(&self) -> Result<()> {
        if self.sensor.name.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "sensor.name",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if self.operator.name.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "operator.name",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        self.chain.build()?;
        Ok(())
    }
}
