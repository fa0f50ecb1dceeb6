//! Planner configuration
//!
//! Everything here has a sensible default, so an empty (or missing) TOML
//! file yields a working planner. Values that are security decisions, such
//! as the default outbound traffic policy, live here instead of being
//! hard-coded in the planners.

use alb_types::TrafficPolicy;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level planner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Pool for dynamically assigned lane ports
    pub ports: PortRangeConfig,

    /// Lane name suffixes
    pub lanes: LaneSuffixes,

    /// Traffic policies used when a listener is built from config
    pub traffic: TrafficDefaults,

    /// Ports of the fixed four-listener topology
    pub default_topology: DefaultTopologyConfig,
}

impl PlannerConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: PlannerConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ports.start == 0 {
            return Err(ConfigError::Invalid("port pool may not include port 0".into()));
        }
        if self.ports.start > self.ports.end {
            return Err(ConfigError::Invalid(format!(
                "port pool start {} is above end {}",
                self.ports.start, self.ports.end
            )));
        }
        if self.lanes.blue.is_empty() || self.lanes.green.is_empty() {
            return Err(ConfigError::Invalid("lane suffixes may not be empty".into()));
        }
        if self.lanes.blue == self.lanes.green {
            return Err(ConfigError::Invalid(format!(
                "blue and green lanes share suffix {:?}",
                self.lanes.blue
            )));
        }

        let fixed = self.default_topology.ports();
        for (i, port) in fixed.iter().enumerate() {
            if *port == 0 {
                return Err(ConfigError::Invalid("default topology port 0".into()));
            }
            if fixed[i + 1..].contains(port) {
                return Err(ConfigError::Invalid(format!(
                    "default topology port {} used twice",
                    port
                )));
            }
            if self.ports.range().contains(port) {
                return Err(ConfigError::Invalid(format!(
                    "default topology port {} overlaps the lane port pool",
                    port
                )));
            }
        }

        Ok(())
    }
}

/// Inclusive port range for the lane port pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortRangeConfig {
    pub start: u16,
    pub end: u16,
}

impl PortRangeConfig {
    pub fn range(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }
}

impl Default for PortRangeConfig {
    fn default() -> Self {
        Self {
            start: 20000,
            end: 29999,
        }
    }
}

/// Name suffixes distinguishing the two lanes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneSuffixes {
    pub blue: String,
    pub green: String,
}

impl Default for LaneSuffixes {
    fn default() -> Self {
        Self {
            blue: "Blue".into(),
            green: "Green".into(),
        }
    }
}

/// Default traffic policies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficDefaults {
    pub inbound: TrafficPolicy,
    pub outbound: TrafficPolicy,
}

impl Default for TrafficDefaults {
    fn default() -> Self {
        Self {
            inbound: TrafficPolicy::Internet,
            outbound: TrafficPolicy::None,
        }
    }
}

/// Ports of the four default listeners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultTopologyConfig {
    pub production_http_port: u16,
    pub production_https_port: u16,
    pub deployment_http_port: u16,
    pub deployment_https_port: u16,
}

impl DefaultTopologyConfig {
    pub fn ports(&self) -> [u16; 4] {
        [
            self.production_http_port,
            self.production_https_port,
            self.deployment_http_port,
            self.deployment_https_port,
        ]
    }
}

impl Default for DefaultTopologyConfig {
    fn default() -> Self {
        Self {
            production_http_port: 80,
            production_https_port: 443,
            deployment_http_port: 8000,
            deployment_https_port: 44300,
        }
    }
}
