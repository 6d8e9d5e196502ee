//! Source configuration types for all data sources.

pub mod calendar;
pub mod network;

pub use calendar::CalendarSourceConfig;
pub use network::NetworkSourceConfig;

use serde::{Deserialize, Serialize};

/// Typed configuration for any source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source_type", rename_all = "snake_case")]
pub enum SourceConfig {
    Calendar(CalendarSourceConfig),
    Network(NetworkSourceConfig),
}

impl SourceConfig {
    pub fn source_type(&self) -> &'static str {
        match self {
            SourceConfig::Calendar(_) => "calendar",
            SourceConfig::Network(_) => "network",
        }
    }

    pub fn update_interval_ms(&self) -> u64 {
        match self {
            SourceConfig::Calendar(config) => config.update_interval_ms,
            SourceConfig::Network(config) => config.update_interval_ms,
        }
    }
}
