//! Network source configuration types.

use serde::{Deserialize, Serialize};

fn default_update_interval() -> u64 {
    1000
}

/// Network source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSourceConfig {
    /// Interface to monitor; `None` means nothing is selected
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default = "default_update_interval")]
    pub update_interval_ms: u64,
}

impl Default for NetworkSourceConfig {
    fn default() -> Self {
        Self {
            interface: None,
            update_interval_ms: default_update_interval(),
        }
    }
}
