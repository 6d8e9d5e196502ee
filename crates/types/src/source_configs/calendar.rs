//! Calendar source configuration types.

use serde::{Deserialize, Serialize};

fn default_update_interval() -> u64 {
    60_000
}

/// Calendar source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarSourceConfig {
    #[serde(default = "default_update_interval")]
    pub update_interval_ms: u64,
    /// IANA time zone name; `None` uses the system local zone
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Default for CalendarSourceConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_update_interval(),
            timezone: None,
        }
    }
}
