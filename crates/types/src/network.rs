//! Network interface and throughput types.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// An interface as reported by the OS enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub is_up: bool,
    pub is_loopback: bool,
    pub is_virtual: bool,
}

impl InterfaceInfo {
    pub fn new(name: impl Into<String>, is_up: bool, is_loopback: bool, is_virtual: bool) -> Self {
        Self {
            name: name.into(),
            is_up,
            is_loopback,
            is_virtual,
        }
    }

    /// Whether this interface may carry user traffic worth monitoring
    pub fn is_candidate(&self) -> bool {
        self.is_up && !self.is_loopback && !self.is_virtual
    }
}

/// One point-in-time read of an interface's cumulative counters.
///
/// Counters are cumulative since the OS brought the interface up, not since
/// the sampler started. They may drop back if the interface restarts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCounterSnapshot {
    pub interface_name: String,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub timestamp: Instant,
}

impl InterfaceCounterSnapshot {
    pub fn new(
        interface_name: impl Into<String>,
        bytes_sent: u64,
        bytes_received: u64,
        timestamp: Instant,
    ) -> Self {
        Self {
            interface_name: interface_name.into(),
            bytes_sent,
            bytes_received,
            timestamp,
        }
    }
}

/// Download/upload rate in bytes per second
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThroughputRate {
    pub download_bytes_per_sec: f64,
    pub upload_bytes_per_sec: f64,
}

/// Result of one throughput sampling tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ThroughputSample {
    /// No interface selected, or none available
    #[default]
    NoInterface,
    /// The selected interface vanished or its counters could not be read
    Unavailable,
    /// First read after selecting an interface; no rate yet
    Baseline,
    Rate(ThroughputRate),
}

impl ThroughputSample {
    pub fn rate(&self) -> Option<ThroughputRate> {
        match self {
            ThroughputSample::Rate(rate) => Some(*rate),
            _ => None,
        }
    }

    /// Short status label used in the source values
    pub fn status(&self) -> &'static str {
        match self {
            ThroughputSample::NoInterface => "no_interface",
            ThroughputSample::Unavailable => "unavailable",
            ThroughputSample::Baseline => "baseline",
            ThroughputSample::Rate(_) => "rate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_filter() {
        assert!(InterfaceInfo::new("eth0", true, false, false).is_candidate());
        assert!(!InterfaceInfo::new("lo", true, true, false).is_candidate());
        assert!(!InterfaceInfo::new("docker0", true, false, true).is_candidate());
        assert!(!InterfaceInfo::new("wlan0", false, false, false).is_candidate());
    }

    #[test]
    fn test_sample_serialization() {
        let sample = ThroughputSample::Rate(ThroughputRate {
            download_bytes_per_sec: 2048.0,
            upload_bytes_per_sec: 0.0,
        });
        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains("\"status\":\"rate\""));

        let json = serde_json::to_string(&ThroughputSample::Unavailable).unwrap();
        assert_eq!(json, "{\"status\":\"unavailable\"}");
    }
}
