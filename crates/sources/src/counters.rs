//! OS network counter collaborator
//!
//! The throughput sampler only sees [`NetworkCounters`]; the OS-backed
//! implementation sits on top of `sysinfo`.

use jsens_types::{InterfaceCounterSnapshot, InterfaceInfo};
use std::time::Instant;
use sysinfo::Networks;
use thiserror::Error;

/// Errors raised while talking to the OS network stats API
#[derive(Debug, Error)]
pub enum CounterError {
    #[error("failed to enumerate network interfaces: {0}")]
    Enumeration(String),
    #[error("failed to read counters for {interface}: {reason}")]
    Read { interface: String, reason: String },
}

/// Source of interface enumeration and cumulative byte counters
pub trait NetworkCounters {
    /// List interfaces in OS enumeration order
    fn interfaces(&mut self) -> Result<Vec<InterfaceInfo>, CounterError>;

    /// Read the counters of one interface, `None` if it no longer exists
    fn read_counters(
        &mut self,
        interface: &str,
    ) -> Result<Option<InterfaceCounterSnapshot>, CounterError>;
}

/// [`NetworkCounters`] backed by `sysinfo::Networks`
pub struct SysinfoCounters {
    networks: Networks,
}

impl SysinfoCounters {
    pub fn new() -> Self {
        log::info!("Creating Networks sysinfo instance");
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }

    fn snapshot(&self, interface: &str, timestamp: Instant) -> Option<InterfaceCounterSnapshot> {
        self.networks
            .iter()
            .find(|(name, _)| name.as_str() == interface)
            .map(|(name, data)| {
                InterfaceCounterSnapshot::new(
                    name.clone(),
                    data.total_transmitted(),
                    data.total_received(),
                    timestamp,
                )
            })
    }
}

impl Default for SysinfoCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkCounters for SysinfoCounters {
    fn interfaces(&mut self) -> Result<Vec<InterfaceInfo>, CounterError> {
        self.networks.refresh_list();
        Ok(self
            .networks
            .iter()
            .map(|(name, _)| interface_info(name))
            .collect())
    }

    fn read_counters(
        &mut self,
        interface: &str,
    ) -> Result<Option<InterfaceCounterSnapshot>, CounterError> {
        self.networks.refresh();
        let timestamp = Instant::now();
        if let Some(snapshot) = self.snapshot(interface, timestamp) {
            return Ok(Some(snapshot));
        }

        // The interface may have come up after the list was built
        self.networks.refresh_list();
        Ok(self.snapshot(interface, Instant::now()))
    }
}

/// `IFF_LOOPBACK` from `<net/if.h>`
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
const IFF_LOOPBACK: u32 = 0x8;

/// Parse the hex flag word from `/sys/class/net/<if>/flags`
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_interface_flags(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u32::from_str_radix(hex, 16).ok()
}

/// Classify an interface from its name alone
fn interface_info_from_name(name: &str) -> InterfaceInfo {
    let lower = name.to_lowercase();
    let is_loopback = lower == "lo" || lower.starts_with("lo0") || lower.contains("loopback");
    let is_virtual = lower.contains("virtual");
    InterfaceInfo::new(name, true, is_loopback, is_virtual)
}

#[cfg(target_os = "linux")]
fn interface_info(name: &str) -> InterfaceInfo {
    use std::fs;
    use std::path::Path;

    let fallback = interface_info_from_name(name);
    let base = Path::new("/sys/class/net").join(name);

    // "unknown" is what tun devices and some drivers report while passing traffic
    let is_up = fs::read_to_string(base.join("operstate"))
        .map(|state| matches!(state.trim(), "up" | "unknown"))
        .unwrap_or(fallback.is_up);
    let is_loopback = fs::read_to_string(base.join("flags"))
        .ok()
        .and_then(|raw| parse_interface_flags(&raw))
        .map(|flags| flags & IFF_LOOPBACK != 0)
        .unwrap_or(fallback.is_loopback);
    let is_virtual =
        fallback.is_virtual || Path::new("/sys/devices/virtual/net").join(name).exists();

    InterfaceInfo::new(name, is_up, is_loopback, is_virtual)
}

#[cfg(not(target_os = "linux"))]
fn interface_info(name: &str) -> InterfaceInfo {
    interface_info_from_name(name)
}
