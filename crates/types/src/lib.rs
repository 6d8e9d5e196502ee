//! jsens-types: Shared data types for the jsens overlay.
//!
//! This crate contains pure data types (samples, snapshots, source configs)
//! shared across all jsens crates. Nothing in here touches
//! the OS, so the types can be constructed freely in tests.

pub mod calendar;
pub mod network;
pub mod source_configs;

pub use calendar::{CalendarSample, JalaliDate};
pub use network::{InterfaceCounterSnapshot, InterfaceInfo, ThroughputRate, ThroughputSample};
pub use source_configs::{CalendarSourceConfig, NetworkSourceConfig, SourceConfig};
