//! Shared constants for the overlay

use std::time::Duration;

/// Bytes per unit constants
pub const BYTES_PER_KB: f64 = 1024.0;
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Reference cadence for the calendar panel
pub const CALENDAR_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Default cadence for the network panel
pub const NETWORK_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Lower bound for any user-supplied polling interval, in milliseconds
pub const MIN_POLL_INTERVAL_MS: u64 = 100;
