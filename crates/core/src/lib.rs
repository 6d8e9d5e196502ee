//! jsens-core: Core traits and shared constants for the jsens overlay.

pub mod constants;
mod data_source;

pub use constants::{
    BYTES_PER_KB, BYTES_PER_MB, CALENDAR_POLL_INTERVAL, MIN_POLL_INTERVAL_MS,
    NETWORK_POLL_INTERVAL,
};
pub use data_source::{DataSource, SourceMetadata};

// Re-export types used in trait signatures for convenience
pub use jsens_types::SourceConfig;
