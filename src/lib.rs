//! jsens: an always-on-top Jalali date and network throughput overlay
//!
//! This library provides the host-side pieces of the overlay:
//! - Preferences persistence (`config`)
//! - The application context and polling loop (`core`)
//! - Optional desktop integration (`platform`)
//!
//! The samplers themselves live in `jsens-sources`.

pub mod config;
pub mod core;
pub mod platform;

// Re-export commonly used types
pub use config::{Panel, PreferencesRecord, PreferencesStore};
pub use core::{AppContext, UpdateManager};
pub use jsens_sources as sources;
pub use jsens_types as types;
