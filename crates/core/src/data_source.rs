//! Data source trait and related types

use anyhow::Result;
use jsens_types::SourceConfig;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Metadata about a data source
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    /// Unique identifier, also the scheduling key of the update loop
    pub id: String,
    /// Recommended update interval
    pub default_interval: Duration,
}

/// Trait for all data sources
///
/// A source is polled by the host on its own cadence. Each call to
/// [`DataSource::update`] refreshes the cached values, which panels then read
/// through [`DataSource::values_ref`].
pub trait DataSource {
    /// Get metadata about this source
    fn metadata(&self) -> &SourceMetadata;

    /// Update internal state
    ///
    /// Sources swallow transient collaborator failures and surface them as
    /// placeholder values; an `Err` here means the source itself is broken.
    fn update(&mut self) -> Result<()>;

    /// Get a reference to the cached values
    fn values_ref(&self) -> &HashMap<String, Value>;

    /// Get a specific value by key
    fn get_value(&self, key: &str) -> Option<&Value> {
        self.values_ref().get(key)
    }

    /// Get a text value by key, empty if missing or not a string
    fn get_text(&self, key: &str) -> &str {
        self.get_value(key).and_then(Value::as_str).unwrap_or("")
    }

    /// Current polling interval
    fn update_interval(&self) -> Duration {
        self.metadata().default_interval
    }

    /// Configure the data source with typed configuration
    fn configure_typed(&mut self, _config: &SourceConfig) -> Result<()> {
        Ok(())
    }

    /// Get the current typed configuration (if available)
    fn get_typed_config(&self) -> Option<SourceConfig> {
        None
    }
}
