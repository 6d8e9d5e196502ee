//! Configuration management

mod migration;
mod settings;

pub use migration::{load_legacy_position, parse_legacy_position, LEGACY_POSITION_FILE};
pub use settings::{
    Panel, PanelToggleError, PreferenceError, PreferencesRecord, PreferencesStore,
    CONFIG_FILE_NAME,
};
