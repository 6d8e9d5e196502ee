//! Overlay preferences and their `key=value` file format

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::migration;

/// Name of the preferences file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.txt";

const KEY_X: &str = "x";
const KEY_Y: &str = "y";
const KEY_SHOW_CALENDAR: &str = "show_calendar";
const KEY_SHOW_NETWORK: &str = "show_network";
const KEY_INTERFACE: &str = "interface";
const KEY_OPACITY: &str = "opacity";
const KEY_UPDATE_INTERVAL: &str = "update_interval";
const KEY_FONT_SIZE: &str = "font_size";

/// One of the two overlay panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Calendar,
    Network,
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Panel::Calendar => write!(f, "calendar"),
            Panel::Network => write!(f, "network"),
        }
    }
}

/// Rejected user action on the panel toggles
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PanelToggleError {
    #[error("at least one panel must stay visible, the {0} panel was not hidden")]
    LastVisiblePanel(Panel),
}

/// Problem found while reading the preferences file
#[derive(Debug, Error, PartialEq)]
pub enum PreferenceError {
    #[error("line {line}: expected key=value, got '{content}'")]
    MalformedLine { line: usize, content: String },
    #[error("line {line}: invalid {key} '{value}': {reason}")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
        reason: String,
    },
}

/// Scalar settings of the overlay window
#[derive(Debug, Clone, PartialEq)]
pub struct PreferencesRecord {
    pub x: i32,
    pub y: i32,
    pub show_calendar: bool,
    pub show_network: bool,
    /// Interface picked by the user; `None` lets the overlay choose.
    ///
    /// Stored trimmed and never blank, the file cannot represent either.
    pub interface: Option<String>,
    /// Window opacity in `[0, 1]`
    pub opacity: f64,
    /// Network polling interval
    pub update_interval_ms: u64,
    pub font_size: u32,
}

impl Default for PreferencesRecord {
    fn default() -> Self {
        Self {
            x: 100,
            y: 100,
            show_calendar: true,
            show_network: true,
            interface: None,
            opacity: 0.6,
            update_interval_ms: 1000,
            font_size: 10,
        }
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err("expected true or false".to_string()),
    }
}

fn parse_positive<T>(value: &str) -> Result<T, String>
where
    T: std::str::FromStr + PartialOrd + Default,
    T::Err: fmt::Display,
{
    let parsed = value.parse::<T>().map_err(|e| e.to_string())?;
    if parsed <= T::default() {
        return Err("must be positive".to_string());
    }
    Ok(parsed)
}

impl PreferencesRecord {
    pub fn is_visible(&self, panel: Panel) -> bool {
        match panel {
            Panel::Calendar => self.show_calendar,
            Panel::Network => self.show_network,
        }
    }

    /// Flip the visibility of a panel, returning its new state.
    ///
    /// Hiding the only visible panel is rejected and leaves both flags as
    /// they were.
    pub fn toggle_panel(&mut self, panel: Panel) -> Result<bool, PanelToggleError> {
        let (target, other) = match panel {
            Panel::Calendar => (self.show_calendar, self.show_network),
            Panel::Network => (self.show_network, self.show_calendar),
        };
        if target && !other {
            return Err(PanelToggleError::LastVisiblePanel(panel));
        }

        let visible = !target;
        match panel {
            Panel::Calendar => self.show_calendar = visible,
            Panel::Network => self.show_network = visible,
        }
        Ok(visible)
    }

    /// Parse preferences text.
    ///
    /// Every field starts at its default; each valid line overrides one
    /// field. Problems are collected and the affected field keeps its default.
    pub fn parse(content: &str) -> (Self, Vec<PreferenceError>) {
        let mut record = Self::default();
        let mut errors = Vec::new();

        for (index, raw_line) in content.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw_line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                errors.push(PreferenceError::MalformedLine {
                    line,
                    content: trimmed.to_string(),
                });
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            if let Err(reason) = record.apply(key, value) {
                errors.push(PreferenceError::InvalidValue {
                    line,
                    key: key.to_string(),
                    value: value.to_string(),
                    reason,
                });
            }
        }

        (record, errors)
    }

    /// Validate one value and store it in its field
    fn apply(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            KEY_X => self.x = value.parse().map_err(|e: std::num::ParseIntError| e.to_string())?,
            KEY_Y => self.y = value.parse().map_err(|e: std::num::ParseIntError| e.to_string())?,
            KEY_SHOW_CALENDAR => self.show_calendar = parse_bool(value)?,
            KEY_SHOW_NETWORK => self.show_network = parse_bool(value)?,
            KEY_INTERFACE => {
                self.interface = (!value.is_empty()).then(|| value.to_string());
            }
            KEY_OPACITY => {
                let opacity: f64 = value
                    .parse()
                    .map_err(|e: std::num::ParseFloatError| e.to_string())?;
                if !(0.0..=1.0).contains(&opacity) {
                    return Err("must be between 0 and 1".to_string());
                }
                self.opacity = opacity;
            }
            KEY_UPDATE_INTERVAL => self.update_interval_ms = parse_positive(value)?,
            KEY_FONT_SIZE => self.font_size = parse_positive(value)?,
            _ => debug!("Ignoring unknown preference key '{}'", key),
        }
        Ok(())
    }

    /// Serialize to the `key=value` file format
    pub fn to_file_string(&self) -> String {
        let lines = [
            format!("{}={}", KEY_X, self.x),
            format!("{}={}", KEY_Y, self.y),
            format!("{}={}", KEY_SHOW_CALENDAR, self.show_calendar),
            format!("{}={}", KEY_SHOW_NETWORK, self.show_network),
            format!("{}={}", KEY_INTERFACE, self.interface.as_deref().unwrap_or("")),
            format!("{}={}", KEY_OPACITY, self.opacity),
            format!("{}={}", KEY_UPDATE_INTERVAL, self.update_interval_ms),
            format!("{}={}", KEY_FONT_SIZE, self.font_size),
        ];
        let mut content = lines.join("\n");
        content.push('\n');
        content
    }
}

/// Reads and writes [`PreferencesRecord`] at a fixed path
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
    /// Extra directories searched for the legacy position file
    legacy_dirs: Vec<PathBuf>,
}

impl PreferencesStore {
    /// Store at `path`; the legacy position file is also looked up in the
    /// working directory, where older releases wrote it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            legacy_dirs: std::env::current_dir().into_iter().collect(),
        }
    }

    /// Also search `dir` for the legacy position file
    pub fn with_legacy_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.legacy_dirs.push(dir.into());
        self
    }

    /// Store at the platform config directory
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Get the preferences file path
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("com", "github.jsens", "jsens")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences, never failing.
    ///
    /// A missing file yields defaults, seeded from a legacy position file if
    /// one is found. Unreadable files and bad lines are logged.
    pub fn load(&self) -> PreferencesRecord {
        if !self.path.exists() {
            let mut record = PreferencesRecord::default();
            let legacy = self
                .legacy_position_paths()
                .iter()
                .find_map(|path| migration::load_legacy_position(path));
            if let Some((x, y)) = legacy {
                info!("Migrated window position ({}, {}) from legacy file", x, y);
                record.x = x;
                record.y = y;
            }
            return record;
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {:?}, using defaults: {}", self.path, e);
                return PreferencesRecord::default();
            }
        };

        let (record, errors) = PreferencesRecord::parse(&content);
        for error in &errors {
            warn!("{:?}: {}", self.path, error);
        }
        info!("Loaded preferences from {:?}", self.path);
        record
    }

    /// Save preferences, logging instead of returning failures
    pub fn save(&self, record: &PreferencesRecord) {
        if let Err(e) = self.try_save(record) {
            warn!("Failed to save preferences: {:#}", e);
        }
    }

    /// Save preferences to disk
    pub fn try_save(&self, record: &PreferencesRecord) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        std::fs::write(&self.path, record.to_file_string())
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!("Saved preferences to {:?}", self.path);
        Ok(())
    }

    /// Candidate legacy files, next to the config file first
    fn legacy_position_paths(&self) -> Vec<PathBuf> {
        let config_dir = self.path.parent().unwrap_or_else(|| Path::new(""));
        let mut paths = vec![config_dir.join(migration::LEGACY_POSITION_FILE)];
        for dir in &self.legacy_dirs {
            let candidate = dir.join(migration::LEGACY_POSITION_FILE);
            if !paths.contains(&candidate) {
                paths.push(candidate);
            }
        }
        paths
    }
}
