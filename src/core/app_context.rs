//! Application context owning the overlay state

use crate::config::{Panel, PanelToggleError, PreferencesRecord, PreferencesStore};
use crate::platform::WindowCapabilities;
use anyhow::Result;
use jsens_core::DataSource;
use jsens_sources::{CalendarSource, NetworkSource};
use log::{info, warn};

/// Everything the overlay host needs, owned in one place.
///
/// Every mutating action writes the preferences file right away.
pub struct AppContext {
    preferences: PreferencesRecord,
    store: PreferencesStore,
    calendar: CalendarSource,
    network: NetworkSource,
    window: Box<dyn WindowCapabilities>,
}

impl AppContext {
    /// Load preferences and configure the sources from them
    pub fn new(
        store: PreferencesStore,
        mut network: NetworkSource,
        window: Box<dyn WindowCapabilities>,
    ) -> Self {
        let mut preferences = store.load();
        if !preferences.show_calendar && !preferences.show_network {
            warn!("Both panels are hidden in {:?}", store.path());
        }

        preferences.update_interval_ms =
            network.set_polling_interval(preferences.update_interval_ms);
        match preferences.interface.clone() {
            Some(interface) => network.set_interface(Some(interface)),
            None => {
                // Auto-selection is redone at every start and not persisted
                network.select_default_interface();
            }
        }

        info!("Using {} desktop integration", window.name());

        Self {
            preferences,
            store,
            calendar: CalendarSource::new(),
            network,
            window,
        }
    }

    pub fn preferences(&self) -> &PreferencesRecord {
        &self.preferences
    }

    pub fn calendar(&self) -> &CalendarSource {
        &self.calendar
    }

    pub fn calendar_mut(&mut self) -> &mut CalendarSource {
        &mut self.calendar
    }

    pub fn network(&self) -> &NetworkSource {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut NetworkSource {
        &mut self.network
    }

    /// Sources of the visible panels
    pub fn visible_sources(&self) -> Vec<&dyn DataSource> {
        let mut sources: Vec<&dyn DataSource> = Vec::with_capacity(2);
        if self.preferences.show_calendar {
            sources.push(&self.calendar);
        }
        if self.preferences.show_network {
            sources.push(&self.network);
        }
        sources
    }

    pub fn visible_sources_mut(&mut self) -> Vec<&mut dyn DataSource> {
        let mut sources: Vec<&mut dyn DataSource> = Vec::with_capacity(2);
        if self.preferences.show_calendar {
            sources.push(&mut self.calendar);
        }
        if self.preferences.show_network {
            sources.push(&mut self.network);
        }
        sources
    }

    fn persist(&self) {
        self.store.save(&self.preferences);
    }

    /// Record the window position after a drag
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.preferences.x = x;
        self.preferences.y = y;
        self.persist();
    }

    /// Show or hide a panel; hiding the last visible one is refused
    pub fn toggle_panel(&mut self, panel: Panel) -> Result<bool, PanelToggleError> {
        match self.preferences.toggle_panel(panel) {
            Ok(visible) => {
                self.persist();
                Ok(visible)
            }
            Err(e) => {
                warn!("{}", e);
                Err(e)
            }
        }
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        let opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            warn!("Ignoring opacity {}", opacity);
            self.preferences.opacity
        };
        self.preferences.opacity = opacity;
        self.persist();
    }

    pub fn set_font_size(&mut self, font_size: u32) {
        self.preferences.font_size = font_size.max(1);
        self.persist();
    }

    /// Change the network polling cadence
    pub fn set_polling_interval(&mut self, interval_ms: u64) {
        self.preferences.update_interval_ms = self.network.set_polling_interval(interval_ms);
        self.persist();
    }

    /// Monitor a specific interface, or `None` to let the overlay pick one.
    ///
    /// Names are trimmed and a blank name counts as `None`, matching what the
    /// preferences file can hold.
    pub fn set_interface(&mut self, interface: Option<String>) {
        let interface = interface
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        match &interface {
            Some(_) => self.network.set_interface(interface.clone()),
            None => {
                self.network.select_default_interface();
            }
        }
        self.preferences.interface = interface;
        self.persist();
    }

    pub fn keep_on_top(&self) -> Result<()> {
        self.window.keep_on_top()
    }

    pub fn is_startup_registered(&self) -> bool {
        self.window.is_startup_registered()
    }

    pub fn set_startup_registration(&self, enabled: bool) -> Result<()> {
        self.window.set_startup_registration(enabled)
    }

    /// Text of the visible panels, one entry per line
    pub fn overlay_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(4);
        if self.preferences.show_calendar {
            lines.push(self.calendar.get_text("weekday_name").to_string());
            lines.push(self.calendar.get_text("date_string").to_string());
        }
        if self.preferences.show_network {
            lines.push(self.network.get_text("download_text").to_string());
            lines.push(self.network.get_text("upload_text").to_string());
        }
        lines
    }

    /// Flush preferences before exit
    pub fn shutdown(&self) {
        info!("Saving preferences to {:?}", self.store.path());
        self.persist();
    }
}
