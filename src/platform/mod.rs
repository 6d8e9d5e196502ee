//! Platform window capabilities
//!
//! Things only some desktops can do (pinning the overlay above other windows,
//! launching it at login) sit behind [`WindowCapabilities`]. The concrete type
//! is picked at compile time; targets without support get [`NoopCapabilities`].

use anyhow::Result;

#[cfg(target_os = "linux")]
mod xdg;

#[cfg(target_os = "linux")]
pub use xdg::XdgAutostart;

/// Optional desktop integration features
pub trait WindowCapabilities {
    /// Short name for log messages
    fn name(&self) -> &'static str;

    /// Ask the window system to keep the overlay above other windows
    fn keep_on_top(&self) -> Result<()>;

    /// Whether the overlay is registered to start at login
    fn is_startup_registered(&self) -> bool;

    /// Register or unregister start at login
    fn set_startup_registration(&self, enabled: bool) -> Result<()>;
}

/// Capabilities for platforms without desktop integration
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCapabilities;

impl WindowCapabilities for NoopCapabilities {
    fn name(&self) -> &'static str {
        "none"
    }

    fn keep_on_top(&self) -> Result<()> {
        Ok(())
    }

    fn is_startup_registered(&self) -> bool {
        false
    }

    fn set_startup_registration(&self, enabled: bool) -> Result<()> {
        if enabled {
            log::warn!("Start at login is not supported on this platform");
        }
        Ok(())
    }
}

/// Capabilities of the platform this binary was built for
pub fn platform_capabilities() -> Box<dyn WindowCapabilities> {
    #[cfg(target_os = "linux")]
    {
        match XdgAutostart::for_current_user() {
            Ok(autostart) => return Box::new(autostart),
            Err(e) => log::warn!("Desktop integration disabled: {:#}", e),
        }
    }

    Box::new(NoopCapabilities)
}
