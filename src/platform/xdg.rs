//! XDG autostart integration for Linux desktops

use super::WindowCapabilities;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const DESKTOP_FILE_NAME: &str = "jsens.desktop";

/// Start-at-login through `~/.config/autostart/jsens.desktop`
#[derive(Debug, Clone)]
pub struct XdgAutostart {
    autostart_dir: PathBuf,
    executable: PathBuf,
}

impl XdgAutostart {
    pub fn new(autostart_dir: impl Into<PathBuf>, executable: impl Into<PathBuf>) -> Self {
        Self {
            autostart_dir: autostart_dir.into(),
            executable: executable.into(),
        }
    }

    /// Autostart entry for the running executable in the user's config dir
    pub fn for_current_user() -> Result<Self> {
        let dirs = directories::BaseDirs::new()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        let executable = std::env::current_exe().context("Could not locate executable")?;
        Ok(Self::new(dirs.config_dir().join("autostart"), executable))
    }

    fn desktop_file(&self) -> PathBuf {
        self.autostart_dir.join(DESKTOP_FILE_NAME)
    }

    fn desktop_entry(executable: &Path) -> String {
        format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name=jsens\n\
             Comment=Jalali date and network throughput overlay\n\
             Exec=\"{}\"\n\
             Terminal=false\n\
             X-GNOME-Autostart-enabled=true\n",
            executable.display()
        )
    }
}

impl WindowCapabilities for XdgAutostart {
    fn name(&self) -> &'static str {
        "xdg"
    }

    fn keep_on_top(&self) -> Result<()> {
        // Stacking is requested through window hints by the toolkit host
        log::debug!("Keep-on-top is left to the window manager");
        Ok(())
    }

    fn is_startup_registered(&self) -> bool {
        self.desktop_file().exists()
    }

    fn set_startup_registration(&self, enabled: bool) -> Result<()> {
        let path = self.desktop_file();
        if enabled {
            std::fs::create_dir_all(&self.autostart_dir)
                .with_context(|| format!("Failed to create {}", self.autostart_dir.display()))?;
            std::fs::write(&path, Self::desktop_entry(&self.executable))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Registered autostart entry {:?}", path);
        } else if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            log::info!("Removed autostart entry {:?}", path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_unregister() {
        let dir = tempfile::tempdir().unwrap();
        let autostart = XdgAutostart::new(dir.path().join("autostart"), "/opt/jsens/bin/jsens");
        assert!(!autostart.is_startup_registered());

        autostart.set_startup_registration(true).unwrap();
        assert!(autostart.is_startup_registered());
        let entry = std::fs::read_to_string(autostart.desktop_file()).unwrap();
        assert!(entry.starts_with("[Desktop Entry]\n"));
        assert!(entry.contains("Exec=\"/opt/jsens/bin/jsens\"\n"));

        autostart.set_startup_registration(false).unwrap();
        assert!(!autostart.is_startup_registered());
        // Unregistering twice is fine
        autostart.set_startup_registration(false).unwrap();
    }
}
