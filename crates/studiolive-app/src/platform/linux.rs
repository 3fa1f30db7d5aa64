//! Linux platform implementation
//!
//! The menu bar lives in the GTK window's vbox. `xdg-open` hands URLs to
//! the desktop's default browser.

use super::{PlatformError, PlatformManager, PlatformResult};
use muda::Menu;
use std::process::Command;
use tao::window::Window;
use tracing::{debug, warn};

/// Linux platform manager
pub struct LinuxPlatform;

impl LinuxPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LinuxPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformManager for LinuxPlatform {
    fn initialize_menu(&self, window: &Window, menu: &Menu) -> PlatformResult<()> {
        use tao::platform::unix::WindowExtUnix;

        let Some(vbox) = window.default_vbox() else {
            // Headless or custom GTK setups: run without a menu bar
            warn!("GTK vbox not available for menu initialization");
            return Ok(());
        };

        menu.init_for_gtk_window(window.gtk_window(), Some(vbox))
            .map_err(|e| PlatformError::MenuInitFailed(format!("GTK init failed: {}", e)))?;

        debug!("Linux menu initialized successfully");
        Ok(())
    }

    fn open_external(&self, url: &str) -> PlatformResult<()> {
        debug!("Opening external URL: {}", url);

        Command::new("xdg-open")
            .arg(url)
            .spawn()
            .map_err(|e| PlatformError::OpenExternalFailed(format!("{}: {}", url, e)))?;

        Ok(())
    }

    fn platform_name(&self) -> &'static str {
        "Linux"
    }
}
