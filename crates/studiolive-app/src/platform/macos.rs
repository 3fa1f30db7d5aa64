//! macOS platform implementation
//!
//! The menu bar belongs to NSApp, and clipboard shortcuts only work when an
//! Edit menu is installed there. The first submenu becomes the application
//! menu, so one is prepended before the shared menus.

use super::{PlatformError, PlatformManager, PlatformResult};
use muda::{Menu, PredefinedMenuItem, Submenu};
use std::process::Command;
use tao::window::Window;
use tracing::debug;

/// macOS platform manager
pub struct MacOSPlatform;

impl MacOSPlatform {
    pub fn new() -> Self {
        Self
    }

    fn create_app_menu(&self, menu: &Menu) -> PlatformResult<()> {
        let app_menu = Submenu::new("StudioLive", true);

        app_menu
            .append_items(&[
                &PredefinedMenuItem::about(Some("About StudioLive"), None),
                &PredefinedMenuItem::separator(),
                &PredefinedMenuItem::hide(None),
                &PredefinedMenuItem::hide_others(None),
                &PredefinedMenuItem::show_all(None),
                &PredefinedMenuItem::separator(),
                &PredefinedMenuItem::quit(None),
            ])
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to build app menu: {}", e)))?;

        menu.insert(&app_menu, 0)
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to insert app menu: {}", e)))?;

        Ok(())
    }
}

impl Default for MacOSPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformManager for MacOSPlatform {
    fn initialize_menu(&self, _window: &Window, menu: &Menu) -> PlatformResult<()> {
        self.create_app_menu(menu)?;
        menu.init_for_nsapp();

        debug!("macOS menu initialized");
        Ok(())
    }

    fn open_external(&self, url: &str) -> PlatformResult<()> {
        debug!("Opening external URL: {}", url);

        Command::new("open")
            .arg(url)
            .spawn()
            .map_err(|e| PlatformError::OpenExternalFailed(format!("{}: {}", url, e)))?;

        Ok(())
    }

    fn platform_name(&self) -> &'static str {
        "macOS"
    }
}
