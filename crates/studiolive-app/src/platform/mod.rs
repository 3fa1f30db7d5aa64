//! Platform abstraction layer
//!
//! Menu attachment and handing URLs to the system browser differ across
//! macOS, Windows, and Linux. Everything else in the shell is platform-free.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

use muda::Menu;
use std::sync::Arc;
use studiolive_core::{StudioError, StudioResult};
use studiolive_shell::ExternalOpener;
use tao::window::Window;

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Platform-specific error types
#[derive(Debug, Clone)]
pub enum PlatformError {
    /// Menu initialization failed
    MenuInitFailed(String),
    /// Failed to open external URL
    OpenExternalFailed(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::MenuInitFailed(msg) => write!(f, "Menu initialization failed: {}", msg),
            PlatformError::OpenExternalFailed(msg) => write!(f, "Failed to open external: {}", msg),
        }
    }
}

impl std::error::Error for PlatformError {}

impl From<PlatformError> for StudioError {
    fn from(err: PlatformError) -> Self {
        StudioError::platform(err.to_string())
    }
}

/// Trait for platform-specific operations
pub trait PlatformManager: Send + Sync {
    /// Attach the menu bar to the window.
    ///
    /// On macOS the menu belongs to the application rather than the window.
    fn initialize_menu(&self, window: &Window, menu: &Menu) -> PlatformResult<()>;

    /// Open a URL in the system's default browser
    fn open_external(&self, url: &str) -> PlatformResult<()>;

    /// Platform name for logging
    fn platform_name(&self) -> &'static str;
}

/// Get the platform manager for the current operating system
pub fn get_platform_manager() -> Arc<dyn PlatformManager> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(macos::MacOSPlatform::new())
    }

    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::WindowsPlatform::new())
    }

    #[cfg(target_os = "linux")]
    {
        Arc::new(linux::LinuxPlatform::new())
    }
}

/// Hands new-window requests that must not stay in-app to the system browser
#[derive(Clone)]
pub struct SystemBrowser {
    platform: Arc<dyn PlatformManager>,
}

impl SystemBrowser {
    pub fn new(platform: Arc<dyn PlatformManager>) -> Self {
        Self { platform }
    }
}

impl ExternalOpener for SystemBrowser {
    fn open_external(&self, url: &str) -> StudioResult<()> {
        self.platform.open_external(url).map_err(StudioError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakePlatform {
        opened: Mutex<Vec<String>>,
        fail: bool,
    }

    impl PlatformManager for FakePlatform {
        fn initialize_menu(&self, _window: &Window, _menu: &Menu) -> PlatformResult<()> {
            Ok(())
        }

        fn open_external(&self, url: &str) -> PlatformResult<()> {
            if self.fail {
                return Err(PlatformError::OpenExternalFailed(url.to_string()));
            }
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }

        fn platform_name(&self) -> &'static str {
            "Fake"
        }
    }

    #[test]
    fn test_system_browser_forwards_to_platform() {
        let platform = Arc::new(FakePlatform::default());
        let browser = SystemBrowser::new(platform.clone());

        browser.open_external("https://example.com/").unwrap();
        assert_eq!(*platform.opened.lock().unwrap(), vec!["https://example.com/"]);
    }

    #[test]
    fn test_system_browser_maps_platform_errors() {
        let browser = SystemBrowser::new(Arc::new(FakePlatform {
            fail: true,
            ..Default::default()
        }));

        let err = browser.open_external("https://example.com/").unwrap_err();
        assert!(matches!(err, StudioError::Platform(_)));
        assert!(err.to_string().contains("https://example.com/"));
    }
}
