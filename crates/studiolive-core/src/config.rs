//! Shell configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that points at an alternative config file
pub const CONFIG_ENV_VAR: &str = "STUDIOLIVE_CONFIG";

/// Desktop Chrome user agent presented to the studio origins
pub const DESKTOP_IDENTITY: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/84.0.4147.125 Safari/537.36";

/// Shell configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Snapshot file, relative to the working directory unless absolute
    pub save_path: PathBuf,

    /// Canonical application start URL
    pub start_url: String,

    /// Landing page a finished sign-in bounces to
    pub sign_in_home_url: String,

    /// Substring marking a rejected sign-in
    pub sign_in_rejected_marker: String,

    /// Hosts whose new-window requests stay in-app
    pub allowed_window_hosts: Vec<String>,

    /// Identity for the studio origins
    pub desktop_identity: String,

    /// Identity for everything else
    pub fallback_identity: String,

    /// Primary window settings
    pub window: WindowConfig,

    /// Directory holding `preload.js` / `chatbox.js` overrides
    pub scripts_dir: Option<PathBuf>,

    /// Enable WebView devtools
    pub devtools: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,

    /// Keep the primary window above other windows
    pub always_on_top: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from(".save").join("app.json"),
            start_url: "https://studio.youtube.com/".to_string(),
            sign_in_home_url: "https://www.youtube.com/".to_string(),
            sign_in_rejected_marker: "https://accounts.google.com/signin/rejected".to_string(),
            allowed_window_hosts: vec![
                "studio.youtube.com".to_string(),
                "www.youtube.com".to_string(),
            ],
            desktop_identity: DESKTOP_IDENTITY.to_string(),
            fallback_identity: "Chrome".to_string(),
            window: WindowConfig::default(),
            scripts_dir: None,
            devtools: cfg!(debug_assertions),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "YouTubeLiveApp".to_string(),
            width: 1400.0,
            height: 900.0,
            always_on_top: true,
        }
    }
}

impl ShellConfig {
    /// Load configuration from the given path, returning defaults if not found
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("Failed to read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Config file location: `$STUDIOLIVE_CONFIG`, else the user config dir
    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studiolive")
            .join("studiolive.json")
    }
}
