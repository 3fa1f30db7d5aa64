//! Error types for StudioLive

use thiserror::Error;

/// Result type alias for StudioLive operations
pub type StudioResult<T> = Result<T, StudioError>;

/// Main error type for StudioLive
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Malformed action: {0}")]
    MalformedAction(String),

    #[error("Malformed channel message: {0}")]
    MalformedMessage(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error("WebView error: {0}")]
    WebView(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StudioError {
    /// Create a new malformed action error
    pub fn malformed_action(msg: impl Into<String>) -> Self {
        Self::MalformedAction(msg.into())
    }

    /// Create a new malformed channel message error
    pub fn malformed_message(msg: impl Into<String>) -> Self {
        Self::MalformedMessage(msg.into())
    }

    /// Create a new persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new window error
    pub fn window(msg: impl Into<String>) -> Self {
        Self::Window(msg.into())
    }

    /// Create a new WebView error
    pub fn webview(msg: impl Into<String>) -> Self {
        Self::WebView(msg.into())
    }

    /// Create a new platform error
    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform(msg.into())
    }
}
