//! Scripts injected into content surfaces

use std::path::Path;
use tracing::{info, warn};

/// State bridge, installed on every surface at creation
pub const PRELOAD_JS: &str = include_str!("scripts/preload.js");

/// Chat popout opener, evaluated on livestreaming pages
pub const CHATBOX_JS: &str = include_str!("scripts/chatbox.js");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scripts {
    pub preload: String,
    pub chatbox: String,
}

impl Default for Scripts {
    fn default() -> Self {
        Self {
            preload: PRELOAD_JS.to_string(),
            chatbox: CHATBOX_JS.to_string(),
        }
    }
}

impl Scripts {
    /// Bundled scripts, with files from `dir` taking precedence when readable
    pub fn load(dir: Option<&Path>) -> Self {
        let Some(dir) = dir else {
            return Self::default();
        };

        Self {
            preload: load_override(dir, "preload.js", PRELOAD_JS),
            chatbox: load_override(dir, "chatbox.js", CHATBOX_JS),
        }
    }

    /// Chat opener primed with the popout URL for the current video
    pub fn chatbox_for(&self, chat_url: &str) -> String {
        let url = serde_json::Value::String(chat_url.to_string());
        format!("window.__studioliveChatUrl = {};\n{}", url, self.chatbox)
    }
}

fn load_override(dir: &Path, name: &str, bundled: &str) -> String {
    let path = dir.join(name);
    match std::fs::read_to_string(&path) {
        Ok(code) => {
            info!("Using {} from {}", name, path.display());
            code
        }
        Err(e) => {
            warn!("Falling back to bundled {} ({}: {})", name, path.display(), e);
            bundled.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_bundled_scripts_without_override_dir() {
        let scripts = Scripts::load(None);
        assert!(scripts.preload.contains("state:request-initial"));
        assert!(scripts.chatbox.contains("__studioliveChatUrl"));
    }

    #[test]
    fn test_chatbox_is_primed_with_chat_url() {
        let script = Scripts::default()
            .chatbox_for("https://www.youtube.com/live_chat?is_popout=1&v=abc123");
        assert!(script.starts_with(
            "window.__studioliveChatUrl = \"https://www.youtube.com/live_chat?is_popout=1&v=abc123\";\n"
        ));
        assert!(script.ends_with(CHATBOX_JS));

        let hostile = Scripts::default().chatbox_for("\";alert(1);//");
        assert!(hostile.starts_with(r#"window.__studioliveChatUrl = "\";alert(1);//";"#));
    }

    #[test]
    fn test_override_dir_takes_precedence() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("chatbox.js"), "console.log('custom');").unwrap();

        let scripts = Scripts::load(Some(dir.path()));
        assert_eq!(scripts.chatbox, "console.log('custom');");
        // Missing files fall back individually
        assert_eq!(scripts.preload, PRELOAD_JS);
    }
}
