//! Window registry
//!
//! Windows are keyed by name. The primary window always lives under
//! [`MAIN_WINDOW_KEY`]; secondary windows use caller-chosen keys and are
//! removed as soon as they report closed, so the registry never holds a stale
//! entry.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

pub const MAIN_WINDOW_KEY: &str = "MainWindow";
pub const CHAT_WINDOW_KEY: &str = "ChatWindow";

/// Construction options for a managed window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOptions {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub url: Option<String>,
    pub always_on_top: bool,
}

impl WindowOptions {
    pub fn new(title: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            url: None,
            always_on_top: false,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Options for the companion chat popup
    pub fn chat_popup(url: impl Into<String>) -> Self {
        Self::new("Live Chat", 420.0, 720.0).with_url(url)
    }
}

/// A native window the registry can manage
pub trait ManagedWindow {
    type Id: Copy + Eq + Hash + Debug;

    fn id(&self) -> Self::Id;

    /// True once the native window is gone
    fn is_destroyed(&self) -> bool;

    fn close(&mut self);

    fn set_always_on_top(&self, always_on_top: bool);
}

pub struct WindowRegistry<W: ManagedWindow> {
    windows: HashMap<String, W>,
    always_on_top: bool,
}

impl<W: ManagedWindow> WindowRegistry<W> {
    pub fn new(always_on_top: bool) -> Self {
        Self {
            windows: HashMap::new(),
            always_on_top,
        }
    }

    /// Register a window under `key`.
    ///
    /// A live window already registered under the same key is closed first.
    /// The primary window picks up the current always-on-top setting.
    pub fn create_window(&mut self, key: impl Into<String>, window: W) -> &mut W {
        let key = key.into();
        if let Some(mut previous) = self.windows.remove(&key) {
            if !previous.is_destroyed() {
                log::info!("Replacing window {}", key);
                previous.close();
            }
        }

        if key == MAIN_WINDOW_KEY {
            window.set_always_on_top(self.always_on_top);
        }

        log::debug!("Registered window {} ({:?})", key, window.id());
        self.windows.entry(key).or_insert(window)
    }

    /// Deregister the window that reported closed. Returns its key.
    pub fn window_closed(&mut self, id: W::Id) -> Option<String> {
        let key = self.key_of(id)?.to_string();
        self.windows.remove(&key);
        log::debug!("Window {} closed", key);
        Some(key)
    }

    pub fn key_of(&self, id: W::Id) -> Option<&str> {
        self.windows
            .iter()
            .find(|(_, window)| window.id() == id)
            .map(|(key, _)| key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&W> {
        self.windows.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut W> {
        self.windows.get_mut(key)
    }

    pub fn primary(&self) -> Option<&W> {
        self.get(MAIN_WINDOW_KEY)
    }

    pub fn is_primary(&self, id: W::Id) -> bool {
        self.key_of(id) == Some(MAIN_WINDOW_KEY)
    }

    /// Close and deregister one window
    pub fn close(&mut self, key: &str) -> bool {
        match self.windows.remove(key) {
            Some(mut window) => {
                if !window.is_destroyed() {
                    window.close();
                }
                true
            }
            None => false,
        }
    }

    /// Close every non-primary window that is still alive and drop all
    /// secondary entries. Returns the keys of the windows actually closed.
    pub fn close_secondary(&mut self) -> Vec<String> {
        let keys: Vec<String> = self
            .windows
            .keys()
            .filter(|key| key.as_str() != MAIN_WINDOW_KEY)
            .cloned()
            .collect();

        let mut closed = Vec::new();
        for key in keys {
            if let Some(mut window) = self.windows.remove(&key) {
                if window.is_destroyed() {
                    continue;
                }
                window.close();
                closed.push(key);
            }
        }
        closed.sort();
        closed
    }

    pub fn set_always_on_top(&mut self, always_on_top: bool) {
        self.always_on_top = always_on_top;
        if let Some(primary) = self.primary() {
            primary.set_always_on_top(always_on_top);
        }
    }

    pub fn toggle_always_on_top(&mut self) -> bool {
        let next = !self.always_on_top;
        self.set_always_on_top(next);
        next
    }

    pub fn is_always_on_top(&self) -> bool {
        self.always_on_top
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.windows.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
