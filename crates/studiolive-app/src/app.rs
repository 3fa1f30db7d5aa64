//! Event-loop side of the shell
//!
//! Owns the session and reacts to window, user, and menu events. Everything
//! here runs on the event-loop thread.

use crate::bridge::UserEvent;
use crate::menu::{AppMenu, MenuCommand};
use crate::scripts::Scripts;
use crate::webview::{self, AppWindow, SurfaceSettings};
use std::sync::{Arc, Mutex};
use studiolive_shell::{
    CommitEffects, ManagedWindow, NavigationInterceptor, Session, WindowOptions, CHAT_WINDOW_KEY,
};
use tao::event_loop::EventLoopWindowTarget;
use tao::window::WindowId;
use tracing::{error, info, warn};

pub struct App {
    session: Session<AppWindow>,
    scripts: Scripts,
    settings: SurfaceSettings,
    interceptor: Arc<Mutex<NavigationInterceptor>>,
    menu: AppMenu,
}

impl App {
    pub fn new(
        session: Session<AppWindow>,
        scripts: Scripts,
        settings: SurfaceSettings,
        interceptor: Arc<Mutex<NavigationInterceptor>>,
        menu: AppMenu,
    ) -> Self {
        Self {
            session,
            scripts,
            settings,
            interceptor,
            menu,
        }
    }

    /// True once every window is gone and the loop should exit
    pub fn finished(&self) -> bool {
        self.session.all_windows_closed()
    }

    pub fn close_requested(&mut self, window_id: WindowId) {
        if self.session.windows().is_primary(window_id) {
            info!("Main window close requested, shutting down...");
            let closed = self.session.primary_closing();
            if !closed.is_empty() {
                info!("Closed secondary windows: {}", closed.join(", "));
            }
        }

        if let Some(key) = self.session.window_closed(window_id) {
            info!("{} closed", key);
        }
    }

    pub fn handle_user_event(
        &mut self,
        event: UserEvent,
        target: &EventLoopWindowTarget<UserEvent>,
    ) {
        match event {
            UserEvent::ChannelMessage { context, body } => {
                let (_, effects) = self.session.channel_message(&context, &body);
                if let Some(effects) = effects {
                    self.apply_commit(&effects);
                }
            }
            UserEvent::Deliver { context, script } => match self.session.windows().get(&context) {
                Some(window) if !window.is_destroyed() => window.evaluate_script(&script),
                _ => info!("Dropping delivery to closed surface {}", context),
            },
            UserEvent::NavigationCommitted(url) => {
                let effects = match self.interceptor.lock() {
                    Ok(mut interceptor) => interceptor.committed(&url),
                    Err(_) => {
                        warn!("Navigation interceptor poisoned, committing {} as is", url);
                        CommitEffects::for_url(&url)
                    }
                };
                self.session.record_commit(&effects);
                self.apply_commit(&effects);
            }
            UserEvent::LoadUrl { url, identity } => {
                let Some(primary) = self.session.windows().primary() else {
                    warn!("No primary window to load {}", url);
                    return;
                };
                if let Err(e) = primary.load_with_identity(&url, &identity) {
                    error!("{}", e);
                }
            }
            UserEvent::OpenWindow(url) => self.open_chat_window(&url, target),
            UserEvent::Menu(id) => self.handle_menu(&id),
        }
    }

    fn apply_commit(&self, effects: &CommitEffects) {
        let Some(chat_url) = effects.chat_url() else {
            return;
        };
        if let Some(primary) = self.session.windows().primary() {
            info!(
                "Livestream page for {:?}, injecting chat bridge",
                effects.video_id
            );
            primary.evaluate_script(&self.scripts.chatbox_for(&chat_url));
        }
    }

    fn open_chat_window(&mut self, url: &str, target: &EventLoopWindowTarget<UserEvent>) {
        let options = WindowOptions::chat_popup(url);
        match webview::create_secondary(target, &options, CHAT_WINDOW_KEY, &self.settings) {
            Ok(window) => {
                self.session.windows_mut().create_window(CHAT_WINDOW_KEY, window);
            }
            Err(e) => error!("Failed to open chat window: {}", e),
        }
    }

    fn handle_menu(&mut self, id: &str) {
        match MenuCommand::from_id(id) {
            Some(MenuCommand::ToggleAlwaysOnTop) => {
                let always_on_top = self.session.windows_mut().toggle_always_on_top();
                self.menu.sync_always_on_top(always_on_top);
                info!("Always on top: {}", always_on_top);
            }
            Some(MenuCommand::Reload) => {
                if let Some(primary) = self.session.windows().primary() {
                    primary.reload();
                }
            }
            Some(MenuCommand::Quit) => {
                if let Some(id) = self.session.windows().primary().map(ManagedWindow::id) {
                    self.close_requested(id);
                }
            }
            None => {}
        }
    }
}
