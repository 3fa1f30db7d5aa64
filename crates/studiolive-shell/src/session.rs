//! Privileged-side session
//!
//! Owns the store, the persistence adapter, the action channel, and the
//! window registry, and implements the checkpoints that tie them together:
//! committed navigations, primary-window close, and window deregistration.
//! The platform layer feeds events in; nothing here touches a real window or
//! WebView.

use crate::channel::{ActionChannel, ChannelOutcome, ChannelSink};
use crate::navigation::CommitEffects;
use crate::windows::{ManagedWindow, WindowRegistry};
use std::rc::Rc;
use std::sync::Arc;
use studiolive_core::{Action, ApplicationState};
use studiolive_store::{LoggingMiddleware, Persistence, Store, StoreCell};

pub struct Session<W: ManagedWindow> {
    store: StoreCell,
    persistence: Box<dyn Persistence>,
    channel: ActionChannel,
    windows: WindowRegistry<W>,
}

impl<W: ManagedWindow> Session<W> {
    /// Seed the store from the last checkpoint (or `default`) and wire the
    /// channel broadcaster to it.
    pub fn start(
        default: ApplicationState,
        persistence: Box<dyn Persistence>,
        sink: Rc<dyn ChannelSink>,
        always_on_top: bool,
    ) -> Self {
        let initial = persistence.load(default);
        let mut store = Store::new(initial);
        store.add_middleware(Box::new(LoggingMiddleware::default()));

        let channel = ActionChannel::new(sink);
        channel.attach(&mut store);

        Self {
            store: StoreCell::new(store),
            persistence,
            channel,
            windows: WindowRegistry::new(always_on_top),
        }
    }

    pub fn state(&self) -> Option<Arc<ApplicationState>> {
        self.store.state()
    }

    pub fn store(&self) -> &StoreCell {
        &self.store
    }

    pub fn channel(&self) -> &ActionChannel {
        &self.channel
    }

    pub fn windows(&self) -> &WindowRegistry<W> {
        &self.windows
    }

    pub fn windows_mut(&mut self) -> &mut WindowRegistry<W> {
        &mut self.windows
    }

    /// Checkpoint the current state
    pub fn save(&self) {
        if let Some(state) = self.store.state() {
            self.persistence.save(&state);
        }
    }

    /// A navigation of the primary surface committed (full or in-page load).
    ///
    /// Dispatches exactly one `CHANGE_URL`, saves once, and reports whether
    /// the chat bridge should be injected.
    pub fn navigation_committed(&mut self, url: &str) -> CommitEffects {
        let effects = CommitEffects::for_url(url);
        self.record_commit(&effects);
        effects
    }

    /// Checkpoint a commit whose effects were already worked out
    pub fn record_commit(&mut self, effects: &CommitEffects) {
        log::info!("Navigated to {}", effects.url);
        self.store.dispatch(Action::change_url(effects.url.as_str()));
        self.save();
    }

    /// Handle a raw IPC body from a content context.
    ///
    /// In-page navigation notices count as committed navigations only when
    /// they come from the primary surface.
    pub fn channel_message(
        &mut self,
        context: &str,
        raw: &str,
    ) -> (ChannelOutcome, Option<CommitEffects>) {
        let outcome = self.channel.receive(&mut self.store, context, raw);
        let effects = match &outcome {
            ChannelOutcome::InPageNavigation(url) if context == crate::MAIN_WINDOW_KEY => {
                Some(self.navigation_committed(url))
            }
            ChannelOutcome::InPageNavigation(url) => {
                log::debug!("Ignoring in-page navigation to {} from {}", url, context);
                None
            }
            _ => None,
        };
        (outcome, effects)
    }

    /// The primary window is closing: close every other live window, then
    /// checkpoint. Returns the keys that were closed.
    pub fn primary_closing(&mut self) -> Vec<String> {
        let closed = self.windows.close_secondary();
        for key in &closed {
            self.channel.forget(key);
        }
        self.save();
        closed
    }

    /// A window reported closed. Returns its key if it was registered.
    pub fn window_closed(&mut self, id: W::Id) -> Option<String> {
        let key = self.windows.window_closed(id)?;
        self.channel.forget(&key);
        Some(key)
    }

    /// Whether the process should terminate
    pub fn all_windows_closed(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::OutboundMessage;
    use crate::windows::tests::FakeWindow;
    use crate::{CHAT_WINDOW_KEY, MAIN_WINDOW_KEY};
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryPersistence {
        stored: RefCell<Option<ApplicationState>>,
        saves: Rc<RefCell<Vec<ApplicationState>>>,
    }

    impl Persistence for MemoryPersistence {
        fn load(&self, default: ApplicationState) -> ApplicationState {
            self.stored.borrow().clone().unwrap_or(default)
        }

        fn save(&self, state: &ApplicationState) {
            self.saves.borrow_mut().push(state.clone());
        }
    }

    struct NullSink;

    impl ChannelSink for NullSink {
        fn post(&self, _context: &str, _message: &OutboundMessage) {}
    }

    fn session() -> (Session<FakeWindow>, Rc<RefCell<Vec<ApplicationState>>>) {
        let persistence = MemoryPersistence::default();
        let saves = Rc::clone(&persistence.saves);
        let session = Session::start(
            ApplicationState::new("https://studio.youtube.com/"),
            Box::new(persistence),
            Rc::new(NullSink),
            true,
        );
        (session, saves)
    }

    #[test]
    fn test_start_resumes_from_checkpoint() {
        let persistence = MemoryPersistence::default();
        *persistence.stored.borrow_mut() = Some(ApplicationState::new("https://studio.youtube.com/saved"));
        let session: Session<FakeWindow> = Session::start(
            ApplicationState::new("https://studio.youtube.com/"),
            Box::new(persistence),
            Rc::new(NullSink),
            true,
        );
        assert_eq!(session.state().unwrap().current_url, "https://studio.youtube.com/saved");
    }

    #[test]
    fn test_livestream_commit_dispatches_saves_and_injects() {
        let (mut session, saves) = session();
        let url = "https://studio.youtube.com/video/abc123/livestreaming";

        let effects = session.navigation_committed(url);

        assert!(effects.inject_chat());
        assert_eq!(session.store().get().unwrap().version(), 1);
        assert_eq!(session.state().unwrap().current_url, url);
        assert_eq!(saves.borrow().len(), 1);
        assert_eq!(saves.borrow()[0].current_url, url);
    }

    #[test]
    fn test_other_commit_dispatches_and_saves_without_injection() {
        let (mut session, saves) = session();
        let url = "https://studio.youtube.com/channel/UC1/videos";

        let effects = session.navigation_committed(url);

        assert!(!effects.inject_chat());
        assert_eq!(session.store().get().unwrap().version(), 1);
        assert_eq!(saves.borrow().len(), 1);
    }

    #[test]
    fn test_recorded_commit_checkpoints_once() {
        let (mut session, saves) = session();
        let url = "https://studio.youtube.com/video/abc123/livestreaming";
        let effects = CommitEffects::for_url(url);

        session.record_commit(&effects);

        assert_eq!(session.store().get().unwrap().version(), 1);
        assert_eq!(session.state().unwrap().current_url, url);
        assert_eq!(saves.borrow().len(), 1);
    }

    #[test]
    fn test_in_page_navigation_from_primary_commits() {
        let (mut session, saves) = session();
        let raw = r#"{"channel":"navigation:in-page","url":"https://studio.youtube.com/video/xyz/livestreaming"}"#;

        let (_, effects) = session.channel_message(MAIN_WINDOW_KEY, raw);
        assert!(effects.unwrap().inject_chat());
        assert_eq!(saves.borrow().len(), 1);

        let (_, effects) = session.channel_message(CHAT_WINDOW_KEY, raw);
        assert!(effects.is_none());
        assert_eq!(saves.borrow().len(), 1);
    }

    #[test]
    fn test_malformed_channel_message_changes_nothing() {
        let (mut session, saves) = session();
        let before = session.state().unwrap();
        let (outcome, _) = session.channel_message(
            MAIN_WINDOW_KEY,
            r#"{"channel":"state:submit-action","action":{"payload":{"url":"https://evil.example/"}}}"#,
        );
        assert!(matches!(outcome, ChannelOutcome::Dropped(_)));
        assert_eq!(session.state().unwrap(), before);
        assert!(saves.borrow().is_empty());
    }

    #[test]
    fn test_primary_close_cascades_and_saves() {
        let (mut session, saves) = session();
        session.windows_mut().create_window(MAIN_WINDOW_KEY, FakeWindow::new(1));
        session.windows_mut().create_window(CHAT_WINDOW_KEY, FakeWindow::new(2));
        let mut gone = FakeWindow::new(3);
        gone.destroyed = true;
        session.windows_mut().create_window("Stale", gone);

        let closed = session.primary_closing();
        assert_eq!(closed, vec![CHAT_WINDOW_KEY.to_string()]);
        assert_eq!(saves.borrow().len(), 1);
        assert_eq!(session.windows().keys(), vec![MAIN_WINDOW_KEY]);
        assert!(!session.all_windows_closed());

        assert_eq!(session.window_closed(1), Some(MAIN_WINDOW_KEY.to_string()));
        assert!(session.all_windows_closed());
    }

    #[test]
    fn test_closed_window_stops_receiving_broadcasts() {
        let (mut session, _) = session();
        session.windows_mut().create_window(CHAT_WINDOW_KEY, FakeWindow::new(2));
        session.channel_message(CHAT_WINDOW_KEY, r#"{"channel":"state:request-initial"}"#);
        assert_eq!(session.channel().listeners(), vec![CHAT_WINDOW_KEY.to_string()]);

        session.window_closed(2);
        assert!(session.channel().listeners().is_empty());
    }
}
