//! The single source of truth for application state.
//!
//! A [`Store`] holds the current [`ApplicationState`] snapshot and replaces it
//! wholesale on every dispatch. Dispatch is strictly sequential: the reducer
//! runs, the version is bumped, then middleware and subscribers are notified
//! in registration order before `dispatch` returns.

use crate::reducer::{reduce, ReduceFn};
use std::sync::Arc;
use studiolive_core::{Action, ApplicationState};

/// Handle returned by [`Store::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&ApplicationState, u64)>;

/// Observes every completed dispatch
pub trait Middleware {
    fn on_dispatch(&mut self, action: &Action, previous: &ApplicationState, next: &ApplicationState);
}

/// Logs each dispatched action at debug level
#[derive(Debug, Default)]
pub struct LoggingMiddleware {
    dispatched: u64,
}

impl Middleware for LoggingMiddleware {
    fn on_dispatch(&mut self, action: &Action, previous: &ApplicationState, next: &ApplicationState) {
        self.dispatched += 1;
        log::debug!(
            "dispatch #{} {} ({} -> {})",
            self.dispatched,
            action.kind(),
            previous.current_url,
            next.current_url
        );
    }
}

pub struct Store {
    state: Arc<ApplicationState>,
    version: u64,
    reducer: ReduceFn,
    middleware: Vec<Box<dyn Middleware>>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Store {
    /// Create a store driven by the application reducer
    pub fn new(initial: ApplicationState) -> Self {
        Self::with_reducer(initial, reduce)
    }

    pub fn with_reducer(initial: ApplicationState, reducer: ReduceFn) -> Self {
        log::info!("Initializing state store at {}", initial.current_url);
        Self {
            state: Arc::new(initial),
            version: 0,
            reducer,
            middleware: Vec::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Latest snapshot. Older snapshots stay valid after later dispatches.
    pub fn state(&self) -> Arc<ApplicationState> {
        Arc::clone(&self.state)
    }

    /// Number of completed dispatches
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn add_middleware(&mut self, middleware: Box<dyn Middleware>) {
        self.middleware.push(middleware);
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&ApplicationState, u64) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Apply an action and notify observers before returning
    pub fn dispatch(&mut self, action: Action) {
        let previous = Arc::clone(&self.state);
        let next = Arc::new((self.reducer)(&previous, &action));
        self.state = Arc::clone(&next);
        self.version += 1;

        for middleware in &mut self.middleware {
            middleware.on_dispatch(&action, &previous, &next);
        }

        for (_, subscriber) in &mut self.subscribers {
            subscriber(&next, self.version);
        }
    }
}

/// Owned slot for the store.
///
/// Collaborators receive the cell by reference. Dispatching into an empty cell
/// is a no-op.
#[derive(Default)]
pub struct StoreCell {
    inner: Option<Store>,
}

impl StoreCell {
    pub fn empty() -> Self {
        Self { inner: None }
    }

    pub fn new(store: Store) -> Self {
        Self { inner: Some(store) }
    }

    /// Install a store, returning the previous one if any
    pub fn install(&mut self, store: Store) -> Option<Store> {
        self.inner.replace(store)
    }

    /// Returns `false` when no store has been installed yet
    pub fn dispatch(&mut self, action: Action) -> bool {
        match self.inner.as_mut() {
            Some(store) => {
                store.dispatch(action);
                true
            }
            None => {
                log::debug!("Dropping {} dispatched before store construction", action.kind());
                false
            }
        }
    }

    pub fn state(&self) -> Option<Arc<ApplicationState>> {
        self.inner.as_ref().map(Store::state)
    }

    pub fn get(&self) -> Option<&Store> {
        self.inner.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut Store> {
        self.inner.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn initial() -> ApplicationState {
        ApplicationState::new("https://studio.youtube.com/")
    }

    #[test]
    fn test_dispatch_sequence_matches_folded_reduce() {
        let actions = vec![
            Action::change_url("https://studio.youtube.com/a"),
            Action::Unrecognized {
                kind: "NOOP".into(),
                payload: Some(json!(1)),
            },
            Action::change_url("https://studio.youtube.com/b"),
            Action::change_url("https://studio.youtube.com/c"),
        ];

        let mut store = Store::new(initial());
        for action in actions.clone() {
            store.dispatch(action);
        }

        let expected = actions
            .iter()
            .fold(initial(), |state, action| reduce(&state, action));
        assert_eq!(*store.state(), expected);
        assert_eq!(store.version(), 4);
    }

    #[test]
    fn test_each_dispatch_is_observable_before_the_next() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = Store::new(initial());
        let log = Rc::clone(&seen);
        store.subscribe(move |state, version| {
            log.borrow_mut().push((version, state.current_url.clone()));
        });

        store.dispatch(Action::change_url("one"));
        store.dispatch(Action::change_url("two"));

        assert_eq!(
            *seen.borrow(),
            vec![(1, "one".to_string()), (2, "two".to_string())]
        );
    }

    #[test]
    fn test_snapshots_are_replaced_not_mutated() {
        let mut store = Store::new(initial());
        let before = store.state();
        store.dispatch(Action::change_url("https://studio.youtube.com/next"));
        assert_eq!(before.current_url, "https://studio.youtube.com/");
        assert!(!Arc::ptr_eq(&before, &store.state()));
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let count = Rc::new(RefCell::new(0));
        let mut store = Store::new(initial());
        let counter = Rc::clone(&count);
        let id = store.subscribe(move |_, _| *counter.borrow_mut() += 1);

        store.dispatch(Action::change_url("a"));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch(Action::change_url("b"));

        assert_eq!(*count.borrow(), 1);
    }

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl Middleware for Recorder {
        fn on_dispatch(&mut self, action: &Action, previous: &ApplicationState, next: &ApplicationState) {
            self.0.borrow_mut().push(format!(
                "{}:{}->{}",
                action.kind(),
                previous.current_url,
                next.current_url
            ));
        }
    }

    #[test]
    fn test_middleware_sees_previous_and_next_state() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = Store::new(ApplicationState::new("a"));
        store.add_middleware(Box::new(LoggingMiddleware::default()));
        store.add_middleware(Box::new(Recorder(Rc::clone(&seen))));

        store.dispatch(Action::change_url("b"));
        store.dispatch(Action::change_url("c"));

        assert_eq!(*seen.borrow(), vec!["CHANGE_URL:a->b", "CHANGE_URL:b->c"]);
    }

    #[test]
    fn test_empty_cell_dispatch_is_noop() {
        let mut cell = StoreCell::empty();
        assert!(!cell.dispatch(Action::change_url("x")));
        assert!(cell.state().is_none());

        cell.install(Store::new(initial()));
        assert!(cell.dispatch(Action::change_url("x")));
        assert_eq!(cell.state().unwrap().current_url, "x");
    }
}
