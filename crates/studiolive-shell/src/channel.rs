//! Action channel between the privileged host and content surfaces.
//!
//! Content surfaces are untrusted. They talk to the host only through JSON
//! strings posted over the WebView IPC bridge and never see the store itself:
//!
//! ```text
//! content ── {"channel":"state:request-initial"} ──────────────▶ host
//! content ◀─ {"channel":"state:initial","state":{..}} ───────── host
//! content ── {"channel":"state:submit-action","action":{..}} ─▶ host ─▶ dispatch
//! content ◀─ {"channel":"state:changed","state":{..},"version":n} host (after every dispatch)
//! content ── {"channel":"navigation:in-page","url":".."} ─────▶ host
//! ```
//!
//! Every inbound message is decoded and validated before anything reaches the
//! store. Malformed messages are logged and dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use studiolive_core::{Action, ApplicationState, StudioError, StudioResult};
use studiolive_store::{Store, StoreCell, SubscriptionId};
use url::Url;

pub const REQUEST_INITIAL_STATE: &str = "state:request-initial";
pub const SUBMIT_ACTION: &str = "state:submit-action";
pub const IN_PAGE_NAVIGATION: &str = "navigation:in-page";
pub const INITIAL_STATE: &str = "state:initial";
pub const STATE_CHANGED: &str = "state:changed";

#[derive(Debug, Deserialize)]
#[serde(tag = "channel")]
enum RawInbound {
    #[serde(rename = "state:request-initial")]
    RequestInitialState,
    #[serde(rename = "state:submit-action")]
    SubmitAction { action: Value },
    #[serde(rename = "navigation:in-page")]
    InPageNavigation { url: String },
}

/// A validated message from a content surface
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    RequestInitialState,
    SubmitAction(Action),
    InPageNavigation(String),
}

impl InboundMessage {
    /// Decode and validate a raw IPC body
    pub fn decode(raw: &str) -> StudioResult<Self> {
        let inbound: RawInbound = serde_json::from_str(raw)
            .map_err(|e| StudioError::malformed_message(e.to_string()))?;

        match inbound {
            RawInbound::RequestInitialState => Ok(InboundMessage::RequestInitialState),
            RawInbound::SubmitAction { action } => {
                Action::from_value(&action).map(InboundMessage::SubmitAction)
            }
            RawInbound::InPageNavigation { url } => {
                let parsed = Url::parse(&url)?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(StudioError::malformed_message(format!(
                        "in-page navigation to unsupported scheme {}",
                        parsed.scheme()
                    )));
                }
                Ok(InboundMessage::InPageNavigation(url))
            }
        }
    }
}

/// A message from the host to a content surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "channel")]
pub enum OutboundMessage {
    #[serde(rename = "state:initial")]
    InitialState { state: ApplicationState },
    #[serde(rename = "state:changed")]
    StateChanged { state: ApplicationState, version: u64 },
}

/// Delivers outbound messages to a content context
pub trait ChannelSink {
    fn post(&self, context: &str, message: &OutboundMessage);
}

/// What happened to an inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelOutcome {
    /// Initial state was sent back to the requesting context
    Replied,
    /// The action reached the store
    Dispatched,
    /// The surface reported a same-document navigation
    InPageNavigation(String),
    /// Rejected; nothing was dispatched
    Dropped(String),
}

/// Host side of the action channel.
///
/// Cloning shares the sink and the set of listening contexts, which is how the
/// broadcaster subscribed to the store sees contexts that join later.
#[derive(Clone)]
pub struct ActionChannel {
    sink: Rc<dyn ChannelSink>,
    listeners: Rc<RefCell<BTreeSet<String>>>,
}

impl ActionChannel {
    pub fn new(sink: Rc<dyn ChannelSink>) -> Self {
        Self {
            sink,
            listeners: Rc::new(RefCell::new(BTreeSet::new())),
        }
    }

    /// Broadcast every state change to listening contexts
    pub fn attach(&self, store: &mut Store) -> SubscriptionId {
        let channel = self.clone();
        store.subscribe(move |state, version| channel.broadcast(state, version))
    }

    /// Handle one raw IPC body from `context`
    pub fn receive(&self, store: &mut StoreCell, context: &str, raw: &str) -> ChannelOutcome {
        let message = match InboundMessage::decode(raw) {
            Ok(message) => message,
            Err(e) => {
                log::warn!("Dropping message from {}: {}", context, e);
                return ChannelOutcome::Dropped(e.to_string());
            }
        };

        match message {
            InboundMessage::RequestInitialState => {
                let Some(state) = store.state() else {
                    log::warn!("Initial state requested by {} before store is ready", context);
                    return ChannelOutcome::Dropped("store not ready".to_string());
                };
                self.sink.post(
                    context,
                    &OutboundMessage::InitialState {
                        state: (*state).clone(),
                    },
                );
                self.listeners.borrow_mut().insert(context.to_string());
                ChannelOutcome::Replied
            }
            InboundMessage::SubmitAction(action) => {
                log::debug!("Action {} submitted by {}", action.kind(), context);
                if store.dispatch(action) {
                    ChannelOutcome::Dispatched
                } else {
                    ChannelOutcome::Dropped("store not ready".to_string())
                }
            }
            InboundMessage::InPageNavigation(url) => ChannelOutcome::InPageNavigation(url),
        }
    }

    pub fn broadcast(&self, state: &ApplicationState, version: u64) {
        let listeners = self.listeners.borrow();
        if listeners.is_empty() {
            return;
        }
        let message = OutboundMessage::StateChanged {
            state: state.clone(),
            version,
        };
        for context in listeners.iter() {
            self.sink.post(context, &message);
        }
    }

    /// Stop broadcasting to a context whose surface went away
    pub fn forget(&self, context: &str) -> bool {
        self.listeners.borrow_mut().remove(context)
    }

    pub fn listeners(&self) -> Vec<String> {
        self.listeners.borrow().iter().cloned().collect()
    }
}
