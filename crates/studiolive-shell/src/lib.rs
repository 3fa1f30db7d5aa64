//! Platform-free shell logic: action channel, navigation interception,
//! window registry, and the session that ties them to the store.

pub mod channel;
pub mod navigation;
pub mod session;
pub mod video;
pub mod windows;

pub use channel::{ActionChannel, ChannelOutcome, ChannelSink, InboundMessage, OutboundMessage};
pub use navigation::{
    handle_new_window, CommitEffects, ExternalOpener, Interception, NavigationDecision,
    NavigationInterceptor, NavigationPolicy, NewWindowDecision,
};
pub use session::Session;
pub use windows::{ManagedWindow, WindowOptions, WindowRegistry, CHAT_WINDOW_KEY, MAIN_WINDOW_KEY};
