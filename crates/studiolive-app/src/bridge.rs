//! Event-loop plumbing between WebView callbacks and the session
//!
//! WebView callbacks run outside the session's borrow, so they only forward
//! [`UserEvent`]s through the event loop proxy. Outbound channel messages
//! take the same route, which keeps script evaluation out of store dispatch.

use studiolive_shell::{ChannelSink, OutboundMessage};
use tao::event_loop::{EventLoopClosed, EventLoopProxy};
use tracing::{debug, error};

/// User events for cross-WebView communication
#[derive(Debug, Clone)]
pub enum UserEvent {
    /// Raw IPC body posted by the surface registered under `context`
    ChannelMessage { context: String, body: String },
    /// Script to evaluate in the surface registered under `context`
    Deliver { context: String, script: String },
    /// The primary surface finished loading `url`
    NavigationCommitted(String),
    /// Reissue a primary-surface load with `identity` as the user agent
    LoadUrl { url: String, identity: String },
    /// An allow-listed new-window request to materialize in-app
    OpenWindow(String),
    /// A menu item with this id was activated
    Menu(String),
}

impl UserEvent {
    /// Short description for log lines
    pub fn describe(&self) -> String {
        match self {
            UserEvent::ChannelMessage { context, .. } => format!("IPC from {}", context),
            UserEvent::Deliver { context, .. } => format!("message for {}", context),
            UserEvent::NavigationCommitted(url) => format!("page load notice for {}", url),
            UserEvent::LoadUrl { url, .. } => format!("reissued load of {}", url),
            UserEvent::OpenWindow(url) => format!("window request for {}", url),
            UserEvent::Menu(id) => format!("menu event {}", id),
        }
    }
}

/// Queue `event` on the loop. Once the loop has exited the event is dropped.
pub fn forward(proxy: &EventLoopProxy<UserEvent>, event: UserEvent) {
    if let Err(EventLoopClosed(event)) = proxy.send_event(event) {
        debug!("Event loop gone, dropping {}", event.describe());
    }
}

/// Script that hands `message` to the surface's state bridge
pub fn delivery_script(message: &OutboundMessage) -> serde_json::Result<String> {
    let json = serde_json::to_string(message)?;
    Ok(format!(
        "window.studiolive && window.studiolive.__receive({});",
        json
    ))
}

/// Channel sink that queues deliveries on the event loop
pub struct ProxySink {
    proxy: EventLoopProxy<UserEvent>,
}

impl ProxySink {
    pub fn new(proxy: EventLoopProxy<UserEvent>) -> Self {
        Self { proxy }
    }
}

impl ChannelSink for ProxySink {
    fn post(&self, context: &str, message: &OutboundMessage) {
        let script = match delivery_script(message) {
            Ok(script) => script,
            Err(e) => {
                error!("Failed to encode message for {}: {}", context, e);
                return;
            }
        };

        forward(
            &self.proxy,
            UserEvent::Deliver {
                context: context.to_string(),
                script,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studiolive_core::ApplicationState;

    #[test]
    fn test_delivery_script_embeds_message() {
        let message = OutboundMessage::StateChanged {
            state: ApplicationState::new("https://studio.youtube.com/"),
            version: 2,
        };
        let script = delivery_script(&message).unwrap();

        assert!(script.starts_with("window.studiolive && window.studiolive.__receive({"));
        assert!(script.contains(r#""channel":"state:changed""#));
        assert!(script.contains(r#""currentUrl":"https://studio.youtube.com/""#));
        assert!(script.ends_with("});"));
    }

    #[test]
    fn test_dropped_events_are_described() {
        let ipc = UserEvent::ChannelMessage {
            context: "ChatWindow".into(),
            body: "{}".into(),
        };
        assert_eq!(ipc.describe(), "IPC from ChatWindow");

        let load = UserEvent::LoadUrl {
            url: "https://accounts.google.com/ServiceLogin".into(),
            identity: "Chrome".into(),
        };
        assert_eq!(
            load.describe(),
            "reissued load of https://accounts.google.com/ServiceLogin"
        );
        assert_eq!(UserEvent::Menu("reload".into()).describe(), "menu event reload");
    }

    #[test]
    fn test_delivery_script_escapes_hostile_urls() {
        let message = OutboundMessage::InitialState {
            state: ApplicationState::new("https://studio.youtube.com/\");alert(1);//"),
        };
        let script = delivery_script(&message).unwrap();
        assert!(script.contains(r#"\");alert(1);//"#));
    }
}
