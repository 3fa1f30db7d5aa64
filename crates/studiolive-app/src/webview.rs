//! Native windows and the WebViews hosted in them
//!
//! The primary surface gets the full set of hooks: navigation interception,
//! new-window policy, and commit reporting. Secondary surfaces (the chat
//! popup) only get the state bridge and the new-window policy.

use crate::bridge::{self, UserEvent};
use crate::platform::SystemBrowser;
use std::sync::{Arc, Mutex};
use studiolive_core::{StudioError, StudioResult};
use studiolive_shell::{
    handle_new_window, Interception, ManagedWindow, NavigationInterceptor, NavigationPolicy,
    NewWindowDecision, WindowOptions,
};
use tao::dpi::LogicalSize;
use tao::event_loop::{EventLoopProxy, EventLoopWindowTarget};
use tao::window::{Window, WindowBuilder, WindowId};
use tracing::{debug, info, warn};
use wry::http::header::{HeaderMap, HeaderValue, USER_AGENT};
use wry::{PageLoadEvent, WebView, WebViewBuilder};

/// A tao window with its single WebView
pub struct AppWindow {
    // Declared first so the WebView is dropped before its window
    webview: WebView,
    window: Window,
    destroyed: bool,
}

impl AppWindow {
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Fire-and-forget script evaluation
    pub fn evaluate_script(&self, script: &str) {
        if let Err(e) = self.webview.evaluate_script(script) {
            warn!("Script evaluation failed: {}", e);
        }
    }

    /// Load `url` presenting `identity` as the user agent
    pub fn load_with_identity(&self, url: &str, identity: &str) -> StudioResult<()> {
        let value = HeaderValue::from_str(identity)
            .map_err(|e| StudioError::webview(format!("Invalid user agent {:?}: {}", identity, e)))?;
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, value);

        self.webview
            .load_url_with_headers(url, headers)
            .map_err(|e| StudioError::webview(format!("Failed to load {}: {}", url, e)))
    }

    pub fn reload(&self) {
        self.evaluate_script("location.reload();");
    }
}

impl ManagedWindow for AppWindow {
    type Id = WindowId;

    fn id(&self) -> WindowId {
        self.window.id()
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn close(&mut self) {
        // The native window goes away when the registry drops this value
        self.window.set_visible(false);
        self.destroyed = true;
    }

    fn set_always_on_top(&self, always_on_top: bool) {
        self.window.set_always_on_top(always_on_top);
    }
}

/// Shared settings for every surface
#[derive(Clone)]
pub struct SurfaceSettings {
    pub preload: String,
    pub devtools: bool,
    pub policy: NavigationPolicy,
    pub browser: SystemBrowser,
    pub proxy: EventLoopProxy<UserEvent>,
}

fn build_window<T: 'static>(
    target: &EventLoopWindowTarget<T>,
    options: &WindowOptions,
) -> StudioResult<Window> {
    WindowBuilder::new()
        .with_title(&options.title)
        .with_inner_size(LogicalSize::new(options.width, options.height))
        .with_always_on_top(options.always_on_top)
        .build(target)
        .map_err(|e| StudioError::window(format!("Failed to create window: {}", e)))
}

fn attach(builder: WebViewBuilder<'_>, window: &Window) -> StudioResult<WebView> {
    #[cfg(target_os = "linux")]
    let result = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;

        match window.default_vbox() {
            Some(vbox) => builder.build_gtk(vbox),
            None => builder.build(window),
        }
    };

    #[cfg(not(target_os = "linux"))]
    let result = builder.build(window);

    result.map_err(|e| StudioError::webview(format!("Failed to create WebView: {}", e)))
}

/// IPC bodies are forwarded untouched; validation happens on the event loop
fn forward_ipc(
    proxy: EventLoopProxy<UserEvent>,
    context: &'static str,
) -> impl Fn(wry::http::Request<String>) + 'static {
    move |request| {
        bridge::forward(
            &proxy,
            UserEvent::ChannelMessage {
                context: context.to_string(),
                body: request.body().clone(),
            },
        );
    }
}

/// New-window requests never open natively: allow-listed ones are handed to
/// the event loop when `materialize` is set, the rest go to the system browser.
fn new_window_handler(
    settings: &SurfaceSettings,
    materialize: bool,
) -> impl Fn(String) -> bool + 'static {
    let policy = settings.policy.clone();
    let browser = settings.browser.clone();
    let proxy = settings.proxy.clone();

    move |url| {
        if handle_new_window(&policy, &url, &browser) == NewWindowDecision::OpenInApp {
            if materialize {
                bridge::forward(&proxy, UserEvent::OpenWindow(url));
            } else {
                debug!("Ignoring in-app window request from secondary surface: {}", url);
            }
        }
        false
    }
}

/// Create the primary window. `identity` is the user agent for `options.url`,
/// as planned by the interceptor.
pub fn create_primary<T: 'static>(
    target: &EventLoopWindowTarget<T>,
    options: &WindowOptions,
    identity: &str,
    settings: &SurfaceSettings,
    interceptor: Arc<Mutex<NavigationInterceptor>>,
) -> StudioResult<AppWindow> {
    let url = options
        .url
        .as_deref()
        .ok_or_else(|| StudioError::window("Primary window needs a start URL"))?;
    let window = build_window(target, options)?;

    let nav_proxy = settings.proxy.clone();
    let load_proxy = settings.proxy.clone();

    let builder = WebViewBuilder::new()
        .with_url(url)
        .with_user_agent(identity)
        .with_devtools(settings.devtools)
        .with_clipboard(true)
        .with_initialization_script(&settings.preload)
        .with_ipc_handler(forward_ipc(
            settings.proxy.clone(),
            studiolive_shell::MAIN_WINDOW_KEY,
        ))
        .with_navigation_handler(move |url| {
            let plan = match interceptor.lock() {
                Ok(mut interceptor) => interceptor.intercept(&url),
                Err(_) => {
                    warn!("Navigation interceptor poisoned, allowing {}", url);
                    return true;
                }
            };

            match plan {
                Interception::Proceed => true,
                Interception::Reload { url, identity } => {
                    bridge::forward(&nav_proxy, UserEvent::LoadUrl { url, identity });
                    false
                }
            }
        })
        .with_new_window_req_handler(new_window_handler(settings, true))
        .with_on_page_load_handler(move |event, url| {
            if let PageLoadEvent::Finished = event {
                bridge::forward(&load_proxy, UserEvent::NavigationCommitted(url));
            }
        });

    let webview = attach(builder, &window)?;
    info!("Primary window created at {}", url);

    Ok(AppWindow {
        webview,
        window,
        destroyed: false,
    })
}

/// Create a secondary window whose surface talks to the host as `context`
pub fn create_secondary<T: 'static>(
    target: &EventLoopWindowTarget<T>,
    options: &WindowOptions,
    context: &'static str,
    settings: &SurfaceSettings,
) -> StudioResult<AppWindow> {
    let url = options
        .url
        .as_deref()
        .ok_or_else(|| StudioError::window(format!("{} needs a URL", context)))?;
    let window = build_window(target, options)?;

    let builder = WebViewBuilder::new()
        .with_url(url)
        .with_user_agent(settings.policy.identity_for(url))
        .with_devtools(settings.devtools)
        .with_clipboard(true)
        .with_initialization_script(&settings.preload)
        .with_ipc_handler(forward_ipc(settings.proxy.clone(), context))
        .with_new_window_req_handler(new_window_handler(settings, false));

    let webview = attach(builder, &window)?;
    info!("{} created at {}", context, url);

    Ok(AppWindow {
        webview,
        window,
        destroyed: false,
    })
}
