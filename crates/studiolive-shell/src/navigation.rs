//! Navigation interception
//!
//! Every URL transition of the primary surface passes through here before the
//! load is committed:
//!
//! - [`NavigationPolicy::rewrite_target`] maps sign-in bounce pages back to the
//!   studio start page.
//! - [`NavigationPolicy::identity_for`] picks the user agent the destination
//!   should see.
//! - [`NavigationInterceptor::intercept`] turns both into a pre-load plan for
//!   the WebView callback.
//! - [`NavigationPolicy::decide_new_window`] keeps allow-listed popups in-app
//!   and hands everything else to the system browser.

use crate::video;
use studiolive_core::{ShellConfig, StudioError, StudioResult};
use url::{Host, Url};

/// Outcome of checking a target URL against the rewrite rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Rewrite(String),
}

/// Outcome of a request to open a new window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewWindowDecision {
    /// Allow-listed origin; the window manager materializes it
    OpenInApp,
    /// Cancel in-app and open in the system browser
    OpenExternal(String),
}

/// What the navigation callback should do with a pending load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
    /// Let the load continue unchanged
    Proceed,
    /// Cancel it and issue this load instead, with `identity` as user agent
    Reload { url: String, identity: String },
}

/// Side effects owed to a committed navigation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitEffects {
    pub url: String,
    pub video_id: Option<String>,
}

impl CommitEffects {
    pub fn for_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            video_id: video::video_id(url).map(str::to_string),
        }
    }

    /// The chat bridge is injected only on livestreaming pages
    pub fn inject_chat(&self) -> bool {
        self.video_id.is_some()
    }

    /// Popout chat page the injected bridge should open
    pub fn chat_url(&self) -> Option<String> {
        self.video_id.as_deref().map(video::chat_popout_url)
    }
}

/// Opens URLs outside the application
pub trait ExternalOpener {
    fn open_external(&self, url: &str) -> StudioResult<()>;
}

#[derive(Debug, Clone)]
pub struct NavigationPolicy {
    start_url: String,
    sign_in_home_url: String,
    sign_in_rejected_marker: String,
    allowed_window_hosts: Vec<String>,
    desktop_identity: String,
    fallback_identity: String,
}

impl NavigationPolicy {
    pub fn from_config(config: &ShellConfig) -> StudioResult<Self> {
        let allowed_window_hosts = config
            .allowed_window_hosts
            .iter()
            .map(|host| match Host::parse(host) {
                Ok(Host::Domain(domain)) => Ok(domain),
                Ok(other) => Ok(other.to_string()),
                Err(e) => Err(StudioError::config(format!(
                    "Invalid allowed window host {:?}: {}",
                    host, e
                ))),
            })
            .collect::<StudioResult<Vec<_>>>()?;

        Ok(Self {
            start_url: config.start_url.clone(),
            sign_in_home_url: config.sign_in_home_url.clone(),
            sign_in_rejected_marker: config.sign_in_rejected_marker.clone(),
            allowed_window_hosts,
            desktop_identity: config.desktop_identity.clone(),
            fallback_identity: config.fallback_identity.clone(),
        })
    }

    pub fn start_url(&self) -> &str {
        &self.start_url
    }

    /// First match wins: exact sign-in home, then rejected sign-in marker.
    pub fn rewrite_target(&self, url: &str) -> NavigationDecision {
        if url == self.sign_in_home_url {
            log::info!("Sign-in home detected, rewriting {} to start page", url);
            return NavigationDecision::Rewrite(self.start_url.clone());
        }

        if url.contains(&self.sign_in_rejected_marker) {
            log::info!("Rejected sign-in detected, rewriting to start page");
            return NavigationDecision::Rewrite(self.start_url.clone());
        }

        NavigationDecision::Allow
    }

    /// URL after rewrite rules are applied
    pub fn resolve(&self, url: &str) -> String {
        match self.rewrite_target(url) {
            NavigationDecision::Rewrite(target) => target,
            NavigationDecision::Allow => url.to_string(),
        }
    }

    pub fn decide_new_window(&self, url: &str) -> NewWindowDecision {
        if self.is_allowed_origin(url) {
            NewWindowDecision::OpenInApp
        } else {
            NewWindowDecision::OpenExternal(url.to_string())
        }
    }

    /// Scheme, host and port must all match an allow-listed origin. Userinfo
    /// and look-alike suffixes parse to a foreign host and fall through.
    fn is_allowed_origin(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };

        matches!(parsed.scheme(), "http" | "https")
            && parsed.port().is_none()
            && parsed
                .host_str()
                .is_some_and(|host| self.allowed_window_hosts.iter().any(|allowed| allowed == host))
    }

    /// User agent for a destination: studio and www origins get the desktop
    /// identity, everything else the generic fallback.
    pub fn identity_for(&self, url: &str) -> &str {
        if url.starts_with("https://studio.") || url.starts_with("https://www.") {
            &self.desktop_identity
        } else {
            &self.fallback_identity
        }
    }
}

/// Decide a new-window request, forwarding non-allow-listed URLs to `opener`.
///
/// Returns the decision so the caller can materialize in-app windows. The
/// in-app open is always cancelled for external URLs, even if the opener fails.
pub fn handle_new_window(
    policy: &NavigationPolicy,
    url: &str,
    opener: &dyn ExternalOpener,
) -> NewWindowDecision {
    let decision = policy.decide_new_window(url);
    if let NewWindowDecision::OpenExternal(ref external) = decision {
        log::info!("Opening {} in the external browser", external);
        if let Err(e) = opener.open_external(external) {
            log::error!("Failed to open external URL {}: {}", external, e);
        }
    }
    decision
}

/// Stateful wrapper that applies rewrites and identities before loads.
///
/// The surface keeps the user agent it was built with. A load that needs a
/// different one is cancelled and reissued with the identity attached to the
/// request, and that holds for every such load, not just the first after a
/// switch. The reissued URL is remembered and allowed through when the
/// callback sees it again.
#[derive(Debug)]
pub struct NavigationInterceptor {
    policy: NavigationPolicy,
    pending: Option<String>,
    surface_identity: Option<String>,
}

impl NavigationInterceptor {
    pub fn new(policy: NavigationPolicy) -> Self {
        Self {
            policy,
            pending: None,
            surface_identity: None,
        }
    }

    pub fn policy(&self) -> &NavigationPolicy {
        &self.policy
    }

    /// Identity the surface was built with, once planned
    pub fn surface_identity(&self) -> Option<&str> {
        self.surface_identity.as_deref()
    }

    /// Plan the very first load of the surface. Returns the URL to load and
    /// the identity to create the surface with.
    pub fn initial_load(&mut self, url: &str) -> (String, String) {
        let target = self.policy.resolve(url);
        let identity = self.policy.identity_for(&target).to_string();
        self.pending = Some(target.clone());
        self.surface_identity = Some(identity.clone());
        (target, identity)
    }

    pub fn intercept(&mut self, url: &str) -> Interception {
        if self.pending.as_deref() == Some(url) {
            self.pending = None;
            return Interception::Proceed;
        }

        // about:, data: and blob: loads carry no user agent worth switching
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Interception::Proceed;
        }

        let target = self.policy.resolve(url);
        let identity = self.policy.identity_for(&target).to_string();

        if target == url && self.surface_identity.as_deref() == Some(identity.as_str()) {
            return Interception::Proceed;
        }

        log::debug!("Reissuing navigation {} as {} ({})", url, target, identity);
        self.pending = Some(target.clone());
        Interception::Reload {
            url: target,
            identity,
        }
    }

    /// A load finished. Settles any pending reissue of `url` and reports the
    /// side effects owed to the commit.
    pub fn committed(&mut self, url: &str) -> CommitEffects {
        if self.pending.as_deref() == Some(url) {
            self.pending = None;
        }
        CommitEffects::for_url(url)
    }
}
