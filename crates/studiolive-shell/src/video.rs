//! Livestream URL pattern matching

use regex::Regex;
use std::sync::OnceLock;

/// Matches a studio livestreaming page and captures the video id.
///
/// Exactly one capture group: the `\w+` path segment between `/video/` and
/// `/livestreaming`. The pattern is unanchored, so it also matches when the
/// URL carries a query string or fragment.
pub const LIVESTREAM_PATTERN: &str = r"https://studio\.youtube\.com/video/(\w+)/livestreaming";

fn livestream_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LIVESTREAM_PATTERN).expect("livestream pattern is valid"))
}

/// Video id of a livestreaming URL, `None` if the URL does not match
pub fn video_id(url: &str) -> Option<&str> {
    livestream_regex()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Popout chat page for a video
pub fn chat_popout_url(video_id: &str) -> String {
    format!("https://www.youtube.com/live_chat?is_popout=1&v={}", video_id)
}
