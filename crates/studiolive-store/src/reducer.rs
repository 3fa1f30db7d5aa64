//! The application reducer

use studiolive_core::{Action, ApplicationState};

/// Signature every reducer must have
pub type ReduceFn = fn(&ApplicationState, &Action) -> ApplicationState;

/// Pure state transition. Unrecognized actions return an identical state.
pub fn reduce(state: &ApplicationState, action: &Action) -> ApplicationState {
    match action {
        Action::ChangeUrl { url } => state.with_url(url.as_str()),
        Action::Unrecognized { .. } => state.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_url_replaces_url_only() {
        let mut state = ApplicationState::new("https://studio.youtube.com/");
        state.extra.insert("volume".into(), json!(0.5));

        let next = reduce(&state, &Action::change_url("https://studio.youtube.com/channel/x"));
        assert_eq!(next.current_url, "https://studio.youtube.com/channel/x");
        assert_eq!(next.extra, state.extra);
    }

    #[test]
    fn test_unrecognized_action_is_identity() {
        let mut state = ApplicationState::new("https://studio.youtube.com/");
        state.extra.insert("layout".into(), json!({ "split": 0.3 }));

        for action in [
            Action::Unrecognized {
                kind: "TOGGLE_CHAT".into(),
                payload: None,
            },
            Action::Unrecognized {
                kind: "SET_LAYOUT".into(),
                payload: Some(json!({ "split": 0.9 })),
            },
        ] {
            assert_eq!(reduce(&state, &action), state);
        }
    }
}
