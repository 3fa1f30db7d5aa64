//! Application state and the actions that transform it

use crate::error::{StudioError, StudioResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Wire tag of the only action the core reducer understands.
pub const CHANGE_URL: &str = "CHANGE_URL";

/// The authoritative application state.
///
/// `current_url` is the only field the shell reads. Anything else found in a
/// snapshot is carried in `extra` untouched, so unknown fields survive a
/// load/save cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationState {
    /// URL currently loaded in the primary surface
    #[serde(rename = "currentUrl", alias = "nowUrl")]
    pub current_url: String,

    /// Opaque pass-through fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApplicationState {
    pub fn new(current_url: impl Into<String>) -> Self {
        Self {
            current_url: current_url.into(),
            extra: Map::new(),
        }
    }

    /// Copy of this state pointing at a different URL
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            current_url: url.into(),
            extra: self.extra.clone(),
        }
    }
}

/// A requested state transition.
///
/// On the wire an action is `{"type": "...", "payload": ...}`. Types other
/// than [`CHANGE_URL`] decode into [`Action::Unrecognized`] and are passed
/// through the reducer without effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ChangeUrl { url: String },
    Unrecognized { kind: String, payload: Option<Value> },
}

impl Action {
    pub fn change_url(url: impl Into<String>) -> Self {
        Action::ChangeUrl { url: url.into() }
    }

    /// The wire `type` tag
    pub fn kind(&self) -> &str {
        match self {
            Action::ChangeUrl { .. } => CHANGE_URL,
            Action::Unrecognized { kind, .. } => kind,
        }
    }

    /// Structurally validate an untrusted JSON value as an action.
    pub fn from_value(value: &Value) -> StudioResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| StudioError::malformed_action("action is not an object"))?;

        let kind = match object.get("type") {
            Some(Value::String(kind)) if !kind.is_empty() => kind.as_str(),
            Some(Value::String(_)) => {
                return Err(StudioError::malformed_action("action type is empty"))
            }
            Some(_) => {
                return Err(StudioError::malformed_action("action type is not a string"))
            }
            None => return Err(StudioError::malformed_action("action has no type")),
        };

        let payload = object.get("payload").filter(|p| !p.is_null());

        if kind == CHANGE_URL {
            let url = payload
                .and_then(|p| p.get("url"))
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    StudioError::malformed_action("CHANGE_URL requires payload.url string")
                })?;
            return Ok(Action::change_url(url));
        }

        Ok(Action::Unrecognized {
            kind: kind.to_string(),
            payload: payload.cloned(),
        })
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".to_string(), Value::String(self.kind().to_string()));
        match self {
            Action::ChangeUrl { url } => {
                let mut payload = Map::new();
                payload.insert("url".to_string(), Value::String(url.clone()));
                object.insert("payload".to_string(), Value::Object(payload));
            }
            Action::Unrecognized { payload, .. } => {
                if let Some(payload) = payload {
                    object.insert("payload".to_string(), payload.clone());
                }
            }
        }
        Value::Object(object)
    }
}

impl Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Action::from_value(&value).map_err(serde::de::Error::custom)
    }
}
