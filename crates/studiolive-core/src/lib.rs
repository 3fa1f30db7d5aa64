//! StudioLive Core Library
//!
//! This crate provides the shared state types, actions, errors, and
//! configuration used by every other StudioLive crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ShellConfig, WindowConfig};
pub use error::{StudioError, StudioResult};
pub use types::{Action, ApplicationState, CHANGE_URL};
