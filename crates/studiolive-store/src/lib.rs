//! Authoritative application state: reducer, store, and snapshot persistence

pub mod persistence;
pub mod reducer;
pub mod store;

pub use persistence::{Persistence, SnapshotFile};
pub use reducer::{reduce, ReduceFn};
pub use store::{LoggingMiddleware, Middleware, Store, StoreCell, SubscriptionId};
