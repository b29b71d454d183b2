//! Service layer for the ChezFlora order/quote lifecycle.
//!
//! Wraps the pure domain core (`chezflora-lifecycle`) with the async record
//! store contract, a persistence timeout, and fire-and-forget notifications.

pub mod env;
pub mod error;
pub mod notify;
pub mod service;
pub mod store;

pub use chezflora_lifecycle as lifecycle;

pub use error::ServiceError;
pub use notify::{BoundedSink, LogSink, Notification, NotificationSink, Outcome};
pub use service::Lifecycle;
pub use store::{MemoryStore, MemoryStoreError, RecordStore};
