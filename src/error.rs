use std::time::Duration;

use chezflora_lifecycle::{RecordId, TransitionError};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Service-level failures, separated from the pure transition rules so
/// callers can tell a business-rule rejection from a store problem.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("record not found: {0}")]
    NotFound(RecordId),

    #[error("transition rejected: {0}")]
    Transition(#[from] TransitionError),

    /// The store failed after a locally-valid transition. The in-memory
    /// mutation is discarded, never reported as committed.
    #[error("persistence failure: {0}")]
    Persistence(#[source] BoxError),

    #[error("persistence timed out after {0:?}")]
    PersistenceTimeout(Duration),
}

impl ServiceError {
    pub(crate) fn persistence<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Persistence(Box::new(err))
    }
}
