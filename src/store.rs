use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use chezflora_lifecycle::{Record, RecordId, StatusModel};

/// Narrow async contract over whatever holds the record collection.
///
/// The service issues `save` only after a successful local transition; a
/// failed `save` means the transition is not committed.
#[async_trait]
pub trait RecordStore<S: StatusModel>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Snapshot of every record, in insertion order.
    async fn get_all(&self) -> Result<Vec<Record<S>>, Self::Error>;

    async fn get_by_id(&self, id: &RecordId) -> Result<Option<Record<S>>, Self::Error>;

    /// Persists one record, returning the canonical copy.
    async fn save(&self, record: Record<S>) -> Result<Record<S>, Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("injected store failure: {0}")]
    Injected(String),
}

/// In-memory reference store, also used as the test double.
///
/// Keeps records in insertion order. Supports injecting a failure message or
/// a save delay to exercise the service's persistence-failure and timeout
/// paths.
#[derive(Debug, Clone)]
pub struct MemoryStore<S: StatusModel> {
    records: Arc<RwLock<Vec<Record<S>>>>,
    fail_with: Option<String>,
    save_delay: Option<Duration>,
}

impl<S: StatusModel> Default for MemoryStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StatusModel> MemoryStore<S> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            fail_with: None,
            save_delay: None,
        }
    }

    pub async fn with_records(records: Vec<Record<S>>) -> Self {
        let store = Self::new();
        *store.records.write().await = records;
        store
    }

    /// Every call fails with the given message.
    pub fn with_failure(message: impl Into<String>) -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            fail_with: Some(message.into()),
            save_delay: None,
        }
    }

    /// Delays every `save` by the given duration.
    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = Some(delay);
        self
    }

    pub async fn seed(&self, record: Record<S>) {
        self.records.write().await.push(record);
    }

    fn check_failure(&self) -> Result<(), MemoryStoreError> {
        match &self.fail_with {
            Some(message) => Err(MemoryStoreError::Injected(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<S: StatusModel> RecordStore<S> for MemoryStore<S> {
    type Error = MemoryStoreError;

    async fn get_all(&self) -> Result<Vec<Record<S>>, Self::Error> {
        self.check_failure()?;
        Ok(self.records.read().await.clone())
    }

    async fn get_by_id(&self, id: &RecordId) -> Result<Option<Record<S>>, Self::Error> {
        self.check_failure()?;
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|record| record.id == *id)
            .cloned())
    }

    async fn save(&self, record: Record<S>) -> Result<Record<S>, Self::Error> {
        if let Some(delay) = self.save_delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failure()?;

        let mut records = self.records.write().await;
        match records.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(record)
    }
}
