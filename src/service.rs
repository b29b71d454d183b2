use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use chezflora_lifecycle::{
    FilterSpec, OrderStatus, OrderTransition, Record, RecordId, Stats, StatsConfig, StatusModel,
    TransitionError, aggregate,
};

use crate::error::ServiceError;
use crate::notify::{Notification, NotificationSink};
use crate::store::RecordStore;

pub const DEFAULT_PERSIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Orchestrates the lifecycle of one record collection: load a record,
/// apply a validated transition, persist it under a timeout and emit a
/// notification. Read paths (filtering, statistics) operate on a store
/// snapshot and stay pure.
///
/// One transition at a time per caller; the store is assumed single-writer
/// (one admin session driving mutations).
pub struct Lifecycle<S: StatusModel, St: RecordStore<S>> {
    store: St,
    sink: Arc<dyn NotificationSink>,
    persist_timeout: Duration,
    _status: PhantomData<S>,
}

impl<S: StatusModel, St: RecordStore<S>> Lifecycle<S, St> {
    pub fn new(store: St, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            sink,
            persist_timeout: DEFAULT_PERSIST_TIMEOUT,
            _status: PhantomData,
        }
    }

    pub fn with_persist_timeout(mut self, timeout: Duration) -> Self {
        self.persist_timeout = timeout;
        self
    }

    /// Moves a record to `target`, appending one history entry. Targets
    /// that carry mandatory data (order refunds) are rejected here and go
    /// through the dedicated request instead.
    pub async fn transition(
        &self,
        id: &RecordId,
        target: S,
        notes: Option<String>,
    ) -> Result<Record<S>, ServiceError> {
        self.commit(id, |record| record.transition(target, notes, Utc::now()))
            .await
    }

    /// Records matching the filter spec, in store order.
    pub async fn records(&self, spec: &FilterSpec<S>) -> Result<Vec<Record<S>>, ServiceError> {
        let snapshot = self.store.get_all().await.map_err(ServiceError::persistence)?;
        Ok(spec.filter(&snapshot))
    }

    /// Summary statistics over the filtered snapshot.
    pub async fn stats(
        &self,
        spec: &FilterSpec<S>,
        config: &StatsConfig,
    ) -> Result<Stats<S>, ServiceError> {
        let records = self.records(spec).await?;
        Ok(aggregate(&records, config))
    }

    /// Load, apply and persist one mutation. The updated record is only
    /// returned once the store accepted it; on any failure the mutation is
    /// dropped and the caller decides whether to retry.
    async fn commit<F>(&self, id: &RecordId, apply: F) -> Result<Record<S>, ServiceError>
    where
        F: FnOnce(&Record<S>) -> Result<Record<S>, TransitionError> + Send,
    {
        let result = self.try_commit(id, apply).await;
        match &result {
            Ok(record) => {
                self.sink
                    .notify(Notification::applied(record.id.clone(), record.status.as_str()));
            }
            Err(err) => {
                self.sink
                    .notify(Notification::rejected(id.clone(), err.to_string()));
            }
        }
        result
    }

    async fn try_commit<F>(&self, id: &RecordId, apply: F) -> Result<Record<S>, ServiceError>
    where
        F: FnOnce(&Record<S>) -> Result<Record<S>, TransitionError> + Send,
    {
        let record = self
            .store
            .get_by_id(id)
            .await
            .map_err(ServiceError::persistence)?
            .ok_or_else(|| ServiceError::NotFound(id.clone()))?;

        let updated = apply(&record)?;
        debug!(record_id = %updated.id, status = updated.status.as_str(), "persisting transition");

        match tokio::time::timeout(self.persist_timeout, self.store.save(updated)).await {
            Ok(Ok(saved)) => Ok(saved),
            Ok(Err(err)) => Err(ServiceError::persistence(err)),
            Err(_) => Err(ServiceError::PersistenceTimeout(self.persist_timeout)),
        }
    }
}

impl<St: RecordStore<OrderStatus>> Lifecycle<OrderStatus, St> {
    /// Applies an order-specific transition request (ship with tracking,
    /// validated refund, cancellation with optional reason).
    pub async fn apply(
        &self,
        id: &RecordId,
        request: OrderTransition,
    ) -> Result<Record<OrderStatus>, ServiceError> {
        self.commit(id, |record| record.apply(request, Utc::now()))
            .await
    }
}
