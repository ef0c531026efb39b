//! Write-through persistence: store first, cache second.
//!
//! An order becomes visible in the cache only after the store has confirmed
//! it. A failed save leaves the cache untouched and is reported to the
//! caller. A crash between the two steps leaves the order durable but absent
//! from the cache until the next warm-up or redelivery.

use std::sync::Arc;

use crate::adapters::cache::OrderCache;
use crate::domain::errors::DomainResult;
use crate::domain::models::Order;
use crate::domain::ports::{OrderRepository, SaveOutcome};

/// Composes the store of record with the cache.
pub struct WriteThroughWriter<R: OrderRepository> {
    repository: Arc<R>,
    cache: Arc<OrderCache>,
}

impl<R: OrderRepository> Clone for WriteThroughWriter<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<R: OrderRepository> WriteThroughWriter<R> {
    pub fn new(repository: Arc<R>, cache: Arc<OrderCache>) -> Self {
        Self { repository, cache }
    }

    /// Persist the order, then mirror it into the cache.
    ///
    /// When the store already held the identity, the cache is filled from
    /// the stored record rather than the incoming payload, so a redelivery
    /// repairs an entry lost to a crash between the two steps without ever
    /// diverging from the store.
    pub async fn persist_and_cache(&self, order: Order) -> DomainResult<SaveOutcome> {
        let outcome = match self.repository.save(&order).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(order_uid = %order.order_uid, error = %e, "persist failed, cache not updated");
                return Err(e);
            }
        };

        tracing::debug!(order_uid = %order.order_uid, outcome = outcome.as_str(), "order persisted");
        match outcome {
            SaveOutcome::Inserted => self.cache.set(order).await,
            SaveOutcome::AlreadyExists => self.refresh_from_store(&order.order_uid).await,
        }
        Ok(outcome)
    }

    async fn refresh_from_store(&self, order_uid: &str) {
        if self.cache.get(order_uid).await.is_some() {
            return;
        }
        match self.repository.get(order_uid).await {
            Ok(Some(stored)) => self.cache.set(stored).await,
            Ok(None) => {
                tracing::warn!(order_uid, "store reported duplicate but returned no record");
            }
            Err(e) => {
                // Durable but not cached; the next warm-up picks it up.
                tracing::warn!(order_uid, error = %e, "failed to read back duplicate order");
            }
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn cache(&self) -> &Arc<OrderCache> {
        &self.cache
    }
}
