//! In-memory implementation of the OrderRepository.
//!
//! Honours the same insert-if-absent contract as the SQLite store and can be
//! switched into an unavailable state to simulate a store outage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Order;
use crate::domain::ports::{OrderRepository, SaveOutcome};

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, Order>>,
    unavailable: AtomicBool,
    save_calls: AtomicU64,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store that already holds the given orders.
    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let map = orders
            .into_iter()
            .map(|order| (order.order_uid.clone(), order))
            .collect();
        Self {
            orders: RwLock::new(map),
            ..Default::default()
        }
    }

    /// Make every subsequent call fail (or succeed again) as if the store
    /// were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    /// Number of `save` calls attempted, including failed ones.
    pub fn save_calls(&self) -> u64 {
        self.save_calls.load(Ordering::Acquire)
    }

    fn check_available(&self) -> DomainResult<()> {
        if self.unavailable.load(Ordering::Acquire) {
            return Err(DomainError::PersistenceFailure(
                "store unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: &Order) -> DomainResult<SaveOutcome> {
        self.save_calls.fetch_add(1, Ordering::AcqRel);
        self.check_available()?;
        order
            .validate()
            .map_err(|e| DomainError::PersistenceFailure(e.to_string()))?;

        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.order_uid) {
            return Ok(SaveOutcome::AlreadyExists);
        }
        orders.insert(order.order_uid.clone(), order.clone());
        Ok(SaveOutcome::Inserted)
    }

    async fn load_all(&self) -> DomainResult<Vec<Order>> {
        self.check_available()?;
        Ok(self.orders.read().await.values().cloned().collect())
    }

    async fn get(&self, order_uid: &str) -> DomainResult<Option<Order>> {
        self.check_available()?;
        Ok(self.orders.read().await.get(order_uid).cloned())
    }

    async fn count(&self) -> DomainResult<u64> {
        self.check_available()?;
        Ok(self.orders.read().await.len() as u64)
    }
}
