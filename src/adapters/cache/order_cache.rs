//! In-memory mirror of every known order.
//!
//! The map is guarded by a single reader/writer lock: lookups share it,
//! `set` and `warm_up` take it exclusively. Entries are inserted whole and
//! never mutated, so no finer-grained locking is needed. The cache is
//! unbounded and has no expiry.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Order;
use crate::domain::ports::OrderRepository;

/// Lifecycle phase of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePhase {
    /// Not yet populated; lookups must not be served.
    Cold,
    /// Populated from the store and serving.
    Warm,
}

impl CachePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Warm => "warm",
        }
    }
}

struct CacheState {
    orders: HashMap<String, Arc<Order>>,
    phase: CachePhase,
}

/// Lock-guarded order cache, shared between the ingestor and the query
/// endpoint through an `Arc`.
pub struct OrderCache {
    state: RwLock<CacheState>,
}

impl Default for OrderCache {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderCache {
    /// Create an empty, cold cache.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState {
                orders: HashMap::new(),
                phase: CachePhase::Cold,
            }),
        }
    }

    /// Populate the cache from the store of record and mark it warm.
    ///
    /// Runs exactly once per cache. If the store cannot be enumerated the
    /// cache stays cold and the error is a [`DomainError::WarmUpFailure`],
    /// which callers treat as fatal for start-up.
    pub async fn warm_up(&self, repository: &dyn OrderRepository) -> DomainResult<usize> {
        if self.is_warm().await {
            return Err(already_warm());
        }

        tracing::info!("warming up order cache");
        let orders = repository
            .load_all()
            .await
            .map_err(|e| DomainError::WarmUpFailure(e.to_string()))?;

        let mut state = self.state.write().await;
        // Another warm-up may have finished while the store was being read.
        if state.phase == CachePhase::Warm {
            return Err(already_warm());
        }
        for order in orders {
            state.orders.insert(order.order_uid.clone(), Arc::new(order));
        }
        state.phase = CachePhase::Warm;

        let loaded = state.orders.len();
        tracing::info!(orders = loaded, "order cache warm");
        Ok(loaded)
    }

    /// Look up an order by identity. `None` for unknown keys.
    pub async fn get(&self, order_uid: &str) -> Option<Arc<Order>> {
        self.state.read().await.orders.get(order_uid).cloned()
    }

    /// Insert or replace the entry for the order's identity.
    pub async fn set(&self, order: Order) {
        let mut state = self.state.write().await;
        state.orders.insert(order.order_uid.clone(), Arc::new(order));
    }

    pub async fn phase(&self) -> CachePhase {
        self.state.read().await.phase
    }

    pub async fn is_warm(&self) -> bool {
        self.phase().await == CachePhase::Warm
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.orders.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// The rejected `cold -> warm` transition, attempted on a warm cache.
fn already_warm() -> DomainError {
    DomainError::InvalidStateTransition {
        from: CachePhase::Cold.as_str().to_string(),
        to: CachePhase::Warm.as_str().to_string(),
        reason: "cache is already warm".to_string(),
    }
}
