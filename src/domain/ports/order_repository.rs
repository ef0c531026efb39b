use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Order;

/// Result of a successful [`OrderRepository::save`].
///
/// Both variants are success: a duplicate identity is absorbed, never
/// overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new row was written.
    Inserted,
    /// A row with the same `order_uid` already existed and was left untouched.
    AlreadyExists,
}

impl SaveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::AlreadyExists => "already_exists",
        }
    }
}

/// Repository port for the store of record.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the order if its identity is not yet stored.
    ///
    /// Must be safe under concurrent calls for the same key: exactly one row
    /// survives and every caller is told success.
    ///
    /// # Errors
    /// Returns `PersistenceFailure` if the store is unreachable or rejects
    /// the write for any reason other than a duplicate key.
    async fn save(&self, order: &Order) -> DomainResult<SaveOutcome>;

    /// Return every stored order, in unspecified order.
    ///
    /// A single undecodable stored record aborts the whole enumeration.
    async fn load_all(&self) -> DomainResult<Vec<Order>>;

    /// Point read of a stored order.
    async fn get(&self, order_uid: &str) -> DomainResult<Option<Order>>;

    /// Number of stored orders.
    async fn count(&self) -> DomainResult<u64>;
}
