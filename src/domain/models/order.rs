//! Order domain model.
//!
//! An order is identified by `order_uid` and never changes once created.
//! The delivery, payment and item sub-documents are persisted as opaque JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Delivery recipient and address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delivery {
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}

/// Payment details for an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payment {
    pub transaction: String,
    pub request_id: String,
    pub currency: String,
    pub provider: String,
    pub amount: i64,
    /// Unix timestamp of the payment.
    pub payment_dt: i64,
    pub bank: String,
    pub delivery_cost: i64,
    pub goods_total: i64,
    pub custom_fee: i64,
}

/// A single line item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub chrt_id: i64,
    pub track_number: String,
    pub price: i64,
    pub rid: String,
    pub name: String,
    pub sale: i64,
    pub size: String,
    pub total_price: i64,
    pub nm_id: i64,
    pub brand: String,
    pub status: i64,
}

/// The order record flowing through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub order_uid: String,
    pub track_number: String,
    pub entry: String,
    pub delivery: Delivery,
    pub payment: Payment,
    pub items: Vec<Item>,
    pub locale: String,
    pub customer_id: String,
    pub date_created: DateTime<Utc>,
}

impl Order {
    /// Create an order with the given identity and empty attributes.
    pub fn new(order_uid: impl Into<String>) -> Self {
        Self {
            order_uid: order_uid.into(),
            date_created: Utc::now(),
            ..Default::default()
        }
    }

    pub fn with_track_number(mut self, track_number: impl Into<String>) -> Self {
        self.track_number = track_number.into();
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Decode a stream payload into a validated order.
    ///
    /// Any failure, including a missing or blank `order_uid`, is a
    /// [`DomainError::DecodeFailure`].
    pub fn decode(payload: &[u8]) -> DomainResult<Self> {
        let order: Self = serde_json::from_slice(payload)
            .map_err(|e| DomainError::DecodeFailure(e.to_string()))?;
        order
            .validate()
            .map_err(|e| DomainError::DecodeFailure(e.to_string()))?;
        Ok(order)
    }

    /// Check the identity invariant.
    pub fn validate(&self) -> DomainResult<()> {
        if self.order_uid.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "order_uid cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
