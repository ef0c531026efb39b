//! SQLite implementation of the OrderRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Delivery, Item, Order, Payment};
use crate::domain::ports::{OrderRepository, SaveOutcome};

#[derive(Clone)]
pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

const SELECT_ORDERS: &str = "SELECT order_uid, track_number, entry, delivery, payment, items, \
     locale, customer_id, date_created FROM orders";

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn save(&self, order: &Order) -> DomainResult<SaveOutcome> {
        order
            .validate()
            .map_err(|e| DomainError::PersistenceFailure(e.to_string()))?;

        let delivery_json = to_blob(&order.delivery)?;
        let payment_json = to_blob(&order.payment)?;
        let items_json = to_blob(&order.items)?;

        let result = sqlx::query(
            r#"INSERT INTO orders (order_uid, track_number, entry, delivery, payment, items,
               locale, customer_id, date_created)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(order_uid) DO NOTHING"#
        )
        .bind(&order.order_uid)
        .bind(&order.track_number)
        .bind(&order.entry)
        .bind(&delivery_json)
        .bind(&payment_json)
        .bind(&items_json)
        .bind(&order.locale)
        .bind(&order.customer_id)
        .bind(order.date_created.to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(SaveOutcome::AlreadyExists)
        } else {
            Ok(SaveOutcome::Inserted)
        }
    }

    async fn load_all(&self) -> DomainResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(SELECT_ORDERS)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn get(&self, order_uid: &str) -> DomainResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!("{SELECT_ORDERS} WHERE order_uid = ?"))
            .bind(order_uid)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    async fn count(&self) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

fn to_blob<T: serde::Serialize>(value: &T) -> DomainResult<String> {
    serde_json::to_string(value).map_err(|e| DomainError::PersistenceFailure(e.to_string()))
}

fn from_blob<T: serde::de::DeserializeOwned>(order_uid: &str, column: &str, raw: &str) -> DomainResult<T> {
    serde_json::from_str(raw).map_err(|e| {
        DomainError::PersistenceFailure(format!("order {order_uid}: malformed {column}: {e}"))
    })
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    order_uid: String,
    track_number: String,
    entry: String,
    delivery: String,
    payment: String,
    items: String,
    locale: String,
    customer_id: String,
    date_created: String,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let delivery: Delivery = from_blob(&row.order_uid, "delivery", &row.delivery)?;
        let payment: Payment = from_blob(&row.order_uid, "payment", &row.payment)?;
        let items: Vec<Item> = from_blob(&row.order_uid, "items", &row.items)?;
        let date_created = super::parse_datetime(&row.date_created)?;

        Ok(Order {
            order_uid: row.order_uid,
            track_number: row.track_number,
            entry: row.entry,
            delivery,
            payment,
            items,
            locale: row.locale,
            customer_id: row.customer_id,
            date_created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup_test_repo() -> SqliteOrderRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteOrderRepository::new(pool)
    }

    fn sample_order(uid: &str) -> Order {
        let mut order = Order::new(uid).with_track_number("WBILMTESTTRACK").with_item(Item {
            chrt_id: 9_934_930,
            name: "Mascaras".to_string(),
            total_price: 317,
            ..Default::default()
        });
        order.entry = "WBIL".to_string();
        order.locale = "en".to_string();
        order.customer_id = "test".to_string();
        order.delivery.city = "Kiryat Mozkin".to_string();
        order.payment.amount = 1817;
        order
    }

    #[tokio::test]
    async fn test_save_and_get_order() {
        let repo = setup_test_repo().await;
        let order = sample_order("abc123");

        let outcome = repo.save(&order).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Inserted);

        let stored = repo.get("abc123").await.unwrap().unwrap();
        assert_eq!(stored, order);
    }

    #[tokio::test]
    async fn test_save_twice_keeps_single_row() {
        let repo = setup_test_repo().await;
        let order = sample_order("dup-1");

        assert_eq!(repo.save(&order).await.unwrap(), SaveOutcome::Inserted);
        assert_eq!(repo.save(&order).await.unwrap(), SaveOutcome::AlreadyExists);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_never_overwrites() {
        let repo = setup_test_repo().await;
        let original = sample_order("keep-me");
        repo.save(&original).await.unwrap();

        let altered = original.clone().with_track_number("CHANGED");
        assert_eq!(repo.save(&altered).await.unwrap(), SaveOutcome::AlreadyExists);

        let stored = repo.get("keep-me").await.unwrap().unwrap();
        assert_eq!(stored.track_number, "WBILMTESTTRACK");
    }

    #[tokio::test]
    async fn test_save_rejects_empty_uid() {
        let repo = setup_test_repo().await;
        let err = repo.save(&Order::new("")).await.unwrap_err();
        assert!(matches!(err, DomainError::PersistenceFailure(_)));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_load_all_returns_every_order() {
        let repo = setup_test_repo().await;
        for uid in ["a", "b", "c"] {
            repo.save(&sample_order(uid)).await.unwrap();
        }

        let mut uids: Vec<String> = repo
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.order_uid)
            .collect();
        uids.sort();
        assert_eq!(uids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_load_all_aborts_on_malformed_row() {
        let repo = setup_test_repo().await;
        repo.save(&sample_order("good")).await.unwrap();

        sqlx::query(
            r#"INSERT INTO orders (order_uid, track_number, entry, delivery, payment, items,
               locale, customer_id, date_created)
               VALUES ('bad', 'T', 'E', '{not json', '{}', '[]', 'en', 'c', '2021-11-26T06:22:19Z')"#
        )
        .execute(repo.pool())
        .await
        .unwrap();

        let err = repo.load_all().await.unwrap_err();
        assert!(err.is_persistence());
        assert!(err.to_string().contains("bad"));
    }

    #[tokio::test]
    async fn test_get_unknown_returns_none() {
        let repo = setup_test_repo().await;
        assert!(repo.get("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_closed_pool_is_persistence_failure() {
        let repo = setup_test_repo().await;
        repo.pool().close().await;

        let err = repo.save(&sample_order("late")).await.unwrap_err();
        assert!(err.is_persistence());
        assert!(repo.load_all().await.unwrap_err().is_persistence());
    }
}
