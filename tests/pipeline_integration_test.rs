//! End-to-end tests for the ingestion pipeline
//!
//! Stream → SQLite store → cache → HTTP lookup, on a file-backed database.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use common::{sample_order, sample_payload, setup_test_logging, temp_database_url, wait_until};
use order_service::adapters::sqlite::{initialize_database, SqliteOrderRepository};
use order_service::adapters::stream::channel;
use order_service::domain::models::{HttpConfig, IngestorConfig};
use order_service::{Order, OrderPipeline, OrderRepository, StopReason};

fn http_config() -> HttpConfig {
    HttpConfig {
        static_dir: None,
        ..HttpConfig::default()
    }
}

async fn get(pipeline: &OrderPipeline<SqliteOrderRepository>, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = pipeline
        .http_server(http_config())
        .router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, body)
}

#[tokio::test]
async fn test_warm_up_then_ingest_then_query() {
    setup_test_logging();
    let (_dir, url) = temp_database_url();

    // Store holds one order before start-up.
    let pool = initialize_database(&url, None).await.unwrap();
    let repo = Arc::new(SqliteOrderRepository::new(pool.clone()));
    let existing = sample_order("abc123");
    repo.save(&existing).await.unwrap();

    let pipeline = OrderPipeline::start(repo.clone()).await.unwrap();

    let (status, body) = get(&pipeline, "/order/abc123").await;
    assert_eq!(status, StatusCode::OK);
    let served: Order = serde_json::from_slice(&body).unwrap();
    assert_eq!(served, existing);

    // A new order arrives on the stream.
    let cancel = CancellationToken::new();
    let (publisher, stream) = channel(8);
    let ingestor = pipeline.spawn_ingestor(Box::new(stream), cancel.clone(), &IngestorConfig::default());

    publisher.publish_payload("{\"order_uid\": ").await.unwrap();
    publisher.publish_payload(sample_payload("xyz")).await.unwrap();
    publisher.publish_payload(sample_payload("xyz")).await.unwrap();

    let cache = pipeline.cache().clone();
    assert!(wait_until(Duration::from_secs(5), || {
        let cache = cache.clone();
        async move { cache.get("xyz").await.is_some() }
    })
    .await);

    let (status, body) = get(&pipeline, "/order/xyz").await;
    assert_eq!(status, StatusCode::OK);
    let served: Order = serde_json::from_slice(&body).unwrap();
    assert_eq!(served, sample_order("xyz"));

    let (status, _) = get(&pipeline, "/order/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&pipeline, "/order/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    drop(publisher);
    let report = tokio::time::timeout(Duration::from_secs(5), ingestor)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.stop_reason, StopReason::StreamClosed);
    assert_eq!(report.decode_failures, 1);
    assert_eq!(report.persisted, 1);
    assert_eq!(report.duplicates, 1);

    assert_eq!(repo.count().await.unwrap(), 2);
    pool.close().await;
}

#[tokio::test]
async fn test_ingested_orders_survive_restart() {
    let (_dir, url) = temp_database_url();

    {
        let pool = initialize_database(&url, None).await.unwrap();
        let repo = Arc::new(SqliteOrderRepository::new(pool.clone()));
        let pipeline = OrderPipeline::start(repo).await.unwrap();

        let (publisher, stream) = channel(8);
        let ingestor = pipeline.spawn_ingestor(
            Box::new(stream),
            CancellationToken::new(),
            &IngestorConfig::default(),
        );
        for uid in ["o1", "o2", "o3"] {
            publisher.publish_payload(sample_payload(uid)).await.unwrap();
        }
        drop(publisher);
        let report = ingestor.await.unwrap();
        assert_eq!(report.persisted, 3);
        pool.close().await;
    }

    let pool = initialize_database(&url, None).await.unwrap();
    let repo = Arc::new(SqliteOrderRepository::new(pool.clone()));
    let pipeline = OrderPipeline::start(repo).await.unwrap();

    assert_eq!(pipeline.cache().len().await, 3);
    for uid in ["o1", "o2", "o3"] {
        let (status, _) = get(&pipeline, &format!("/order/{uid}")).await;
        assert_eq!(status, StatusCode::OK, "order {uid} after restart");
    }
    pool.close().await;
}

#[tokio::test]
async fn test_cancellation_stops_ingestor_without_losing_orders() {
    let (_dir, url) = temp_database_url();
    let pool = initialize_database(&url, None).await.unwrap();
    let repo = Arc::new(SqliteOrderRepository::new(pool.clone()));
    let pipeline = OrderPipeline::start(repo.clone()).await.unwrap();

    let cancel = CancellationToken::new();
    let (publisher, stream) = channel(8);
    let ingestor = pipeline.spawn_ingestor(Box::new(stream), cancel.clone(), &IngestorConfig::default());

    publisher.publish_payload(sample_payload("before-cancel")).await.unwrap();
    let cache = pipeline.cache().clone();
    assert!(wait_until(Duration::from_secs(5), || {
        let cache = cache.clone();
        async move { cache.get("before-cancel").await.is_some() }
    })
    .await);

    cancel.cancel();
    let report = tokio::time::timeout(Duration::from_secs(5), ingestor)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::Cancelled);
    assert!(repo.get("before-cancel").await.unwrap().is_some());
    pool.close().await;
}
