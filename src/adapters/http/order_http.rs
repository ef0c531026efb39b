//! Order lookup HTTP server.
//!
//! A thin read-only adapter over the order cache: `GET /order/{uid}`
//! answers from memory and never touches the store.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::adapters::cache::OrderCache;
use crate::domain::models::{HttpConfig, Order};

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub cache: String,
    pub orders: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("Invalid bind address {0:?}: {1}")]
    InvalidBind(String, std::net::AddrParseError),
    #[error("HTTP server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

type ApiError = (StatusCode, Json<ErrorResponse>);

struct AppState {
    cache: Arc<OrderCache>,
}

pub struct OrderHttpServer {
    config: HttpConfig,
    cache: Arc<OrderCache>,
}

impl OrderHttpServer {
    pub fn new(cache: Arc<OrderCache>, config: HttpConfig) -> Self {
        Self { config, cache }
    }

    /// Build the router.
    pub fn router(&self) -> Router {
        let state = Arc::new(AppState {
            cache: self.cache.clone(),
        });

        let mut app = Router::new()
            .route("/order/{uid}", get(get_order))
            .route("/order", get(missing_uid))
            .route("/order/", get(missing_uid))
            .route("/health", get(health_check))
            .with_state(state);

        if let Some(dir) = self.config.static_dir.as_ref().filter(|dir| dir.is_dir()) {
            tracing::debug!(dir = %dir.display(), "serving static assets");
            app = app.fallback_service(ServeDir::new(dir));
        }

        let app = app.layer(TraceLayer::new_for_http());
        if self.config.enable_cors {
            app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        } else {
            app
        }
    }

    /// Resolve the configured bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, HttpServerError> {
        self.config
            .socket_addr()
            .map_err(|e| HttpServerError::InvalidBind(self.config.bind.clone(), e))
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<(), HttpServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_listener<F>(self, listener: TcpListener, shutdown: F) -> Result<(), HttpServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        tracing::info!(addr = %listener.local_addr()?, "order query server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("order query server stopped");
        Ok(())
    }
}

// Handler functions

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<Order>, ApiError> {
    if uid.trim().is_empty() {
        return Err(bad_request());
    }

    if !state.cache.is_warm().await {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("order cache is not ready", "CACHE_COLD")),
        ));
    }

    match state.cache.get(&uid).await {
        Some(order) => Ok(Json(order.as_ref().clone())),
        None => {
            tracing::debug!(order_uid = %uid, "order not found");
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!("Order {uid} not found"), "NOT_FOUND")),
            ))
        }
    }
}

async fn missing_uid() -> ApiError {
    bad_request()
}

fn bad_request() -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("order_uid is required", "BAD_REQUEST")),
    )
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        cache: state.cache.phase().await.as_str().to_string(),
        orders: state.cache.len().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::adapters::memory::InMemoryOrderRepository;

    fn config() -> HttpConfig {
        HttpConfig {
            static_dir: None,
            ..HttpConfig::default()
        }
    }

    async fn warm_cache(orders: impl IntoIterator<Item = Order>) -> Arc<OrderCache> {
        let repo = InMemoryOrderRepository::with_orders(orders);
        let cache = Arc::new(OrderCache::new());
        cache.warm_up(&repo).await.unwrap();
        cache
    }

    async fn send(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_known_order_returns_full_document() {
        let order = Order::new("abc123").with_track_number("WBILMTESTTRACK");
        let cache = warm_cache([order.clone()]).await;
        let router = OrderHttpServer::new(cache, config()).router();

        let (status, body) = send(router, "/order/abc123").await;

        assert_eq!(status, StatusCode::OK);
        let returned: Order = serde_json::from_value(body).unwrap();
        assert_eq!(returned, order);
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let cache = warm_cache([Order::new("abc123")]).await;
        let router = OrderHttpServer::new(cache, config()).router();

        let (status, body) = send(router, "/order/nonexistent").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_empty_uid_is_bad_request() {
        let cache = warm_cache(Vec::new()).await;
        for uri in ["/order/", "/order", "/order/%20"] {
            let router = OrderHttpServer::new(cache.clone(), config()).router();
            let (status, body) = send(router, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "uri {uri}");
            assert_eq!(body["code"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn test_uid_is_looked_up_verbatim() {
        let order = Order::decode(br#"{"order_uid": " abc"}"#).unwrap();
        let cache = warm_cache([order.clone()]).await;

        let router = OrderHttpServer::new(cache.clone(), config()).router();
        let (status, body) = send(router, "/order/%20abc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order_uid"], " abc");

        let router = OrderHttpServer::new(cache, config()).router();
        let (status, _) = send(router, "/order/abc").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cold_cache_is_unavailable() {
        let cache = Arc::new(OrderCache::new());
        let router = OrderHttpServer::new(cache, config()).router();

        let (status, body) = send(router, "/order/abc123").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "CACHE_COLD");
    }

    #[tokio::test]
    async fn test_health_reports_cache_state() {
        let cache = warm_cache([Order::new("a"), Order::new("b")]).await;
        let router = OrderHttpServer::new(cache, config()).router();

        let (status, body) = send(router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cache"], "warm");
        assert_eq!(body["orders"], 2);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let cache = warm_cache([Order::new("abc123")]).await;
        let router = OrderHttpServer::new(cache, config()).router();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/order/abc123")
                    .header(header::ORIGIN, "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_disabled_omits_header() {
        let cache = warm_cache([Order::new("abc123")]).await;
        let config = HttpConfig {
            enable_cors: false,
            ..config()
        };
        let router = OrderHttpServer::new(cache, config).router();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/order/abc123")
                    .header(header::ORIGIN, "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_static_assets_served_as_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>orders</h1>").unwrap();
        let config = HttpConfig {
            static_dir: Some(dir.path().to_path_buf()),
            ..config()
        };
        let router = OrderHttpServer::new(warm_cache(Vec::new()).await, config).router();

        let response = router
            .oneshot(Request::builder().uri("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"<h1>orders</h1>");
    }

    #[tokio::test]
    async fn test_serve_listener_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = OrderHttpServer::new(warm_cache(Vec::new()).await, config());

        let result = server.serve_listener(listener, async {}).await;

        assert!(result.is_ok());
    }
}
