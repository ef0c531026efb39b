//! HTTP query endpoint.

pub mod order_http;

pub use order_http::{ErrorResponse, HealthResponse, HttpServerError, OrderHttpServer};
