//! Application layer: process composition and lifecycle.

pub mod order_service;

pub use order_service::{build_stream, run, OrderPipeline};
