//! In-memory caching layer for order reads.
//!
//! A lock-guarded map populated once from the store at start-up and kept
//! current by the write-through writer afterwards.

pub mod order_cache;

pub use order_cache::{CachePhase, OrderCache};
