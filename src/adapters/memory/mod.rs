//! In-process adapters for tests and embedding.

pub mod order_repository;

pub use order_repository::InMemoryOrderRepository;
