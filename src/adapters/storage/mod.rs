//! Storage Adapters
//!
//! Implementations of the DocumentStore port.
//!
//! ## Available Adapters
//!
//! - **InMemoryDocumentStore** - Process-local JSON tree (testing/development)
//! - **RedisDocumentStore** - JSON documents in Redis with pub/sub change feeds
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemoryDocumentStore, RedisDocumentStore};
//!
//! // Production: shared across processes
//! let store = RedisDocumentStore::connect("redis://localhost:6379", "trade-approvals").await?;
//!
//! // Testing: in-memory storage
//! let store = InMemoryDocumentStore::new();
//! ```

mod in_memory_document_store;
mod redis_document_store;

pub use in_memory_document_store::InMemoryDocumentStore;
pub use redis_document_store::RedisDocumentStore;
