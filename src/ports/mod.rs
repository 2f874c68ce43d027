//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `DocumentStore` - the shared remote store holding the proposal
//! - `SnapshotListener` - receiver of push notifications from the store
//! - `SubscriptionHandle` - cancellation handle for a running subscription

mod document_store;

pub use document_store::{DocumentStore, SnapshotListener, StoreError, SubscriptionHandle};
