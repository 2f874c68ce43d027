//! Document Store Port - Interface for the shared remote store.
//!
//! The store owns every document. Clients write whole documents or single
//! fields and learn about changes only through subscriptions.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::foundation::StorePath;

/// Errors that can occur during document store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize document: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize document: {0}")]
    DeserializationFailed(String),

    #[error("Subscription closed: {0}")]
    SubscriptionClosed(String),
}

/// Receives snapshots for one subscribed path.
///
/// Calls for a single subscription are sequential: the next snapshot is not
/// delivered until the previous call has returned.
#[async_trait]
pub trait SnapshotListener: Send + Sync {
    /// Latest value at the subscribed path; `None` when nothing is stored.
    async fn on_snapshot(&self, snapshot: Option<Value>);

    /// The notification stream failed or ended.
    async fn on_error(&self, error: StoreError);

    /// Listener name for logging.
    fn name(&self) -> &'static str;
}

/// Port for the shared document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Atomically replace everything at `path` with `document`.
    ///
    /// Writing `Value::Null` removes the document.
    ///
    /// # Errors
    /// Returns `StoreError` if the store does not acknowledge the write
    async fn write(&self, path: &StorePath, document: Value) -> Result<(), StoreError>;

    /// One-shot read of the value currently stored at `path`.
    ///
    /// Returns `None` when nothing is stored there.
    ///
    /// # Errors
    /// Returns `StoreError` if the store cannot be reached
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError>;

    /// Atomically set the single field `path/field`, leaving siblings untouched.
    ///
    /// Missing intermediate objects are created.
    ///
    /// # Errors
    /// Returns `StoreError` if the store does not acknowledge the update
    async fn update_field(
        &self,
        path: &StorePath,
        field: &StorePath,
        value: Value,
    ) -> Result<(), StoreError>;

    /// Register `listener` for changes at or below `path`.
    ///
    /// The listener first receives the current value, then a new snapshot
    /// after every change. Rapid changes may be coalesced into the latest one.
    ///
    /// # Errors
    /// Returns `StoreError` if the subscription cannot be established
    async fn subscribe(
        &self,
        path: &StorePath,
        listener: Arc<dyn SnapshotListener>,
    ) -> Result<SubscriptionHandle, StoreError>;
}

/// Owner of a running subscription.
///
/// Dropping the handle cancels the subscription. Use
/// [`unsubscribe`](Self::unsubscribe) to also wait until no callback can run.
#[must_use = "dropping a SubscriptionHandle cancels the subscription"]
#[derive(Debug)]
pub struct SubscriptionHandle {
    id: Uuid,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    /// Wrap the task that delivers snapshots to a listener.
    pub fn new(task: JoinHandle<()>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task: Some(task),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Cancel the subscription and wait for the delivery task to stop.
    ///
    /// Once this returns, the listener receives no further calls.
    pub async fn unsubscribe(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            tracing::debug!(subscription_id = %self.id, "Subscription cancelled");
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
