//! In-Memory Document Store Adapter
//!
//! Keeps the whole document tree in a `tokio::sync::watch` channel. Every
//! write replaces the tree atomically and wakes all subscribers, which then
//! compare the value at their own path with what they last delivered.
//! Useful for testing, development and single-process deployments.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::domain::foundation::StorePath;
use crate::ports::{DocumentStore, SnapshotListener, StoreError, SubscriptionHandle};

/// In-memory JSON document tree with push notifications
#[derive(Debug, Clone)]
pub struct InMemoryDocumentStore {
    tree: Arc<watch::Sender<Value>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (tree, _) = watch::channel(Value::Object(Map::new()));
        Self {
            tree: Arc::new(tree),
        }
    }

    /// Read the value at `path` (useful for tests)
    pub fn snapshot(&self, path: &StorePath) -> Option<Value> {
        value_at(&self.tree.borrow(), path)
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.tree.receiver_count()
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn write(&self, path: &StorePath, document: Value) -> Result<(), StoreError> {
        self.tree
            .send_modify(|root| set_at(root, path.segments(), document));
        tracing::trace!(path = %path, "Document written");
        Ok(())
    }

    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        Ok(self.snapshot(path))
    }

    async fn update_field(
        &self,
        path: &StorePath,
        field: &StorePath,
        value: Value,
    ) -> Result<(), StoreError> {
        let target = path.join(field);
        self.tree
            .send_modify(|root| set_at(root, target.segments(), value));
        tracing::trace!(path = %target, "Field updated");
        Ok(())
    }

    async fn subscribe(
        &self,
        path: &StorePath,
        listener: Arc<dyn SnapshotListener>,
    ) -> Result<SubscriptionHandle, StoreError> {
        let mut rx = self.tree.subscribe();
        let path = path.clone();

        let task = tokio::spawn(async move {
            let mut last = value_at(&rx.borrow_and_update(), &path);
            listener.on_snapshot(last.clone()).await;

            while rx.changed().await.is_ok() {
                let current = value_at(&rx.borrow_and_update(), &path);
                if current != last {
                    listener.on_snapshot(current.clone()).await;
                    last = current;
                }
            }

            listener
                .on_error(StoreError::SubscriptionClosed(format!(
                    "store for '{}' was dropped",
                    path
                )))
                .await;
        });

        Ok(SubscriptionHandle::new(task))
    }
}

/// Value stored at `path`, or `None` if nothing is there.
fn value_at(root: &Value, path: &StorePath) -> Option<Value> {
    path.segments()
        .iter()
        .try_fold(root, |node, segment| node.get(segment))
        .filter(|value| !value.is_null())
        .cloned()
}

/// Replace the node under `segments` with `value`.
///
/// Non-object intermediates are replaced by objects. `null` and empty objects
/// are removed, and so are parents left empty by the removal.
fn set_at(node: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(children) = node {
        let child = children.entry(head.clone()).or_insert(Value::Null);
        set_at(child, rest, value);
        if is_vacant(child) {
            children.remove(head);
        }
    }
}

fn is_vacant(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(children) => children.is_empty(),
        _ => false,
    }
}
