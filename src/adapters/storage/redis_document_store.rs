//! Redis-backed document store for multi-process deployments.
//!
//! Each subscribed path maps to one Redis key holding the JSON document and
//! one counter key holding its version. Writes and field updates run as Lua
//! scripts so that the new document is stored, its version bumped and the
//! change published on the path's pub/sub channel in one atomic step.
//! Subscribers receive the full document on every change and drop any message
//! whose version they have already seen.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::foundation::StorePath;
use crate::ports::{DocumentStore, SnapshotListener, StoreError, SubscriptionHandle};

/// KEYS[1] = document key, KEYS[2] = version key, ARGV[1] = channel,
/// ARGV[2] = document JSON.
const WRITE_SCRIPT: &str = r#"
if ARGV[2] == 'null' then
  redis.call('DEL', KEYS[1])
else
  redis.call('SET', KEYS[1], ARGV[2])
end
local version = redis.call('INCR', KEYS[2])
redis.call('PUBLISH', ARGV[1], '{"version":' .. version .. ',"document":' .. ARGV[2] .. '}')
return version
"#;

/// KEYS[1] = document key, KEYS[2] = version key, ARGV[1] = channel,
/// ARGV[2] = JSON array of field segments, ARGV[3] = value JSON.
const UPDATE_FIELD_SCRIPT: &str = r#"
local doc = {}
local raw = redis.call('GET', KEYS[1])
if raw then
  local ok, decoded = pcall(cjson.decode, raw)
  if ok and type(decoded) == 'table' then
    doc = decoded
  end
end
local fields = cjson.decode(ARGV[2])
local node = doc
for i = 1, #fields - 1 do
  local child = node[fields[i]]
  if type(child) ~= 'table' then
    child = {}
    node[fields[i]] = child
  end
  node = child
end
local value = cjson.decode(ARGV[3])
if value == cjson.null then
  node[fields[#fields]] = nil
else
  node[fields[#fields]] = value
end
local encoded = cjson.encode(doc)
redis.call('SET', KEYS[1], encoded)
local version = redis.call('INCR', KEYS[2])
redis.call('PUBLISH', ARGV[1], '{"version":' .. version .. ',"document":' .. encoded .. '}')
return version
"#;

/// Payload published by both scripts.
#[derive(Debug, Deserialize)]
struct ChangeMessage {
    version: u64,
    document: Value,
}

/// Redis document store.
///
/// Documents are stored under `{prefix}:doc:{path}`, their versions under
/// `{prefix}:version:{path}`, and changes are announced on
/// `{prefix}:changes:{path}`.
#[derive(Clone)]
pub struct RedisDocumentStore {
    client: redis::Client,
    conn: MultiplexedConnection,
    key_prefix: String,
    write_script: Arc<Script>,
    update_field_script: Arc<Script>,
}

impl RedisDocumentStore {
    /// Connect to Redis at `url`.
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if the URL is invalid or the server
    /// cannot be reached
    pub async fn connect(url: &str, key_prefix: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(unavailable)?;

        Ok(Self {
            client,
            conn,
            key_prefix: key_prefix.into(),
            write_script: Arc::new(Script::new(WRITE_SCRIPT)),
            update_field_script: Arc::new(Script::new(UPDATE_FIELD_SCRIPT)),
        })
    }

    fn document_key(&self, path: &StorePath) -> String {
        format!("{}:doc:{}", self.key_prefix, path)
    }

    fn version_key(&self, path: &StorePath) -> String {
        format!("{}:version:{}", self.key_prefix, path)
    }

    fn channel(&self, path: &StorePath) -> String {
        format!("{}:changes:{}", self.key_prefix, path)
    }
}

#[async_trait]
impl DocumentStore for RedisDocumentStore {
    async fn write(&self, path: &StorePath, document: Value) -> Result<(), StoreError> {
        let json = serde_json::to_string(&document)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        let mut conn = self.conn.clone();

        let version: u64 = self
            .write_script
            .key(self.document_key(path))
            .key(self.version_key(path))
            .arg(self.channel(path))
            .arg(json)
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;

        tracing::debug!(path = %path, version, "Document written to Redis");
        Ok(())
    }

    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(self.document_key(path))
            .await
            .map_err(unavailable)?;
        decode_snapshot(raw.as_deref())
    }

    async fn update_field(
        &self,
        path: &StorePath,
        field: &StorePath,
        value: Value,
    ) -> Result<(), StoreError> {
        let fields = serde_json::to_string(field.segments())
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        let value = serde_json::to_string(&value)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        let mut conn = self.conn.clone();

        let version: u64 = self
            .update_field_script
            .key(self.document_key(path))
            .key(self.version_key(path))
            .arg(self.channel(path))
            .arg(fields)
            .arg(value)
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;

        tracing::debug!(path = %path, field = %field, version, "Field updated in Redis");
        Ok(())
    }

    async fn subscribe(
        &self,
        path: &StorePath,
        listener: Arc<dyn SnapshotListener>,
    ) -> Result<SubscriptionHandle, StoreError> {
        let channel = self.channel(path);
        let mut pubsub = self
            .client
            .get_async_connection()
            .await
            .map_err(unavailable)?
            .into_pubsub();
        pubsub.subscribe(&channel).await.map_err(unavailable)?;

        // Read after subscribing so no change can slip between the two. The
        // document and its version are read in one transaction; messages that
        // were already queued carry versions at or below it and are dropped.
        let mut conn = self.conn.clone();
        let (initial, initial_version): (Option<String>, Option<u64>) = redis::pipe()
            .atomic()
            .get(self.document_key(path))
            .get(self.version_key(path))
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;

        let path = path.clone();
        let task = tokio::spawn(async move {
            let mut seen = initial_version.unwrap_or(0);
            let mut last = match decode_snapshot(initial.as_deref()) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    listener.on_error(e).await;
                    None
                }
            };
            listener.on_snapshot(last.clone()).await;

            let mut messages = Box::pin(pubsub.on_message());
            while let Some(message) = messages.next().await {
                let decoded = message
                    .get_payload::<String>()
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))
                    .and_then(|payload| decode_change(&payload));

                match decoded {
                    Ok((version, _)) if version <= seen => {
                        tracing::trace!(path = %path, version, seen, "Dropping replayed change");
                    }
                    Ok((version, current)) => {
                        seen = version;
                        if current != last {
                            listener.on_snapshot(current.clone()).await;
                            last = current;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path,
                            listener = listener.name(),
                            "Skipping undecodable change: {}",
                            e
                        );
                    }
                }
            }

            listener
                .on_error(StoreError::SubscriptionClosed(format!(
                    "Redis pub/sub stream for '{}' ended",
                    path
                )))
                .await;
        });

        Ok(SubscriptionHandle::new(task))
    }
}

impl std::fmt::Debug for RedisDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisDocumentStore")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

fn unavailable(e: redis::RedisError) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

/// Parse a stored document. `null` and missing keys are absent.
fn decode_snapshot(raw: Option<&str>) -> Result<Option<Value>, StoreError> {
    match raw {
        None => Ok(None),
        Some(raw) => {
            let value: Value = serde_json::from_str(raw)
                .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
            Ok(Some(value).filter(|v| !v.is_null()))
        }
    }
}

/// Parse a published change into its version and document.
fn decode_change(payload: &str) -> Result<(u64, Option<Value>), StoreError> {
    let change: ChangeMessage = serde_json::from_str(payload)
        .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
    Ok((change.version, Some(change.document).filter(|v| !v.is_null())))
}
