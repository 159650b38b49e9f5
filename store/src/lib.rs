//! Persistent Store
//! ----------------
//! Whole-value key/value storage for the booking flow. Every component gets
//! the store injected at construction; there is no process-wide instance.
//!
//! Values are JSON documents. Reads of a missing key yield `None` and callers
//! fall back to an empty collection, so absence is never an error.

pub mod key;
pub mod memory;
pub mod sqlite_store;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use key::StoreKey;
pub use memory::MemoryStore;
pub use sqlite_store::SqliteStore;

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: StoreKey) -> anyhow::Result<Option<Value>>;
    async fn set(&self, key: StoreKey, value: Value) -> anyhow::Result<()>;
    async fn delete(&self, key: StoreKey) -> anyhow::Result<()>;
}

/// Read and deserialize the record under `key`.
pub async fn load<T, S>(store: &S, key: StoreKey) -> anyhow::Result<Option<T>>
where
    T: DeserializeOwned,
    S: KvStore + ?Sized,
{
    match store.get(key).await? {
        Some(value) => {
            let record = serde_json::from_value(value)
                .map_err(|e| anyhow::anyhow!("malformed record under '{}': {}", key, e))?;
            Ok(Some(record))
        }
        None => Ok(None),
    }
}

/// Serialize `record` and replace whatever is stored under `key`.
pub async fn save<T, S>(store: &S, key: StoreKey, record: &T) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
    S: KvStore + ?Sized,
{
    let value = serde_json::to_value(record)?;
    store.set(key, value).await
}
