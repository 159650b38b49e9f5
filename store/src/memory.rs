use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::{KvStore, StoreKey};

/// Process-local store; the equivalent of browser page storage.
///
/// The lock is never held across an await, so a sync mutex is enough.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<StoreKey, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently holding a value.
    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: StoreKey) -> anyhow::Result<Option<Value>> {
        Ok(self.map.lock().get(&key).cloned())
    }

    async fn set(&self, key: StoreKey, value: Value) -> anyhow::Result<()> {
        self.map.lock().insert(key, value);
        Ok(())
    }

    async fn delete(&self, key: StoreKey) -> anyhow::Result<()> {
        self.map.lock().remove(&key);
        Ok(())
    }
}
