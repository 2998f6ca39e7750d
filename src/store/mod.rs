mod file;
mod memory;

use async_trait::async_trait;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
use serde::{
    de::DeserializeOwned,
    Serialize,
};

use crate::core::KikitoriError;

/// String keyed JSON value storage. Keys are namespaced with `/`, e.g.
/// `srs/ja/猫` or `ja/猫`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, KikitoriError>;

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), KikitoriError>;

    async fn delete(&self, key: &str) -> Result<(), KikitoriError>;

    /// All entries whose key starts with `prefix`, in key order.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, serde_json::Value)>, KikitoriError>;
}

/// Typed helpers on top of the raw JSON interface.
pub async fn get_as<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, KikitoriError> {
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

pub async fn put_as<T: Serialize + Sync>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), KikitoriError> {
    store.put(key, serde_json::to_value(value)?).await
}
