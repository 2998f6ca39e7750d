use std::{
    collections::BTreeMap,
    path::{
        Path,
        PathBuf,
    },
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{
    debug,
    info,
};

use super::KeyValueStore;
use crate::{
    core::KikitoriError,
    persistence::get_data_file_path,
};

const DEFAULT_FILE_NAME: &str = "store.json";

/// Keeps every entry in memory and rewrites one JSON file on each change.
///
/// The snapshot is written to a sibling temp file first and then renamed over
/// the old one, so a crash mid write leaves the previous snapshot intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, KikitoriError> {
        let path = path.as_ref().to_path_buf();

        let entries: BTreeMap<String, Value> = match tokio::fs::read_to_string(&path).await {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!("Opened store {} with {} entries", path.display(), entries.len());
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    /// Opens `store.json` in the application data directory.
    pub async fn open_default() -> Result<Self, KikitoriError> {
        Self::open(get_data_file_path(DEFAULT_FILE_NAME)).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, entries: &BTreeMap<String, Value>) -> Result<(), KikitoriError> {
        let json = serde_json::to_vec_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        debug!("Store saved to: {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, KikitoriError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), KikitoriError> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        next.insert(key.to_string(), value);

        // memory only follows the disk once the snapshot is written
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), KikitoriError> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }

        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Value)>, KikitoriError> {
        let entries = self.entries.lock().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}
