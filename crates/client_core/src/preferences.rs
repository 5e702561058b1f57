//! Persistent user preferences (language and theme).

use std::{collections::BTreeMap, path::PathBuf};

use async_trait::async_trait;
use shared::protocol::PrefKey;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::PreferenceError;

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get_item(&self, key: PrefKey) -> Result<Option<String>, PreferenceError>;
    async fn set_item(&self, key: PrefKey, value: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, key: PrefKey, value: impl Into<String>) -> Self {
        self.items
            .get_mut()
            .insert(key.as_str().to_string(), value.into());
        self
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get_item(&self, key: PrefKey) -> Result<Option<String>, PreferenceError> {
        Ok(self.items.lock().await.get(key.as_str()).cloned())
    }

    async fn set_item(&self, key: PrefKey, value: &str) -> Result<(), PreferenceError> {
        self.items
            .lock()
            .await
            .insert(key.as_str().to_string(), value.to_string());
        Ok(())
    }
}

/// Flat `key = "value"` TOML file. A missing file reads as empty.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(toml::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn get_item(&self, key: PrefKey) -> Result<Option<String>, PreferenceError> {
        Ok(self.read_all().await?.remove(key.as_str()))
    }

    async fn set_item(&self, key: PrefKey, value: &str) -> Result<(), PreferenceError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_all().await?;
        items.insert(key.as_str().to_string(), value.to_string());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, toml::to_string(&items)?).await?;
        debug!(key = key.as_str(), path = %self.path.display(), "stored preference");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/preferences_tests.rs"]
mod tests;
