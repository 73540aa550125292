// src/services/storage.rs
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is not valid json: {0}")]
    Format(#[from] serde_json::Error),
}

/// Key/value storage that outlives the process, the way browser local storage does.
pub trait DurableStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard.remove(key);
        Ok(())
    }
}

/// Flat JSON object on disk, rewritten whole on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file. A missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let cache = match std::fs::read_to_string(&path) {
            Ok(content) if !content.trim().is_empty() => serde_json::from_str(&content)?,
            Ok(_) => HashMap::new(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, cache: RwLock::new(cache) })
    }

    fn flush(&self, data: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl DurableStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let guard = self.cache.read().unwrap_or_else(|e| e.into_inner());
        guard.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.cache.write().unwrap_or_else(|e| e.into_inner());
        guard.insert(key.to_string(), value.to_string());
        self.flush(&guard)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.cache.write().unwrap_or_else(|e| e.into_inner());
        if guard.remove(key).is_some() {
            self.flush(&guard)?;
        }
        Ok(())
    }
}
