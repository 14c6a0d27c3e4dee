// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! JSON-file-backed key-value store.
//!
//! The process-local analogue of the browser's persistent key-value
//! storage: one flat string-to-JSON map, written through to a single
//! file on every mutation. Values are arbitrary JSON so callers bring
//! their own types.

use crate::error::AppError;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct KvStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    map: DashMap<String, serde_json::Value>,
    /// Serializes file writes; the map itself is lock-free.
    write_lock: Mutex<()>,
}

impl KvStore {
    /// Open (or create) the store backing file.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Store(format!("create {}: {}", parent.display(), e)))?;
        }

        let map = DashMap::new();
        match std::fs::read(path) {
            Ok(bytes) => {
                let entries: std::collections::HashMap<String, serde_json::Value> =
                    serde_json::from_slice(&bytes).map_err(|e| {
                        AppError::Store(format!("corrupt state file {}: {}", path.display(), e))
                    })?;
                for (key, value) in entries {
                    map.insert(key, value);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(AppError::Store(format!("read {}: {}", path.display(), e)));
            }
        }

        Ok(Self {
            inner: Arc::new(Inner {
                path: path.to_path_buf(),
                map,
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// Read and deserialize a value; absent or wrong-shaped values are `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.inner.map.get(key)?.value().clone();
        serde_json::from_value(value).ok()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.map.contains_key(key)
    }

    /// Store a value and write the map through to disk.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(value)
            .map_err(|e| AppError::Store(format!("encode {}: {}", key, e)))?;
        self.inner.map.insert(key.to_string(), value);
        self.persist()
    }

    /// Remove a key; removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> Result<(), AppError> {
        self.inner.map.remove(key);
        self.persist()
    }

    fn persist(&self) -> Result<(), AppError> {
        let _guard = self
            .inner
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let entries: std::collections::BTreeMap<String, serde_json::Value> = self
            .inner
            .map
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let bytes = serde_json::to_vec_pretty(&entries)
            .map_err(|e| AppError::Store(format!("encode state file: {}", e)))?;

        // Write-then-rename so a crash mid-write never truncates the store.
        let tmp = self.inner.path.with_extension("json.tmp");
        std::fs::write(&tmp, &bytes)
            .map_err(|e| AppError::Store(format!("write {}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, &self.inner.path)
            .map_err(|e| AppError::Store(format!("rename into {}: {}", self.inner.path.display(), e)))
    }
}
