// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token persistence backends.
//!
//! - [`MemoryTokenStore`]: process-local, for tests and ephemeral sessions
//! - [`FileTokenStore`]: a small JSON key/value file that survives restarts

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::collaborator::TokenPersistence;
use crate::error::PersistenceError;

/// Key under which the token is kept in a [`FileTokenStore`].
pub const TOKEN_KEY: &str = "access_token";

// =============================================================================
// MemoryTokenStore
// =============================================================================

/// In-memory token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenPersistence for MemoryTokenStore {
    fn get_token(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.token.lock().clone())
    }

    fn set_token(&self, token: &str) -> Result<(), PersistenceError> {
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> Result<(), PersistenceError> {
        self.token.lock().take();
        Ok(())
    }
}

// =============================================================================
// FileTokenStore
// =============================================================================

/// Stores the token in a JSON object on disk.
///
/// Other keys in the file are preserved. Writes go to a sibling temporary file
/// that is then renamed over the original, so a crash never leaves a
/// half-written store behind.
///
/// # Blocking
///
/// [`TokenPersistence`] is synchronous, and this store uses `std::fs`. The
/// controller calls it from `login`, `refresh` and `logout`, so each call
/// blocks the worker thread for one read or one write-and-rename of a file a
/// few hundred bytes long. Keep the file on local disk. A store on a network
/// filesystem should wrap its I/O in `tokio::task::spawn_blocking` behind its
/// own [`TokenPersistence`] implementation.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    /// Creates a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, PersistenceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(PersistenceError::io(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(PersistenceError::corrupt(&self.path, "expected a JSON object")),
            Err(e) => Err(PersistenceError::corrupt(&self.path, e.to_string())),
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
        }

        let content = serde_json::to_string_pretty(map)
            .map_err(|e| PersistenceError::backend(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, content).map_err(|e| PersistenceError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| PersistenceError::io(&self.path, e))
    }
}

impl TokenPersistence for FileTokenStore {
    fn get_token(&self) -> Result<Option<String>, PersistenceError> {
        let _guard = self.lock.lock();
        let map = self.read_map()?;
        Ok(map.get(TOKEN_KEY).and_then(Value::as_str).map(str::to_string))
    }

    fn set_token(&self, token: &str) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        map.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_map(&map)
    }

    fn clear_token(&self) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        if map.remove(TOKEN_KEY).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get_token().unwrap(), None);

        store.set_token("a.b.c").unwrap();
        assert_eq!(store.get_token().unwrap().as_deref(), Some("a.b.c"));

        store.clear_token().unwrap();
        store.clear_token().unwrap();
        assert_eq!(store.get_token().unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileTokenStore::new(&path).set_token("a.b.c").unwrap();
        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.get_token().unwrap().as_deref(), Some("a.b.c"));

        reopened.clear_token().unwrap();
        assert_eq!(FileTokenStore::new(&path).get_token().unwrap(), None);
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get_token().unwrap(), None);
        store.clear_token().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_preserves_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = FileTokenStore::new(&path);
        store.set_token("t").unwrap();
        store.clear_token().unwrap();

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["theme"], "dark");
        assert!(value.get(TOKEN_KEY).is_none());
    }

    #[test]
    fn test_file_store_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "[1, 2]").unwrap();

        let err = FileTokenStore::new(&path).get_token().unwrap_err();
        assert!(matches!(err, PersistenceError::Corrupt { .. }));
    }
}
