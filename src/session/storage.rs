//! Session storage backends
//!
//! A string key/value seam with the semantics of browser `localStorage`.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::{ClientError, ClientResult};

/// Persisted string key/value storage
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> ClientResult<()>;
    fn remove(&self, key: &str) -> ClientResult<()>;
}

impl<T: SessionStorage + ?Sized> SessionStorage for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        (**self).remove(key)
    }
}

impl<T: SessionStorage + ?Sized> SessionStorage for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        (**self).remove(key)
    }
}

/// Process-local storage; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.entries
            .lock()
            .map_err(|_| ClientError::Storage("session storage poisoned".into()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.entries
            .lock()
            .map_err(|_| ClientError::Storage("session storage poisoned".into()))?
            .remove(key);
        Ok(())
    }
}

#[cfg(feature = "native")]
pub use file::FileStorage;

#[cfg(feature = "native")]
mod file {
    use super::*;
    use std::path::{Path, PathBuf};

    /// JSON file storage, the native stand-in for `localStorage`.
    ///
    /// The whole map is rewritten on every mutation.
    #[derive(Debug)]
    pub struct FileStorage {
        path: PathBuf,
        entries: Mutex<BTreeMap<String, String>>,
    }

    impl FileStorage {
        /// Open (or lazily create) the storage file at `path`
        pub fn open(path: impl Into<PathBuf>) -> ClientResult<Self> {
            let path = path.into();
            let entries = if path.exists() {
                let content = std::fs::read_to_string(&path)?;
                if content.trim().is_empty() {
                    BTreeMap::new()
                } else {
                    serde_json::from_str(&content).map_err(|e| {
                        ClientError::Storage(format!("corrupt session file {:?}: {}", path, e))
                    })?
                }
            } else {
                BTreeMap::new()
            };

            tracing::debug!(path = ?path, keys = entries.len(), "Opened session storage");

            Ok(Self {
                path,
                entries: Mutex::new(entries),
            })
        }

        /// `<data dir>/troika/session.json`
        pub fn default_path() -> PathBuf {
            dirs::data_local_dir()
                .map(|p| p.join("troika").join("session.json"))
                .unwrap_or_else(|| PathBuf::from("./troika_session.json"))
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn persist(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let content = serde_json::to_string_pretty(entries)?;
            std::fs::write(&self.path, content)?;
            Ok(())
        }

        fn mutate(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> ClientResult<()> {
            let mut entries = self
                .entries
                .lock()
                .map_err(|_| ClientError::Storage("session storage poisoned".into()))?;
            f(&mut entries);
            self.persist(&entries)
        }
    }

    impl SessionStorage for FileStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.entries.lock().ok()?.get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) -> ClientResult<()> {
            self.mutate(|entries| {
                entries.insert(key.to_string(), value.to_string());
            })
        }

        fn remove(&self, key: &str) -> ClientResult<()> {
            self.mutate(|entries| {
                entries.remove(key);
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::default();
        assert_eq!(storage.get("k"), None);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k"), None);
        // removing a missing key is not an error
        storage.remove("k").unwrap();
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        {
            let storage = FileStorage::open(&path).unwrap();
            storage.set("adminToken", "abc").unwrap();
            storage.set("isAdmin", "true").unwrap();
        }

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get("adminToken").as_deref(), Some("abc"));

        storage.remove("adminToken").unwrap();
        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get("adminToken"), None);
        assert_eq!(storage.get("isAdmin").as_deref(), Some("true"));
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = FileStorage::open(&path).unwrap_err();
        assert!(matches!(err, ClientError::Storage(_)));
    }
}
