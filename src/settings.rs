//! Persisted key/value settings used by the advanced screen.
//!
//! The panel only ever touches two keys, [`GSM_ROAMING`] and [`GSM_APN`]. The
//! store is handed to the advanced screen at construction; nothing looks it
//! up globally.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

pub const GSM_ROAMING: &str = "GsmRoaming";
pub const GSM_APN: &str = "GsmApn";

pub trait SettingsStore {
    /// Missing keys read as the empty string.
    fn get(&self, key: &str) -> String;
    fn put(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Missing keys read as `false`.
    fn get_bool(&self, key: &str) -> bool {
        self.get(key) == "1"
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.put(key, if value { "1" } else { "0" })
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemorySettingsStore {
    values: HashMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> String {
        self.values.get(key).cloned().unwrap_or_default()
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory.
///
/// Writes go to a temporary file that is renamed over the key, so a reader
/// never sees a half-written value.
#[derive(Clone, Debug)]
pub struct FileSettingsStore {
    dir: PathBuf,
}

impl FileSettingsStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| Error::Settings {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> String {
        let Ok(path) = self.key_path(key) else {
            return String::new();
        };
        match fs::read_to_string(&path) {
            Ok(value) => value,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    debug!("failed to read setting {}: {}", key, e);
                }
                String::new()
            }
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let tmp = self.dir.join(format!(".tmp_{key}"));
        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        };
        write().map_err(|source| Error::Settings {
            key: key.to_string(),
            source,
        })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::Settings {
                key: key.to_string(),
                source,
            }),
        }
    }
}

impl<S: SettingsStore + ?Sized> SettingsStore for Box<S> {
    fn get(&self, key: &str) -> String {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).put(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSettingsStore::open(dir.path().join("params")).unwrap();

        assert_eq!(store.get(GSM_APN), "");
        assert!(!store.get_bool(GSM_ROAMING));

        store.put(GSM_APN, "internet.example").unwrap();
        store.put_bool(GSM_ROAMING, true).unwrap();

        assert_eq!(store.get(GSM_APN), "internet.example");
        assert!(store.get_bool(GSM_ROAMING));
        assert_eq!(
            fs::read_to_string(store.dir().join(GSM_ROAMING)).unwrap(),
            "1"
        );
    }

    #[test]
    fn file_store_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSettingsStore::open(dir.path()).unwrap();

        store.put(GSM_APN, "apn").unwrap();
        store.remove(GSM_APN).unwrap();
        store.remove(GSM_APN).unwrap();

        assert_eq!(store.get(GSM_APN), "");
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSettingsStore::open(dir.path()).unwrap();

        let err = store.put("../escape", "x").unwrap_err();
        assert!(matches!(err, Error::InvalidKey(_)));
    }

    #[test]
    fn memory_store_defaults() {
        let mut store = MemorySettingsStore::new();
        assert!(!store.get_bool(GSM_ROAMING));
        store.put_bool(GSM_ROAMING, false).unwrap();
        assert!(store.contains(GSM_ROAMING));
        assert!(!store.get_bool(GSM_ROAMING));
    }
}
