//! File-backed allowlist store.
//!
//! The whole document is kept in memory and rewritten wholesale on every
//! mutation. Writes go through a temp file in the same directory followed by
//! a rename, so a crash mid-write never leaves a half-written file behind.
//! A mutation only becomes visible in memory once it is on disk.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// On-disk document: `{ "allowedChannels": [...], "model": "..." }`.
///
/// Unknown keys are rejected so a misspelled or foreign file is reported
/// instead of loading as an empty allowlist and being overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StoredConfig {
    #[serde(default)]
    pub allowed_channels: BTreeSet<String>,
    /// Runtime model override set through the admin command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

pub struct ConfigStore {
    path: PathBuf,
    state: RwLock<StoredConfig>,
}

impl ConfigStore {
    /// Load the store at `path`, creating it with an empty allowlist when absent.
    ///
    /// The loaded document is written back immediately, so an unwritable file
    /// or directory fails here at startup rather than on the first admin
    /// command.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let state = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            let loaded: StoredConfig =
                serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
                    path: path.clone(),
                    source,
                })?;
            write_atomically(&path, &loaded)?;
            loaded
        } else {
            let empty = StoredConfig::default();
            write_atomically(&path, &empty)?;
            info!(path = %path.display(), "created empty config store");
            empty
        };

        let store = Self {
            path,
            state: RwLock::new(state),
        };
        debug!(
            path = %store.path.display(),
            channels = store.read().allowed_channels.len(),
            "config store loaded"
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_allowed(&self, channel_id: &str) -> bool {
        self.read().allowed_channels.contains(channel_id)
    }

    /// Allowlisted channel ids in ascending order.
    pub fn channels(&self) -> Vec<String> {
        self.read().allowed_channels.iter().cloned().collect()
    }

    pub fn model(&self) -> Option<String> {
        self.read().model.clone()
    }

    /// Add a channel. Returns `false` (and skips the write) when it was
    /// already allowed.
    pub fn allow(&self, channel_id: &str) -> Result<bool, StoreError> {
        self.update(|cfg| cfg.allowed_channels.insert(channel_id.to_string()))
    }

    /// Remove a channel. Returns `false` (and skips the write) when it was
    /// not allowed.
    pub fn disallow(&self, channel_id: &str) -> Result<bool, StoreError> {
        self.update(|cfg| cfg.allowed_channels.remove(channel_id))
    }

    /// Persist a model override. Returns `false` when unchanged.
    pub fn set_model(&self, model: &str) -> Result<bool, StoreError> {
        self.update(|cfg| {
            if cfg.model.as_deref() == Some(model) {
                return false;
            }
            cfg.model = Some(model.to_string());
            true
        })
    }

    /// Apply `mutate` to a copy of the current document and persist it. The
    /// in-memory state is only replaced after the write succeeded.
    fn update<F>(&self, mutate: F) -> Result<bool, StoreError>
    where
        F: FnOnce(&mut StoredConfig) -> bool,
    {
        let mut guard = self.write();
        let mut next = guard.clone();
        if !mutate(&mut next) {
            return Ok(false);
        }
        write_atomically(&self.path, &next)?;
        *guard = next;
        Ok(true)
    }

    fn read(&self) -> RwLockReadGuard<'_, StoredConfig> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoredConfig> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn write_atomically(path: &Path, cfg: &StoredConfig) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut body = serde_json::to_string_pretty(cfg)?;
    body.push('\n');

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(body.as_bytes()).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::open(dir.path().join("relaybot_config.json")).unwrap()
    }

    #[test]
    fn open_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.channels().is_empty());

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({ "allowedChannels": [] }));
    }

    #[test]
    fn allow_persists_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.allow("111").unwrap());
        assert!(!store.allow("111").unwrap());
        assert!(store.is_allowed("111"));
        assert!(!store.is_allowed("222"));

        let reopened = store_in(&dir);
        assert_eq!(reopened.channels(), vec!["111".to_string()]);
    }

    #[test]
    fn disallow_removes_channel() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.allow("111").unwrap();
        store.allow("222").unwrap();

        assert!(store.disallow("111").unwrap());
        assert!(!store.disallow("111").unwrap());
        assert_eq!(store_in(&dir).channels(), vec!["222".to_string()]);
    }

    #[test]
    fn file_is_pretty_printed_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.allow("42").unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"allowedChannels\": [\n"));
        assert!(!raw.contains("model"));
    }

    #[test]
    fn model_override_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.model().is_none());

        assert!(store.set_model("gpt-4o").unwrap());
        assert!(!store.set_model("gpt-4o").unwrap());
        assert_eq!(store_in(&dir).model().as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relaybot_config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ConfigStore::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[test]
    fn missing_key_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relaybot_config.json");
        std::fs::write(&path, "{}").unwrap();

        let store = ConfigStore::open(&path).unwrap();
        assert!(store.channels().is_empty());
    }

    #[test]
    fn unknown_keys_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relaybot_config.json");
        let original = r#"{ "allowed_channels": ["111"] }"#;
        std::fs::write(&path, original).unwrap();

        let err = ConfigStore::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::Malformed { .. }));
        // The user's file is left as it was.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn open_rewrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relaybot_config.json");
        std::fs::write(&path, r#"{"allowedChannels":["222","111"]}"#).unwrap();

        let store = ConfigStore::open(&path).unwrap();
        assert_eq!(store.channels(), vec!["111".to_string(), "222".to_string()]);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "{\n  \"allowedChannels\": [\n    \"111\",\n    \"222\"\n  ]\n}\n");
    }

    #[cfg(unix)]
    #[test]
    fn unwritable_directory_fails_at_open() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relaybot_config.json");
        std::fs::write(&path, r#"{"allowedChannels":["111"]}"#).unwrap();

        let set_mode = |mode| {
            std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(mode)).unwrap()
        };
        set_mode(0o555);
        // Privileged users ignore mode bits; nothing to check there.
        if NamedTempFile::new_in(dir.path()).is_ok() {
            set_mode(0o755);
            return;
        }

        let result = ConfigStore::open(&path);
        set_mode(0o755);
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.allow("111").unwrap();

        // Pull the directory out from under the store so the next write fails.
        drop(dir);

        assert!(store.allow("222").is_err());
        assert!(!store.is_allowed("222"));
        assert!(store.disallow("111").is_err());
        assert!(store.is_allowed("111"));
    }
}
