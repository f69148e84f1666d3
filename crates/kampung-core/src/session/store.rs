//! Persistent session storage.
//!
//! The session is two independent string entries: the access token and the
//! JSON-encoded cached user. `FileSessionStore` keeps them in
//! `<base>/session.json` with restricted permissions (0600).
//! Tokens are never logged.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};

use crate::config::paths;

/// Storage keys. Only the token and user entries are read or written; the
/// rest are reserved names kept so nothing else claims them.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const USER: &str = "user";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const THEME: &str = "theme";
    pub const LANGUAGE: &str = "language";
}

/// Key/value storage that outlives a single client run.
///
/// There is no expiry tracking: a token stays until it is removed or the
/// server rejects it.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// # Errors
    /// Returns an error if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<()>;

    /// The stored access token, ignoring blank values.
    fn access_token(&self) -> Option<String> {
        self.get(keys::ACCESS_TOKEN)
            .filter(|token| !token.trim().is_empty())
    }

    /// Removes both session entries.
    ///
    /// # Errors
    /// Returns the first failure; the second key is still attempted.
    fn clear_session(&self) -> Result<()> {
        let token = self.remove(keys::ACCESS_TOKEN);
        let user = self.remove(keys::USER);
        token.and(user)
    }
}

/// In-process store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|err| anyhow!("session store lock poisoned: {err}"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|err| anyhow!("session store lock poisoned: {err}"))?
            .remove(key);
        Ok(())
    }
}

/// JSON-file backed store.
///
/// Every read goes to disk so separate processes observe each other's writes.
/// A missing or corrupt file reads as empty.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store at the default `<KAMPUNG_HOME>/session.json`.
    pub fn open_default() -> Self {
        Self::new(paths::session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> HashMap<String, String> {
        if !self.path.exists() {
            return HashMap::new();
        }
        let parsed = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {}", self.path.display()))
            .and_then(|contents| {
                serde_json::from_str(&contents).with_context(|| {
                    format!("Failed to parse session from {}", self.path.display())
                })
            });
        match parsed {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("{err:#}; treating session store as empty");
                HashMap::new()
            }
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(entries).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut HashMap<String, String>) -> bool) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|err| anyhow!("session store lock poisoned: {err}"))?;
        let mut entries = self.load();
        if apply(&mut entries) {
            self.save(&entries)?;
        }
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| entries.remove(key).is_some())
    }
}
