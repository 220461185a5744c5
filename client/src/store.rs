//! Durable token storage.
//!
//! The durable copy exists for cross-restart continuity only. It is
//! advisory: failures to read or write it are logged and swallowed, and
//! the in-memory copy always wins when both exist.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Where the session cache persists its advisory token copy.
pub trait TokenStore: Send + Sync {
    /// Load the stored token, if any.
    fn load(&self) -> Option<String>;

    /// Persist a token, replacing any previous one.
    fn save(&self, token: &str);

    /// Remove the stored token.
    fn clear(&self);
}

impl<T: TokenStore + ?Sized> TokenStore for std::sync::Arc<T> {
    fn load(&self) -> Option<String> {
        (**self).load()
    }

    fn save(&self, token: &str) {
        (**self).save(token)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    token: Option<String>,
}

/// TokenStore backed by a TOML file (default: `~/.bookstore/credentials.toml`).
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default credentials path under the user's home directory.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".bookstore").join("credentials.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Option<CredentialsFile> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match toml::from_str(&content) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "credentials file unparsable");
                None
            }
        }
    }

    fn write(&self, file: &CredentialsFile) {
        let content = match toml::to_string_pretty(file) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize credentials");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(error = %e, "failed to create credentials directory");
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, content) {
            tracing::warn!(error = %e, path = %self.path.display(), "failed to write credentials");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        self.read()?.token
    }

    fn save(&self, token: &str) {
        self.write(&CredentialsFile {
            token: Some(token.to_string()),
        });
    }

    fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!(error = %e, path = %self.path.display(), "failed to remove credentials");
            }
        }
    }
}

/// In-memory TokenStore for tests and token-less embedding.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn save(&self, token: &str) {
        *self.token.lock() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("credentials.toml"));

        assert!(store.load().is_none());

        store.save("tok-1");
        assert_eq!(store.load().as_deref(), Some("tok-1"));

        store.save("tok-2");
        assert_eq!(store.load().as_deref(), Some("tok-2"));

        store.clear();
        assert!(store.load().is_none());
        // Clearing twice is fine.
        store.clear();
    }

    #[test]
    fn unparsable_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        std::fs::write(&path, "{{{{ not toml").unwrap();

        let store = FileTokenStore::new(path);
        assert!(store.load().is_none());
    }
}
