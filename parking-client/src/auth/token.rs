//! Bearer token persistence - JSON file storage

use serde::{Deserialize, Serialize};
use shared::models::UserRole;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ClientResult;

/// Default token file name
pub const TOKEN_FILE: &str = "token.json";

/// Token saved after a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub saved_at: chrono::DateTime<chrono::Utc>,
}

impl StoredToken {
    pub fn new(token: impl Into<String>, role: UserRole, username: Option<String>) -> Self {
        Self {
            token: token.into(),
            role,
            username,
            saved_at: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self::with_filename(base_path, TOKEN_FILE)
    }

    pub fn with_filename(base_path: impl Into<PathBuf>, filename: &str) -> Self {
        Self {
            path: base_path.into().join(filename),
        }
    }

    pub fn save(&self, token: &StoredToken) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), "Token saved");
        Ok(())
    }

    /// Saved token, `None` when missing or unreadable
    pub fn load(&self) -> Option<StoredToken> {
        let json = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&json) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Ignoring corrupt token file: {e}");
                None
            }
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Remove the token file (logout); missing file is fine
    pub fn clear(&self) -> ClientResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("auth"));
        assert!(store.load().is_none());

        let token = StoredToken::new("jwt-abc", UserRole::Admin, Some("admin".into()));
        store.save(&token).unwrap();
        assert!(store.exists());
        assert_eq!(store.load(), Some(token));

        store.clear().unwrap();
        assert!(!store.exists());
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::with_filename(dir.path(), "broken.json");
        fs::write(store.path(), "{not json").unwrap();

        assert!(store.exists());
        assert!(store.load().is_none());
    }
}
