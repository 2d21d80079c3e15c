//! File-backed credential store.
//!
//! Credentials live in a JSON file mapping email to a record with a
//! SHA-256 password hash and an admin flag. Lookup failures (missing or
//! corrupt file) authenticate as `false`, they never crash the portal.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::traits::CredentialStore;

/// One stored user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// SHA-256 hex digest of the password.
    pub password_hash: String,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Credential store backed by a JSON file.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, UserRecord>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read credentials: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse credentials: {}", self.path.display()))
    }

    fn store(&self, users: &HashMap<String, UserRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(users).context("failed to serialize credentials")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write credentials: {}", self.path.display()))?;
        Ok(())
    }

    /// Returns `true` if no users are registered yet.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.load()?.is_empty())
    }

    /// Insert or update a user.
    pub fn save_user(&self, email: &str, password: &str, is_admin: bool) -> Result<()> {
        let mut users = self.load()?;
        let now = Utc::now();
        let created_at = users.get(email).map(|u| u.created_at).unwrap_or(now);
        users.insert(
            email.to_string(),
            UserRecord {
                password_hash: hash_password(password),
                is_admin,
                created_at,
                updated_at: now,
            },
        );
        self.store(&users)
    }

    /// Remove a user. Returns `true` if the user existed.
    pub fn remove_user(&self, email: &str) -> Result<bool> {
        let mut users = self.load()?;
        let existed = users.remove(email).is_some();
        if existed {
            self.store(&users)?;
        }
        Ok(existed)
    }

    /// All users, sorted by email.
    pub fn list_users(&self) -> Result<Vec<(String, UserRecord)>> {
        let mut users: Vec<_> = self.load()?.into_iter().collect();
        users.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(users)
    }
}

impl CredentialStore for FileCredentialStore {
    fn authenticate(&self, email: &str, password: &str) -> bool {
        match self.load() {
            Ok(users) => users
                .get(email)
                .is_some_and(|u| u.password_hash == hash_password(password)),
            Err(e) => {
                tracing::warn!("credential lookup failed, denying access: {e:#}");
                false
            }
        }
    }

    fn is_admin(&self, email: &str) -> bool {
        match self.load() {
            Ok(users) => users.get(email).is_some_and(|u| u.is_admin),
            Err(e) => {
                tracing::warn!("credential lookup failed, denying admin: {e:#}");
                false
            }
        }
    }
}

/// SHA-256 hex digest of a password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FileCredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("data/credentials.json"));
        (dir, store)
    }

    #[test]
    fn authenticate_round_trip() {
        let (_dir, store) = store();
        store.save_user("user@example.com", "hunter2", false).unwrap();

        assert!(store.authenticate("user@example.com", "hunter2"));
        assert!(!store.authenticate("user@example.com", "wrong"));
        assert!(!store.authenticate("nobody@example.com", "hunter2"));
    }

    #[test]
    fn missing_file_denies_without_error() {
        let (_dir, store) = store();
        assert!(!store.authenticate("user@example.com", "x"));
        assert!(!store.is_admin("user@example.com"));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn corrupt_file_denies_without_panic() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();
        assert!(!store.authenticate("user@example.com", "x"));
    }

    #[test]
    fn admin_flag_and_update_preserve_created_at() {
        let (_dir, store) = store();
        store.save_user("admin@example.com", "secret", true).unwrap();
        assert!(store.is_admin("admin@example.com"));

        let created = store.list_users().unwrap()[0].1.created_at;
        store.save_user("admin@example.com", "rotated", true).unwrap();
        let record = &store.list_users().unwrap()[0].1;
        assert_eq!(record.created_at, created);
        assert!(store.authenticate("admin@example.com", "rotated"));
        assert!(!store.authenticate("admin@example.com", "secret"));
    }

    #[test]
    fn remove_user() {
        let (_dir, store) = store();
        store.save_user("a@example.com", "pw", false).unwrap();
        assert!(store.remove_user("a@example.com").unwrap());
        assert!(!store.remove_user("a@example.com").unwrap());
        assert!(!store.authenticate("a@example.com", "pw"));
    }

    #[test]
    fn hash_is_sha256_hex() {
        // sha256("password")
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }
}
