//! Read-only access to the identity of the logged-in user.
//!
//! The identity lives in a key-value store under the key `"user"` as a JSON string, for example
//! `{"type":"Employee","email":"a@a"}`. An optional `"jwt"` item holds the bearer token for the
//! remote bills service.

use crate::{utils, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const USER_KEY: &str = "user";
pub const JWT_KEY: &str = "jwt";

/// A string key-value store, in the manner of browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
}

/// Keeps items in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn set_item(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.items.insert(key.into(), value.into());
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }
}

/// Keeps items in a JSON object on disk, e.g. `$BILLED_HOME/session.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl FileStore {
    /// Loads the store at `path`. A missing file is an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = if path.is_file() {
            utils::deserialize(&path).await?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_item(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.items.insert(key.into(), value.into());
    }

    /// Writes all items back to the file.
    pub async fn save(&self) -> Result<()> {
        let data =
            serde_json::to_string_pretty(&self.items).context("Unable to serialize session")?;
        utils::write(&self.path, data)
            .await
            .context("Unable to write session file")
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }
}

/// The identity stored under `"user"`.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(rename = "type")]
    pub user_type: String,
    #[serde(default)]
    pub email: String,
}

/// The session of the logged-in user, handed to each workflow when it is constructed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Session {
    user: SessionUser,
    jwt: Option<String>,
}

impl Session {
    pub fn new(user: SessionUser, jwt: Option<String>) -> Self {
        Self { user, jwt }
    }

    /// Looks the user up in `store`.
    ///
    /// # Errors
    /// - Returns an error if there is no `"user"` item.
    /// - Returns an error if the `"user"` item is not valid JSON with a `type`.
    pub fn from_store(store: &dyn KeyValueStore) -> Result<Self> {
        let raw = store
            .get_item(USER_KEY)
            .context("No user is logged in, run 'billed init' first")?;
        let user: SessionUser = serde_json::from_str(&raw)
            .with_context(|| format!("The stored user is not valid: {raw}"))?;
        Ok(Self {
            user,
            jwt: store.get_item(JWT_KEY),
        })
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn jwt(&self) -> Option<&str> {
        self.jwt.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_session_from_store() {
        let mut store = MemoryStore::default();
        store.set_item(USER_KEY, r#"{"type":"Employee","email":"a@a"}"#);
        store.set_item(JWT_KEY, "token");
        let session = Session::from_store(&store).unwrap();
        assert_eq!("Employee", session.user().user_type);
        assert_eq!("a@a", session.email());
        assert_eq!(Some("token"), session.jwt());
    }

    #[test]
    fn test_session_without_email() {
        let mut store = MemoryStore::default();
        store.set_item(USER_KEY, r#"{"type":"Employee"}"#);
        let session = Session::from_store(&store).unwrap();
        assert_eq!("", session.email());
        assert_eq!(None, session.jwt());
    }

    #[test]
    fn test_session_missing_or_invalid() {
        let store = MemoryStore::default();
        assert!(Session::from_store(&store).is_err());
        let mut store = MemoryStore::default();
        store.set_item(USER_KEY, "not json");
        assert!(Session::from_store(&store).is_err());
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let mut store = FileStore::load(&path).await.unwrap();
        assert_eq!(None, store.get_item(USER_KEY));
        store.set_item(USER_KEY, r#"{"type":"Employee","email":"b@b"}"#);
        store.save().await.unwrap();

        let reloaded = FileStore::load(&path).await.unwrap();
        let session = Session::from_store(&reloaded).unwrap();
        assert_eq!("b@b", session.email());
    }
}
