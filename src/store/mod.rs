//! Durable client-side persistence of the current session.
//!
//! Stores are passive: no validation beyond "can this be read back as a
//! session", no side effects beyond persistence. Corrupt or partial records
//! load as `None` instead of failing the caller.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::types::Session;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the stored session, if any
    async fn load(&self) -> Option<Session>;

    /// Replace the stored session
    async fn save(&self, session: &Session) -> Result<(), ClientError>;

    /// Remove the stored session. Clearing an empty store is a no-op.
    async fn clear(&self) -> Result<(), ClientError>;
}

/// Decode a raw stored record, tolerating garbage
fn decode(raw: &str) -> Option<Session> {
    match serde_json::from_str::<Session>(raw) {
        Ok(session) if !session.token.trim().is_empty() => Some(session),
        Ok(_) => {
            warn!("Stored session has an empty token, ignoring it");
            None
        }
        Err(e) => {
            warn!("Stored session is unreadable, ignoring it: {}", e);
            None
        }
    }
}

/// One JSON file per storage key (`<dir>/<key>.json`)
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Option<Session> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => decode(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                None
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write then rename so a concurrent reader never sees half a record
        let content = serde_json::to_string_pretty(session)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("Session saved to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Session removed from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store holding the serialized record, like a browser key-value slot
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with an arbitrary raw value (may be malformed)
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.read().ok().and_then(|slot| slot.clone())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Option<Session> {
        self.raw().as_deref().and_then(decode)
    }

    async fn save(&self, session: &Session) -> Result<(), ClientError> {
        let raw = serde_json::to_string(session)?;
        let mut slot = self
            .slot
            .write()
            .map_err(|_| ClientError::Storage("credential slot poisoned".to_string()))?;
        *slot = Some(raw);
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| ClientError::Storage("credential slot poisoned".to_string()))?;
        slot.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[tokio::test]
    async fn memory_store_round_trips_and_clears() {
        let store = MemoryCredentialStore::new();
        assert!(store.load().await.is_none());

        let session = Session::new("t1").with_user_id(7).with_role(Role::Employee);
        store.save(&session).await.unwrap();
        assert_eq!(store.load().await, Some(session));

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn malformed_records_load_as_none() {
        for raw in ["{not json", "{\"username\":\"a\"}", "{\"token\":\"\"}", "42"] {
            let store = MemoryCredentialStore::with_raw(raw);
            assert!(store.load().await.is_none(), "raw {raw:?} should not load");
        }
    }

    #[tokio::test]
    async fn file_store_persists_under_storage_key() {
        let dir = std::env::temp_dir().join(format!("payroll-store-{}", uuid::Uuid::new_v4()));
        let store = FileCredentialStore::new(&dir, "auth");
        assert!(store.path().ends_with("auth.json"));
        assert!(store.load().await.is_none());

        let session = Session::new("abc").with_role(Role::Admin);
        store.save(&session).await.unwrap();
        assert_eq!(store.load().await, Some(session));

        tokio::fs::write(store.path(), "{\"token\": ").await.unwrap();
        assert!(store.load().await.is_none());

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
