//! Durable backends for the credential store.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use courtside_core::error::ClientError;
use courtside_core::result::ClientResult;

use crate::credential::Credential;

/// Abstracts the durable medium holding the persisted credential pair.
///
/// `persist` must complete durably before returning so that a process
/// restart observes the same pair the store last wrote.
#[async_trait]
pub trait CredentialBackend: fmt::Debug + Send + Sync {
    /// Loads the persisted pair, or `None` when nothing is stored.
    async fn load(&self) -> ClientResult<Option<Credential>>;

    /// Durably writes the pair, replacing any previous copy.
    async fn persist(&self, credential: &Credential) -> ClientResult<()>;

    /// Removes the persisted pair.
    async fn clear(&self) -> ClientResult<()>;
}

/// JSON-file backend.
///
/// Writes go to a sibling temp file first and are renamed into place, so
/// an interrupted write never leaves a corrupt pair on disk.
#[derive(Debug, Clone)]
pub struct FileCredentialBackend {
    /// Path of the persisted JSON file.
    path: PathBuf,
}

impl FileCredentialBackend {
    /// Creates a backend storing the pair at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl CredentialBackend for FileCredentialBackend {
    async fn load(&self) -> ClientResult<Option<Credential>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ClientError::with_source(
                    courtside_core::error::ErrorKind::Credential,
                    format!("Failed to read credential file: {e}"),
                    e,
                ));
            }
        };

        let credential: Credential = serde_json::from_slice(&bytes).map_err(|e| {
            ClientError::credential(format!("Corrupt credential file: {e}"))
        })?;
        Ok(Some(credential))
    }

    async fn persist(&self, credential: &Credential) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ClientError::credential(format!("Failed to create credential dir: {e}"))
                })?;
            }
        }

        let bytes = serde_json::to_vec_pretty(credential)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes)
            .await
            .map_err(|e| ClientError::credential(format!("Failed to write credentials: {e}")))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| ClientError::credential(format!("Failed to replace credentials: {e}")))?;

        debug!(path = %self.path.display(), "Credential pair persisted");
        Ok(())
    }

    async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::credential(format!(
                "Failed to remove credential file: {e}"
            ))),
        }
    }
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialBackend {
    slot: RwLock<Option<Credential>>,
}

impl MemoryCredentialBackend {
    /// Creates an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialBackend for MemoryCredentialBackend {
    async fn load(&self) -> ClientResult<Option<Credential>> {
        Ok(self.slot.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn persist(&self, credential: &Credential) -> ClientResult<()> {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> ClientResult<()> {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
