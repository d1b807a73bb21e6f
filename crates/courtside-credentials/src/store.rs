//! The credential store shared by the gateway and the realtime channel.

use std::sync::{Arc, RwLock};

use tracing::info;

use courtside_core::result::ClientResult;

use crate::backend::{CredentialBackend, MemoryCredentialBackend};
use crate::credential::Credential;

/// Authoritative holder of the current credential pair.
///
/// Reads are synchronous and infallible against an in-process cache.
/// Mutations persist to the durable backend **before** the cache is
/// updated and the call returns, so every component observing the store
/// afterwards (including after a process restart) sees the same pair.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    cached: Arc<RwLock<Credential>>,
    backend: Arc<dyn CredentialBackend>,
}

impl CredentialStore {
    /// Opens a store over `backend`, hydrating the cache from the
    /// persisted copy.
    pub async fn open(backend: Arc<dyn CredentialBackend>) -> ClientResult<Self> {
        let cached = backend.load().await?.unwrap_or_default();
        Ok(Self {
            cached: Arc::new(RwLock::new(cached)),
            backend,
        })
    }

    /// Creates an empty store over an in-memory backend.
    pub fn in_memory() -> Self {
        Self {
            cached: Arc::new(RwLock::new(Credential::default())),
            backend: Arc::new(MemoryCredentialBackend::new()),
        }
    }

    /// Returns the current credential pair. Never blocks on I/O and
    /// never fails; the logged-out state is an empty pair.
    pub fn get(&self) -> Credential {
        self.cached
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Current access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.get().access_token
    }

    /// Current refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.get().refresh_token
    }

    /// Stores a rotated pair. An omitted refresh token retains the
    /// previous one. The pair is durably persisted before this returns.
    pub async fn set(
        &self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
    ) -> ClientResult<()> {
        let next = self.get().rotated(access_token, refresh_token);
        self.backend.persist(&next).await?;
        *self.cached.write().unwrap_or_else(|e| e.into_inner()) = next;
        Ok(())
    }

    /// Removes both tokens, durably. Subsequent `get()` returns the
    /// empty pair.
    pub async fn clear(&self) -> ClientResult<()> {
        self.backend.clear().await?;
        *self.cached.write().unwrap_or_else(|e| e.into_inner()) = Credential::default();
        info!("Credential store cleared");
        Ok(())
    }
}
