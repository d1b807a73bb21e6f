//! # courtside-client
//!
//! Facade over the Courtside client connection layer. Wires the three
//! resilience components from one [`ClientConfig`]:
//!
//! - the durable [`CredentialStore`] (single source of truth for
//!   session validity),
//! - the [`RequestGateway`] with single-flight token refresh,
//! - the reconnecting realtime [`ConnectionManager`].
//!
//! The gateway and the channel share the store but never call each
//! other.

use std::sync::Arc;

pub use courtside_core::config::ClientConfig;
pub use courtside_core::error::{ClientError, ErrorKind};
pub use courtside_core::result::ClientResult;
pub use courtside_credentials::{
    Credential, CredentialStore, FileCredentialBackend, MemoryCredentialBackend,
};
pub use courtside_gateway::{RequestDescriptor, RequestGateway};
pub use courtside_realtime::{
    ConnectionManager, ConnectionState, Event, OutboundFrame, Subscription, TOPIC_CONNECTED,
    TOPIC_DISCONNECTED, TOPIC_RECONNECT_EXHAUSTED,
};

/// The assembled connection layer for one application session.
#[derive(Debug)]
pub struct CourtsideClient {
    credentials: Arc<CredentialStore>,
    gateway: RequestGateway,
    realtime: ConnectionManager,
}

impl CourtsideClient {
    /// Builds the layer from configuration, hydrating the credential
    /// store from its durable file.
    pub async fn open(config: ClientConfig) -> ClientResult<Self> {
        let backend = Arc::new(FileCredentialBackend::new(&config.credentials.storage_path));
        let credentials = Arc::new(CredentialStore::open(backend).await?);
        Self::with_store(config, credentials)
    }

    /// Builds the layer over an existing store. Used by tests and by
    /// hosts that manage credential persistence themselves.
    pub fn with_store(
        config: ClientConfig,
        credentials: Arc<CredentialStore>,
    ) -> ClientResult<Self> {
        let gateway = RequestGateway::new(&config.api, Arc::clone(&credentials))?;
        let realtime = ConnectionManager::new(config.realtime, Arc::clone(&credentials));
        Ok(Self {
            credentials,
            gateway,
            realtime,
        })
    }

    /// The shared credential store.
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// The request gateway.
    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    /// The realtime channel manager.
    pub fn realtime(&self) -> &ConnectionManager {
        &self.realtime
    }
}
