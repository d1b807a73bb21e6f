//! Client configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod api;
pub mod credentials;
pub mod realtime;

use serde::{Deserialize, Serialize};

use self::api::ApiConfig;
use self::credentials::CredentialConfig;
use self::realtime::RealtimeConfig;

use crate::error::ClientError;

/// Root client configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request gateway settings.
    pub api: ApiConfig,
    /// Realtime channel settings.
    pub realtime: RealtimeConfig,
    /// Credential storage settings.
    #[serde(default)]
    pub credentials: CredentialConfig,
}

impl ClientConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific
    /// overlay and environment variables prefixed with `COURTSIDE__`.
    pub fn load(env: &str) -> Result<Self, ClientError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("COURTSIDE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ClientError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| ClientError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
