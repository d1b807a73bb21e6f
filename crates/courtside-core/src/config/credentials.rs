//! Credential storage configuration.

use serde::{Deserialize, Serialize};

/// Durable credential storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Path of the JSON file holding the persisted token pair.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> String {
    "courtside-credentials.json".to_string()
}
