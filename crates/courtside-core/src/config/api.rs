//! Request gateway configuration.

use serde::{Deserialize, Serialize};

/// HTTP request gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL, e.g. `https://api.courtside.app`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Path of the credential refresh endpoint.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    15
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_user_agent() -> String {
    format!("courtside-client/{}", env!("CARGO_PKG_VERSION"))
}
