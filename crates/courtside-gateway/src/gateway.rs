//! The authenticated request gateway.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use courtside_core::config::api::ApiConfig;
use courtside_core::error::{ClientError, ErrorKind};
use courtside_core::result::ClientResult;
use courtside_credentials::CredentialStore;

use crate::descriptor::RequestDescriptor;
use crate::refresh::RefreshCoordinator;

/// Wraps every outbound request so it carries a valid access token, and
/// recovers transparently from its expiry exactly once per call.
///
/// A 401 triggers the single-flight refresh flow; any other status is
/// passed through untouched. The gateway shares the [`CredentialStore`]
/// with the realtime channel but never talks to the channel directly.
#[derive(Debug)]
pub struct RequestGateway {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<CredentialStore>,
    refresh: RefreshCoordinator,
}

impl RequestGateway {
    /// Builds a gateway from configuration and the shared store.
    pub fn new(config: &ApiConfig, credentials: Arc<CredentialStore>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ClientError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build HTTP client",
                    e,
                )
            })?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let refresh_url = format!("{base_url}{}", config.refresh_path);
        let refresh =
            RefreshCoordinator::new(http.clone(), refresh_url, Arc::clone(&credentials));

        Ok(Self {
            http,
            base_url,
            credentials,
            refresh,
        })
    }

    /// Sends a request, refreshing the session and replaying once on a
    /// 401. Returns the parsed JSON body (`null` for empty bodies).
    pub async fn send(&self, request: RequestDescriptor) -> ClientResult<serde_json::Value> {
        let token = self.credentials.access_token();
        let response = self.dispatch(&request, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::into_body(response).await;
        }

        debug!(path = %request.path, "Request unauthorized, entering refresh flow");
        let fresh_token = self.refresh.refreshed_access_token().await?;

        let replayed = self.dispatch(&request, Some(&fresh_token)).await?;
        if replayed.status() == StatusCode::UNAUTHORIZED {
            // Still rejected with a just-minted token: the session is
            // dead. Never a second refresh for this call.
            warn!(path = %request.path, "Replay rejected after refresh, session invalidated");
            if let Err(e) = self.credentials.clear().await {
                warn!(error = %e, "Failed to clear credential store");
            }
            return Err(ClientError::auth_expired(
                "request rejected again after token refresh",
            ));
        }

        Self::into_body(replayed).await
    }

    /// GET returning a deserialized body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send_typed(RequestDescriptor::get(path)).await
    }

    /// POST returning a deserialized body.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> ClientResult<T> {
        self.send_typed(RequestDescriptor::post(path, body)).await
    }

    /// PUT returning a deserialized body.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> ClientResult<T> {
        self.send_typed(RequestDescriptor::put(path, body)).await
    }

    /// PATCH returning a deserialized body.
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> ClientResult<T> {
        self.send_typed(RequestDescriptor::patch(path, body)).await
    }

    /// DELETE returning a deserialized body.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send_typed(RequestDescriptor::delete(path)).await
    }

    async fn send_typed<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> ClientResult<T> {
        let body = self.send(request).await?;
        serde_json::from_value(body)
            .map_err(|e| ClientError::with_source(ErrorKind::Serialization, "Unexpected response shape", e))
    }

    /// Issues one attempt of the described request.
    async fn dispatch(
        &self,
        request: &RequestDescriptor,
        token: Option<&str>,
    ) -> ClientResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        builder.send().await.map_err(|e| {
            ClientError::with_source(
                ErrorKind::Network,
                format!("Request to {} failed: {e}", request.path),
                e,
            )
        })
    }

    /// Classifies a received response: 2xx parses to JSON, anything
    /// else becomes an upstream error carrying the status.
    async fn into_body(response: reqwest::Response) -> ClientResult<serde_json::Value> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            ClientError::with_source(ErrorKind::Network, "Failed to read response body", e)
        })?;

        if status.is_success() {
            if bytes.is_empty() {
                return Ok(serde_json::Value::Null);
            }
            return serde_json::from_slice(&bytes).map_err(|e| {
                ClientError::with_source(ErrorKind::Serialization, "Malformed response body", e)
            });
        }

        Err(ClientError::upstream(
            status.as_u16(),
            upstream_message(status, &bytes),
        ))
    }
}

/// Extracts the backend's `message` field when present, falling back to
/// the status line.
fn upstream_message(status: StatusCode, bytes: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(bytes)
        .ok()
        .and_then(|body| {
            body.get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("request failed with status {status}"))
}
