//! Single-flight credential refresh coordination.
//!
//! All requests that observe a 401 funnel through
//! [`RefreshCoordinator::refreshed_access_token`]. The first caller wins
//! the flight and issues the actual refresh call; everyone else parks on
//! a oneshot receiver and is settled with the winner's outcome. The
//! in-flight flag is owned by the coordinator instance, never a global,
//! and is released on every exit path.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{oneshot, Mutex};
use tracing::{info, warn};

use courtside_core::error::ClientError;
use courtside_core::result::ClientResult;
use courtside_credentials::CredentialStore;

/// Body sent to the refresh endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Body returned by the refresh endpoint. The rotated refresh token is
/// optional; when absent the previous one stays valid.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    refresh_token: Option<String>,
}

/// Mutual-exclusion state over the refresh flight.
#[derive(Debug, Default)]
struct RefreshQueue {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<ClientResult<String>>>,
}

/// Coordinates at most one refresh network call at a time.
#[derive(Debug)]
pub(crate) struct RefreshCoordinator {
    http: reqwest::Client,
    refresh_url: String,
    credentials: Arc<CredentialStore>,
    queue: Mutex<RefreshQueue>,
}

impl RefreshCoordinator {
    pub(crate) fn new(
        http: reqwest::Client,
        refresh_url: String,
        credentials: Arc<CredentialStore>,
    ) -> Self {
        Self {
            http,
            refresh_url,
            credentials,
            queue: Mutex::new(RefreshQueue::default()),
        }
    }

    /// Returns a freshly-minted access token, joining an in-flight
    /// refresh when one exists.
    ///
    /// On success the rotated pair is already durably stored by the time
    /// this returns, for the winner and every joined waiter alike. On
    /// failure the store has been cleared (forced logout) and all
    /// callers receive `AuthExpired`.
    pub(crate) async fn refreshed_access_token(&self) -> ClientResult<String> {
        let waiter = {
            let mut queue = self.queue.lock().await;
            if queue.in_flight {
                let (tx, rx) = oneshot::channel();
                queue.waiters.push(tx);
                Some(rx)
            } else {
                queue.in_flight = true;
                None
            }
        };

        if let Some(rx) = waiter {
            return match rx.await {
                Ok(outcome) => outcome,
                // The winner was dropped mid-flight (task cancelled).
                Err(_) => Err(ClientError::auth_expired("refresh was abandoned")),
            };
        }

        let outcome = self.execute_refresh().await;

        let waiters = {
            let mut queue = self.queue.lock().await;
            queue.in_flight = false;
            std::mem::take(&mut queue.waiters)
        };
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }

        outcome
    }

    /// Issues the refresh call and rotates the stored pair.
    ///
    /// Any failure here is a dead session: the store is cleared so the
    /// whole application converges on the logged-out state.
    async fn execute_refresh(&self) -> ClientResult<String> {
        let Some(refresh_token) = self.credentials.refresh_token() else {
            self.force_logout().await;
            return Err(ClientError::auth_expired("no refresh token available"));
        };

        let response = self
            .http
            .post(&self.refresh_url)
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Refresh call failed to reach the backend");
                self.force_logout().await;
                return Err(ClientError::with_source(
                    courtside_core::error::ErrorKind::AuthExpired,
                    "refresh request failed",
                    e,
                ));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Refresh rejected by the backend");
            self.force_logout().await;
            return Err(ClientError::auth_expired(format!(
                "refresh rejected with status {status}"
            )));
        }

        let rotated: RefreshResponse = match response.json().await {
            Ok(rotated) => rotated,
            Err(e) => {
                self.force_logout().await;
                return Err(ClientError::with_source(
                    courtside_core::error::ErrorKind::AuthExpired,
                    "malformed refresh response",
                    e,
                ));
            }
        };

        // Durably store the rotated pair before any waiter is woken:
        // replays must observe the new token.
        self.credentials
            .set(rotated.access_token.clone(), rotated.refresh_token)
            .await?;

        info!("Access token refreshed");
        Ok(rotated.access_token)
    }

    async fn force_logout(&self) {
        if let Err(e) = self.credentials.clear().await {
            warn!(error = %e, "Failed to clear credential store after refresh failure");
        }
    }
}
