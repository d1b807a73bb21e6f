//! The persisted access/refresh token pair.

use serde::{Deserialize, Serialize};

/// The current session credential pair.
///
/// Both fields absent is the logged-out state. This struct is also the
/// persisted JSON layout, so field names are part of the stored format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Short-lived token authorizing individual requests.
    pub access_token: Option<String>,
    /// Longer-lived token used solely to mint a new access token.
    pub refresh_token: Option<String>,
}

impl Credential {
    /// Creates a credential pair.
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token,
        }
    }

    /// Whether this represents the logged-out state.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }

    /// Returns the pair rotated to a new access token.
    ///
    /// An omitted refresh token retains the previous one, matching the
    /// refresh endpoint contract where the rotated refresh token is
    /// optional in the response.
    pub fn rotated(&self, access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: refresh_token.or_else(|| self.refresh_token.clone()),
        }
    }
}
