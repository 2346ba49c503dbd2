//! Credential collaborator interface
//!
//! Acquiring tokens is the token manager's job; the client only asks for the
//! current `Authorization` header and forces a refresh after a 401/403.

use async_trait::async_trait;

/// Supplies the `Authorization` header for requests.
///
/// Implementations own their cached credential and must serialize refreshes
/// against concurrent readers themselves.
#[async_trait]
pub trait TokenManager: Send + Sync {
    /// Current header value, e.g. `Bearer <token>`; `refresh` forces renewal
    async fn get_header(&self, refresh: bool) -> anyhow::Result<String>;
}

/// Token manager around a pre-issued bearer token
#[derive(Debug, Clone)]
pub struct StaticTokenManager {
    access_token: String,
}

impl StaticTokenManager {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl TokenManager for StaticTokenManager {
    /// A pre-issued token cannot be renewed, so a forced refresh fails
    async fn get_header(&self, refresh: bool) -> anyhow::Result<String> {
        if refresh {
            anyhow::bail!("static access token cannot be renewed");
        }
        Ok(format!("Bearer {}", self.access_token))
    }
}

/// Strip the auth scheme from a header value
pub fn token_from_header(header: &str) -> &str {
    header
        .split_once(' ')
        .map(|(_, token)| token)
        .unwrap_or(header)
}
