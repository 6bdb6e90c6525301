//! Auth token cache
//!
//! Keeps the signed-in session's credentials in the local store so
//! background sync can authenticate without the UI.

use crate::database::{Repository, StoredAuthToken, CURRENT_TOKEN_ID};
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Service for the cached session token
#[derive(Clone, Debug)]
pub struct AuthTokenService {
    repo: Repository,
}

impl AuthTokenService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Cache a session token, replacing any previous one with the same id
    pub async fn store_token(&self, token: &StoredAuthToken) -> Result<()> {
        self.repo.put_auth_token(token).await?;
        tracing::info!("Auth token stored for user {}", token.user_id);
        Ok(())
    }

    /// The cached session token, if any
    pub async fn current_token(&self) -> Option<StoredAuthToken> {
        match self.repo.get_auth_token(CURRENT_TOKEN_ID).await {
            Ok(token) => token,
            Err(e) => {
                tracing::error!("Failed to read cached auth token: {}", e);
                None
            }
        }
    }

    /// The cached token unless it has expired at `now`
    pub async fn valid_token(&self, now: DateTime<Utc>) -> Option<StoredAuthToken> {
        let token = self.current_token().await?;
        if token.is_expired(now) {
            tracing::warn!("Cached auth token expired at {}", token.expires_at);
            return None;
        }
        Some(token)
    }

    /// Forget the cached token (sign-out)
    pub async fn clear(&self) -> Result<()> {
        self.repo.delete_auth_token(CURRENT_TOKEN_ID).await?;
        tracing::info!("Auth token cleared");
        Ok(())
    }
}
