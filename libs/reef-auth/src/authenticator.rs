//! Token-to-principal resolution.

use std::collections::HashMap;

use async_trait::async_trait;
use reef_security::Principal;

use crate::config::{AuthConfig, AuthNMode, IdentityConfig};
use crate::error::AuthNError;

/// Resolves a bearer token into the requester it identifies.
///
/// ```ignore
/// let principal = authenticator.authenticate("xyz").await?;
/// ```
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate a bearer token (without the `Bearer ` prefix).
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the token is not recognized
    /// - `ServiceUnavailable` / `Internal` for backend failures
    async fn authenticate(&self, bearer_token: &str) -> Result<Principal, AuthNError>;
}

/// Configuration-backed authenticator.
///
/// - `accept_all`: any non-empty token maps to the default identity
/// - `static_tokens`: specific tokens map to specific identities
#[derive(Debug, Clone)]
pub struct StaticTokenAuthenticator {
    mode: AuthNMode,
    default_identity: IdentityConfig,
    token_map: HashMap<String, IdentityConfig>,
}

impl StaticTokenAuthenticator {
    #[must_use]
    pub fn from_config(cfg: &AuthConfig) -> Self {
        let token_map = cfg
            .tokens
            .iter()
            .map(|m| (m.token.clone(), m.identity.clone()))
            .collect();

        Self {
            mode: cfg.mode,
            default_identity: cfg.default_identity.clone(),
            token_map,
        }
    }

    #[must_use]
    pub fn token_count(&self) -> usize {
        self.token_map.len()
    }

    fn identity_for(&self, bearer_token: &str) -> Option<&IdentityConfig> {
        if bearer_token.is_empty() {
            return None;
        }
        match self.mode {
            AuthNMode::AcceptAll => Some(&self.default_identity),
            AuthNMode::StaticTokens => self.token_map.get(bearer_token),
        }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, bearer_token: &str) -> Result<Principal, AuthNError> {
        let identity = self
            .identity_for(bearer_token)
            .ok_or_else(|| AuthNError::Unauthorized("unknown token".to_owned()))?;

        Ok(Principal::builder()
            .subject_id(identity.subject_id)
            .username(&identity.username)
            .role(identity.role.clone())
            .bearer_token(bearer_token.to_owned())
            .build())
    }
}
