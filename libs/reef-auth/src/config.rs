//! Configuration for the bearer-token authenticator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reef_guard::DEFAULT_LOGIN_URL;
use reef_security::Role;

/// Subject of the `accept_all` default identity.
pub const DEFAULT_SUBJECT_ID: Uuid = Uuid::from_u128(1);

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Login page anonymous requesters are redirected to.
    pub login_url: String,

    /// Authentication mode.
    pub mode: AuthNMode,

    /// Identity returned for any token in `accept_all` mode.
    pub default_identity: IdentityConfig,

    /// Static token-to-identity mappings for `static_tokens` mode.
    pub tokens: Vec<TokenMapping>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_owned(),
            mode: AuthNMode::StaticTokens,
            default_identity: IdentityConfig::default(),
            tokens: Vec::new(),
        }
    }
}

/// Authentication mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthNMode {
    /// Accept any non-empty token and return the default identity.
    AcceptAll,
    /// Map specific tokens to specific identities; everything else is
    /// anonymous.
    #[default]
    StaticTokens,
}

/// Identity a token resolves to.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    pub subject_id: Uuid,
    pub username: String,
    /// Free-form role name; unknown roles authenticate but match no guard.
    pub role: Role,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            subject_id: DEFAULT_SUBJECT_ID,
            username: "member".to_owned(),
            role: Role::MEMBER,
        }
    }
}

/// Maps a static token to a specific identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TokenMapping {
    /// The bearer token value to match.
    pub token: String,
    /// The identity to return when this token is presented.
    pub identity: IdentityConfig,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_static_tokens_with_standard_login() {
        let cfg = AuthConfig::default();

        assert_eq!(cfg.mode, AuthNMode::StaticTokens);
        assert_eq!(cfg.login_url, "/accounts/login/");
        assert!(cfg.tokens.is_empty());
        assert_eq!(cfg.default_identity.role, Role::MEMBER);
    }

    #[test]
    fn deserializes_token_mappings() {
        let cfg: AuthConfig = serde_json::from_value(serde_json::json!({
            "mode": "static_tokens",
            "tokens": [{
                "token": "t-admin",
                "identity": {
                    "subject_id": "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa",
                    "username": "ada",
                    "role": "admin"
                }
            }]
        }))
        .unwrap();

        assert_eq!(cfg.tokens.len(), 1);
        assert_eq!(cfg.tokens[0].identity.role, Role::ADMIN);
        assert_eq!(cfg.tokens[0].identity.username, "ada");
    }

    #[test]
    fn rejects_unknown_fields() {
        let result: Result<AuthConfig, _> =
            serde_json::from_value(serde_json::json!({ "loginurl": "/x" }));
        assert!(result.is_err());
    }
}
