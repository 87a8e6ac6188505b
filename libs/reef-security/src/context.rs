use secrecy::SecretString;
use uuid::Uuid;

use crate::constants::{ANONYMOUS_SUBJECT_ID, ANONYMOUS_USERNAME};
use crate::role::Role;

/// `Principal` is the requester as seen by the access-control layer.
///
/// Built by the authentication middleware for every request and passed
/// through the request lifecycle. Guards only read it.
///
/// Anonymous principals carry no role; every authenticated principal has
/// exactly one.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Principal {
    /// Subject ID of the authenticated user.
    subject_id: Uuid,
    /// Human-readable login name, if known.
    username: Option<String>,
    /// Role of the user. `None` means the request is anonymous.
    role: Option<Role>,
    /// Original bearer token. Never serialized/persisted.
    #[serde(skip)]
    bearer_token: Option<SecretString>,
}

impl Principal {
    /// Create a new authenticated `Principal` builder
    #[must_use]
    pub fn builder() -> PrincipalBuilder {
        PrincipalBuilder::default()
    }

    /// Create an anonymous `Principal` with no subject and no role
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            subject_id: ANONYMOUS_SUBJECT_ID,
            username: None,
            role: None,
            bearer_token: None,
        }
    }

    #[must_use]
    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    /// Login name, or `"anonymous"` for anonymous principals without one.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(ANONYMOUS_USERNAME)
    }

    /// Role of the authenticated user, `None` when anonymous.
    #[must_use]
    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.role.is_some()
    }

    #[must_use]
    pub fn bearer_token(&self) -> Option<&SecretString> {
        self.bearer_token.as_ref()
    }
}

#[derive(Default)]
pub struct PrincipalBuilder {
    subject_id: Option<Uuid>,
    username: Option<String>,
    role: Option<Role>,
    bearer_token: Option<SecretString>,
}

impl PrincipalBuilder {
    #[must_use]
    pub fn subject_id(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    #[must_use]
    pub fn username(mut self, username: &str) -> Self {
        self.username = Some(username.to_owned());
        self
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<SecretString>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Build an authenticated principal. The role defaults to `member`.
    #[must_use]
    pub fn build(self) -> Principal {
        Principal {
            subject_id: self.subject_id.unwrap_or_else(Uuid::new_v4),
            username: self.username,
            role: Some(self.role.unwrap_or(Role::MEMBER)),
            bearer_token: self.bearer_token,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_principal_builder_full() {
        let subject_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap();

        let principal = Principal::builder()
            .subject_id(subject_id)
            .username("marina")
            .role(Role::RESEARCHER)
            .bearer_token("test-token-123".to_owned())
            .build();

        assert!(principal.is_authenticated());
        assert_eq!(principal.subject_id(), subject_id);
        assert_eq!(principal.username(), "marina");
        assert_eq!(principal.role(), Some(&Role::RESEARCHER));
        assert_eq!(
            principal.bearer_token().map(ExposeSecret::expose_secret),
            Some("test-token-123"),
        );
    }

    #[test]
    fn test_principal_builder_defaults_to_member() {
        let principal = Principal::builder().build();

        assert!(principal.is_authenticated());
        assert_eq!(principal.role(), Some(&Role::MEMBER));
        assert_ne!(principal.subject_id(), Uuid::nil());
    }

    #[test]
    fn test_principal_anonymous() {
        let principal = Principal::anonymous();

        assert!(!principal.is_authenticated());
        assert!(principal.role().is_none());
        assert_eq!(principal.subject_id(), Uuid::nil());
        assert_eq!(principal.username(), "anonymous");
        assert!(principal.bearer_token().is_none());
    }

    #[test]
    fn test_principal_bearer_token_not_serialized() {
        let principal = Principal::builder()
            .role(Role::ADMIN)
            .bearer_token("secret-token".to_owned())
            .build();

        let serialized = serde_json::to_string(&principal).unwrap();
        assert!(!serialized.contains("secret-token"));
        assert!(!serialized.contains("bearer_token"));

        let back: Principal = serde_json::from_str(&serialized).unwrap();
        assert_eq!(back.subject_id(), principal.subject_id());
        assert_eq!(back.role(), Some(&Role::ADMIN));
        assert!(back.bearer_token().is_none());
    }
}
