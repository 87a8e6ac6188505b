//! Error types for the access-control layer.

use thiserror::Error;

/// Outcome of a failed guard evaluation.
///
/// `PermissionDenied` is terminal for the request and never retried.
/// `LoginRequired` is the redirect-to-login branch for anonymous requests;
/// it is never produced for an authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The authenticated requester lacks the role or ownership required.
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// User-facing message, also recorded as a flash message.
        message: String,
    },

    /// The requester is anonymous and must log in first.
    #[error("login required, redirecting to {location}")]
    LoginRequired {
        /// Login URL including the `next` parameter.
        location: String,
    },
}

impl AccessError {
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    #[must_use]
    pub fn is_login_required(&self) -> bool {
        matches!(self, Self::LoginRequired { .. })
    }
}
