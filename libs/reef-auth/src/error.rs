//! Error types for the authentication layer.

use thiserror::Error;

/// Errors an [`Authenticator`](crate::Authenticator) may report.
#[derive(Debug, Error)]
pub enum AuthNError {
    /// The token is unknown, expired, or malformed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The identity backend cannot be reached right now.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
