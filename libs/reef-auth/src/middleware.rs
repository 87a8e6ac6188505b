//! Authentication middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use reef_errors::Problem;
use reef_guard::LoginUrl;
use reef_security::Principal;

use crate::authenticator::{Authenticator, StaticTokenAuthenticator};
use crate::config::AuthConfig;
use crate::error::AuthNError;

/// Shared state for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<dyn Authenticator>,
    pub login_url: LoginUrl,
}

impl AuthState {
    #[must_use]
    pub fn new(authenticator: Arc<dyn Authenticator>, login_url: impl Into<Arc<str>>) -> Self {
        Self {
            authenticator,
            login_url: LoginUrl(login_url.into()),
        }
    }

    /// State backed by a [`StaticTokenAuthenticator`].
    #[must_use]
    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self::new(
            Arc::new(StaticTokenAuthenticator::from_config(cfg)),
            cfg.login_url.as_str(),
        )
    }
}

/// Resolve the requester and install it as a [`Principal`] extension.
///
/// For each request:
/// 1. Inserts the configured [`LoginUrl`]
/// 2. CORS preflight and requests without a bearer token become anonymous
/// 3. Otherwise calls the [`Authenticator`]; an unrecognized token is
///    treated as anonymous so guards can redirect to login
/// 4. Backend failures short-circuit with a problem response
pub async fn authn_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    req.extensions_mut().insert(state.login_url.clone());

    if is_preflight_request(req.method(), req.headers()) {
        req.extensions_mut().insert(Principal::anonymous());
        return next.run(req).await;
    }

    let principal = match extract_bearer_token(req.headers()) {
        None => Principal::anonymous(),
        Some(token) => match state.authenticator.authenticate(token).await {
            Ok(principal) => principal,
            Err(AuthNError::Unauthorized(msg)) => {
                tracing::debug!("AuthN rejected, continuing as anonymous: {msg}");
                Principal::anonymous()
            }
            Err(err) => return authn_error_to_response(&err),
        },
    };

    tracing::trace!(
        subject_id = %principal.subject_id(),
        authenticated = principal.is_authenticated(),
        "Resolved principal"
    );
    req.extensions_mut().insert(principal);
    next.run(req).await
}

/// Convert a backend [`AuthNError`] to an RFC-9457 Problem Details response.
fn authn_error_to_response(err: &AuthNError) -> Response {
    let (status, title, detail) = match err {
        AuthNError::Unauthorized(_) => (
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Authentication failed",
        ),
        AuthNError::ServiceUnavailable(msg) => {
            tracing::error!("AuthN service unavailable: {msg}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service Unavailable",
                "Authentication service unavailable",
            )
        }
        AuthNError::Internal(msg) => {
            tracing::error!("AuthN internal error: {msg}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "Internal authentication error",
            )
        }
    };
    Problem::new(status, title, detail).into_response()
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
        .filter(|token| !token.is_empty())
}

/// Check if this is a CORS preflight request
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}
