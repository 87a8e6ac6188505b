//! Axum extractor, guard layer and flash-message middleware

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    extract::{FromRequestParts, OriginalUri, Request},
    http::{Extensions, HeaderValue, StatusCode, Uri, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use reef_errors::Problem;
use reef_security::Principal;
use tower::{Layer, Service};

use crate::access::{Access, DEFAULT_LOGIN_URL};
use crate::error::AccessError;
use crate::guard::Guard;
use crate::messages::FlashMessages;

/// Response header carrying the flash messages recorded for a request.
pub const FLASH_MESSAGES_HEADER: &str = "x-flash-messages";

/// Login page for redirects, installed as a request extension by the
/// authentication middleware.
#[derive(Debug, Clone)]
pub struct LoginUrl(pub Arc<str>);

impl Default for LoginUrl {
    fn default() -> Self {
        Self(Arc::from(DEFAULT_LOGIN_URL))
    }
}

impl Access {
    /// Assemble the guard view of a request from its extensions.
    ///
    /// Returns `None` when no [`Principal`] was installed, i.e. the
    /// authentication middleware did not run.
    #[must_use]
    pub fn from_extensions(extensions: &Extensions, uri: &Uri) -> Option<Self> {
        let principal = extensions.get::<Principal>()?.clone();
        let messages = extensions
            .get::<FlashMessages>()
            .cloned()
            .unwrap_or_default();
        let login_url = extensions.get::<LoginUrl>().cloned().unwrap_or_default();

        // Nested routers strip their prefix; redirect back to the full path.
        let uri = extensions.get::<OriginalUri>().map_or(uri, |original| &original.0);
        let path = uri
            .path_and_query()
            .map_or_else(|| uri.path(), |pq| pq.as_str());

        Some(Self::new(principal, Arc::new(messages), path).with_login_url(login_url.0))
    }
}

fn middleware_missing() -> Problem {
    Problem::internal("Principal not found - authentication middleware not configured")
}

impl<S> FromRequestParts<S> for Access
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_extensions(&parts.extensions, &parts.uri).ok_or_else(middleware_missing)
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        match self {
            Self::PermissionDenied { message } => Problem::forbidden(message.clone())
                .with_messages(vec![message])
                .into_response(),
            Self::LoginRequired { location } => match HeaderValue::try_from(location) {
                Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
                Err(e) => {
                    tracing::error!(error = %e, "Login redirect is not a valid header value");
                    Problem::internal("invalid login redirect").into_response()
                }
            },
        }
    }
}

/// Layer that evaluates a [`Guard`] before the wrapped handler runs.
///
/// # Example
/// ```ignore
/// router = router
///     .route("/reefs/", post(create_reef))
///     .route_layer(GuardLayer::new(admin_required()));
/// ```
#[derive(Clone)]
pub struct GuardLayer {
    guard: Arc<dyn Guard>,
}

impl GuardLayer {
    #[must_use]
    pub fn new(guard: impl Guard + 'static) -> Self {
        Self {
            guard: Arc::new(guard),
        }
    }

    #[must_use]
    pub fn from_shared(guard: Arc<dyn Guard>) -> Self {
        Self { guard }
    }
}

impl<S> Layer<S> for GuardLayer {
    type Service = GuardService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GuardService {
            inner,
            guard: self.guard.clone(),
        }
    }
}

/// Service produced by [`GuardLayer`].
#[derive(Clone)]
pub struct GuardService<S> {
    inner: S,
    guard: Arc<dyn Guard>,
}

impl<S> Service<Request<Body>> for GuardService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let guard = self.guard.clone();
        let not_ready_inner = self.inner.clone();
        let mut ready_inner = std::mem::replace(&mut self.inner, not_ready_inner);

        Box::pin(async move {
            let Some(access) = Access::from_extensions(request.extensions(), request.uri()) else {
                return Ok(middleware_missing().into_response());
            };

            if let Err(err) = guard.check(&access) {
                return Ok(err.into_response());
            }
            ready_inner.call(request).await
        })
    }
}

/// Install a per-request [`FlashMessages`] store and expose whatever was
/// recorded through the [`FLASH_MESSAGES_HEADER`] response header.
pub async fn flash_messages_middleware(mut request: Request, next: Next) -> Response {
    let messages = FlashMessages::new();
    request.extensions_mut().insert(messages.clone());

    let mut response = next.run(request).await;

    let recorded = messages.drain();
    if recorded.is_empty() {
        return response;
    }
    match serde_json::to_string(&recorded)
        .ok()
        .and_then(|json| HeaderValue::try_from(json).ok())
    {
        Some(value) => {
            response.headers_mut().insert(FLASH_MESSAGES_HEADER, value);
        }
        None => tracing::warn!(count = recorded.len(), "Dropping unencodable flash messages"),
    }
    response
}
