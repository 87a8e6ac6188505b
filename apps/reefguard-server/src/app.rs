//! HTTP application assembly and serving.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderName, Request, Response, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use reef_auth::{AuthState, authn_middleware};
use reef_catalog::{CatalogService, InMemoryCatalogRepository};
use reef_guard::flash_messages_middleware;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;

use crate::config::AppConfig;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the full router: catalog routes wrapped by authentication and the
/// HTTP middleware stack.
pub fn build_router(config: &AppConfig) -> Router {
    let service = Arc::new(CatalogService::new(
        Arc::new(InMemoryCatalogRepository::new()),
        config.catalog.clone(),
    ));
    let auth_state = AuthState::from_config(&config.auth);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // Layers run outermost-last: request id, trace, timeout, body limit,
    // authentication, flash messages, then the route's own guard.
    reef_catalog::router(service)
        .layer(from_fn(flash_messages_middleware))
        .layer(from_fn_with_state(auth_state, authn_middleware))
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_secs),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    let rid = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("n/a");
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        request_id = %rid,
                        status = Empty,
                        latency_ms = Empty,
                    )
                })
                .on_response(
                    |res: &Response<Body>, latency: Duration, span: &tracing::Span| {
                        span.record("status", res.status().as_u16());
                        span.record("latency_ms", latency.as_millis());
                    },
                ),
        )
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

/// Bind and serve until Ctrl-C.
///
/// # Errors
///
/// Bind failures and fatal server errors.
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let router = build_router(config);
    let addr = config.server.bind_addr;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "HTTP server bound");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("HTTP server shutting down gracefully");
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use axum::http::{Method, header};
    use http_body_util::BodyExt;
    use reef_auth::{IdentityConfig, TokenMapping};
    use reef_guard::FLASH_MESSAGES_HEADER;
    use reef_security::Role;
    use tower::ServiceExt;

    use super::*;

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.login_url = "/login/".to_owned();
        config.auth.tokens = vec![TokenMapping {
            token: "dev-admin".to_owned(),
            identity: IdentityConfig {
                username: "ada".to_owned(),
                role: Role::ADMIN,
                ..IdentityConfig::default()
            },
        }];
        config.server.body_limit_bytes = 256;
        config
    }

    fn create_reef(body: String) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/reefs/")
            .header(header::AUTHORIZATION, "Bearer dev-admin")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn request_id_is_generated_and_propagated() {
        let router = build_router(&config());

        let response = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));

        let response = router
            .oneshot(
                Request::get("/health")
                    .header(REQUEST_ID_HEADER, "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");
    }

    #[tokio::test]
    async fn anonymous_write_redirects_to_configured_login() {
        let response = build_router(&config())
            .oneshot(
                Request::post("/reefs/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/login/?next=/reefs/");
    }

    #[tokio::test]
    async fn configured_token_can_write() {
        let response = build_router(&config())
            .oneshot(create_reef(r#"{"name":"Osprey"}"#.to_owned()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().contains_key(FLASH_MESSAGES_HEADER));
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let reef: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(reef["name"], "Osprey");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let description = "x".repeat(1024);
        let body = format!(r#"{{"name":"Osprey","description":"{description}"}}"#);

        let response = build_router(&config())
            .oneshot(create_reef(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
