use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::{Extension, Router};
use reef_guard::{
    GuardChain, GuardLayer, LoginRequired, ViewGuard, admin_required, researcher_or_admin_required,
};

use crate::api::rest::handlers;
use crate::domain::repo::CatalogRepository;
use crate::domain::service::CatalogService;

/// Build the catalog router.
///
/// Guards sit on individual methods: listing stays public while the
/// matching write on the same path is guarded. Every write starts with
/// [`LoginRequired`] so anonymous callers are redirected before any path or
/// body extraction. Object-level ownership is checked inside the handlers
/// once the object is loaded.
///
/// The router expects a [`reef_security::Principal`] in request extensions,
/// so it must be wrapped by an authentication middleware.
pub fn router<R: CatalogRepository + 'static>(service: Arc<CatalogService<R>>) -> Router {
    Router::new()
        .route("/", get(handlers::home::<R>))
        .route("/health", get(handlers::health))
        .route(
            "/events/",
            get(handlers::list_events::<R>).merge(
                post(handlers::report_event::<R>).route_layer(GuardLayer::new(
                    GuardChain::new()
                        .with(LoginRequired)
                        .with(ViewGuard::default()),
                )),
            ),
        )
        .route(
            "/events/{id}/",
            get(handlers::get_event::<R>).merge(
                patch(handlers::update_event::<R>)
                    .delete(handlers::delete_event::<R>)
                    .route_layer(GuardLayer::new(login_required())),
            ),
        )
        .route(
            "/reefs/",
            get(handlers::list_reefs::<R>).merge(
                post(handlers::create_reef::<R>).route_layer(GuardLayer::new(
                    GuardChain::new().with(LoginRequired).with(admin_required()),
                )),
            ),
        )
        .route(
            "/reefs/{id}/",
            delete(handlers::delete_reef::<R>).route_layer(GuardLayer::new(
                GuardChain::new()
                    .with(LoginRequired)
                    .with(ViewGuard::admin_required()),
            )),
        )
        .route(
            "/articles/",
            get(handlers::list_articles::<R>).merge(
                post(handlers::create_article::<R>).route_layer(GuardLayer::new(
                    GuardChain::new()
                        .with(LoginRequired)
                        .with(researcher_or_admin_required()),
                )),
            ),
        )
        .route(
            "/articles/{id}/",
            patch(handlers::update_article::<R>).route_layer(GuardLayer::new(login_required())),
        )
        .layer(Extension(service))
}

/// Guard for writes whose remaining checks need the loaded object.
fn login_required() -> GuardChain {
    GuardChain::new().with(LoginRequired)
}
