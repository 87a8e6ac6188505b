#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Reef catalog: reefs, reported events and research articles.
//!
//! Reads are public. Writes are guarded by role ([`reef_guard::RoleGuard`],
//! [`reef_guard::ViewGuard`]) and, for existing events and articles, by
//! ownership ([`reef_guard::OwnershipGuard`]).

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;

pub use api::rest::routes::router;
pub use config::CatalogConfig;
pub use domain::error::DomainError;
pub use domain::models::{
    Article, ArticlePatch, Event, EventPatch, EventWithReef, HomeSummary, NewArticle, NewEvent,
    NewReef, Reef, Severity,
};
pub use domain::repo::CatalogRepository;
pub use domain::service::CatalogService;
pub use infra::storage::InMemoryCatalogRepository;
