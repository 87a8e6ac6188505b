#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Access control for ReefGuard handlers.
//!
//! - [`policy`] - Role Policy: [`permits`] and the immutable [`RoleSet`]
//! - [`guard`] - [`Guard`] trait, [`LoginRequired`], function guard [`RoleGuard`] and its presets
//! - [`view`] - [`ViewGuard`], the configured guard for resource views
//! - [`ownership`] - [`OwnershipGuard`]: staff or recorded owner
//! - [`chain`] - [`GuardChain`]: ordered guards, first failure wins
//! - [`messages`] - per-request flash messages
//! - [`axum_ext`] - extractor, layer and middleware for axum routers
//!
//! ## Usage
//!
//! ```ignore
//! use reef_guard::{GuardLayer, researcher_or_admin_required};
//!
//! let router = Router::new()
//!     .route("/articles/", post(create_article))
//!     .route_layer(GuardLayer::new(researcher_or_admin_required()));
//! ```

pub mod access;
pub mod axum_ext;
pub mod chain;
pub mod error;
pub mod guard;
pub mod messages;
pub mod ownership;
pub mod policy;
pub mod view;

pub use access::{Access, DEFAULT_LOGIN_URL, login_redirect};
pub use axum_ext::{
    FLASH_MESSAGES_HEADER, GuardLayer, GuardService, LoginUrl, flash_messages_middleware,
};
pub use chain::GuardChain;
pub use error::AccessError;
pub use guard::{
    Guard, LoginRequired, RoleGuard, admin_required, researcher_or_admin_required,
};
pub use messages::{FlashMessage, FlashMessages, MessageLevel, MessageSink};
pub use ownership::{DEFAULT_OWNER_FIELD, ObjectLookup, OwnedResource, OwnershipGuard};
pub use policy::{RoleSet, denial_message, permits};
pub use view::ViewGuard;
