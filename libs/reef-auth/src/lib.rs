#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Bearer-token authentication for ReefGuard.
//!
//! Resolves the `Authorization: Bearer ...` header into a
//! [`Principal`](reef_security::Principal) request extension. Requests
//! without a recognized token are anonymous; guards decide what happens
//! next.

pub mod authenticator;
pub mod config;
pub mod error;
pub mod middleware;

pub use authenticator::{Authenticator, StaticTokenAuthenticator};
pub use config::{AuthConfig, AuthNMode, IdentityConfig, TokenMapping};
pub use error::AuthNError;
pub use middleware::{AuthState, authn_middleware};
