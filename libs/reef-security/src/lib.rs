#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod constants;
pub mod context;
pub mod role;

pub use context::{Principal, PrincipalBuilder};
pub use role::Role;
