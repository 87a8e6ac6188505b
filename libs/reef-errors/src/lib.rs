#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Error response types shared by ReefGuard HTTP surfaces.

pub mod problem;

pub use problem::{PROBLEM_CONTENT_TYPE, Problem};
