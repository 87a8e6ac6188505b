pub mod dto;
pub mod error;
pub(crate) mod handlers;
pub mod routes;
