//! # Banking Panel Gateway
//! HTTP API: staff provisioning endpoint, sessions, admin and staff dashboards.

pub mod error;
pub mod extract;
pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
