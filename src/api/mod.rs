//! JSON HTTP API.
//!
//! Routes live under [`routes`]; [`server`] wires them into an axum router
//! with CORS, request tracing and a body size limit.

pub mod routes;
pub mod server;

pub use server::{build_router, start_server, AppState};
