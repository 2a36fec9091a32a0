//! Axum HTTP service for scene concatenation.
//!
//! This crate provides:
//! - `POST /concat`, guarded by a shared `X-API-Key` secret
//! - `GET /health` with optional live storage probing
//! - Request ID, logging and security header middleware
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
