//! # socialhub-api
//!
//! HTTP surface of the real-time layer. Serves the authenticated WebSocket
//! upgrade at `/ws` and a small JSON API under `/api` for health and
//! presence lookups.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
