//! HTTP API for the admin assistant.
//!
//! ## Endpoints
//!
//! - `GET  /api/health` - Liveness check (public)
//! - `POST /api/admin/ai-agent-chat` - Run one assistant conversation turn
//! - `GET  /api/admin/ai-agent-chat/models` - List routable models
//! - `GET  /api/admin/canvases` - List the caller's canvases
//! - `GET  /api/admin/canvases/:id` - Fetch one canvas
//!
//! Everything under `/api/admin` requires an admin session cookie.

pub mod auth;
mod canvas;
mod chat;
mod error;
mod routes;
pub mod types;

pub use auth::{AuthUser, SessionClaims, SessionKeys};
pub use error::ApiError;
pub use routes::{build_state, router, serve, AppState};
