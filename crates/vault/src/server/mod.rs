//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Inject shared application state (`AppState`) into handlers.
//! - Map codec outcomes to the JSON types in `common::protocol`.

pub mod handlers;
pub mod router;
pub mod state;
