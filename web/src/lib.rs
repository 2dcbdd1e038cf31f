//! Axum surface for the Gatherly coordination engine.
//!
//! This crate is the imperative shell around [`gatherly_core`]: it
//! parses HTTP requests, resolves bearer credentials, dispatches into
//! the engine, and maps domain errors onto HTTP statuses. The
//! WebSocket endpoint bridges hub subscriptions to connected clients.
//!
//! # Request Flow
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Extract identity** from the `Authorization: Bearer` header
//! 3. **Dispatch** into the lifecycle or RSVP component
//! 4. **Map result** to a JSON response (or an [`AppError`])
//!
//! Broadcasts reach WebSocket clients without any HTTP involvement:
//! the engine publishes to the hub, and each connection forwards its
//! subscription to its socket.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use routes::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
