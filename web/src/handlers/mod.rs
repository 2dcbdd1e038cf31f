//! HTTP and WebSocket handlers.

pub mod events;
pub mod health;
pub mod rsvps;
pub mod websocket;
