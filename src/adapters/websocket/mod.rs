//! WebSocket adapter for the live trade board.
//!
//! ```text
//! DocumentStore ──subscribe──▶ LiveBoard (watch channel)
//!                                   │
//!                     ┌─────────────┼─────────────┐
//!                     ▼             ▼             ▼
//!                 client-a      client-b      client-c
//! ```
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod handler;
pub mod messages;

pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use messages::{
    BoardMessage, ClientId, ClientMessage, ConnectedMessage, ErrorMessage, PongMessage,
    ServerMessage,
};
