//! Adapters - Implementations of ports and delivery surfaces.
//!
//! - `storage` - in-memory and Redis document stores
//! - `http` - board page and JSON API
//! - `websocket` - live board feed

pub mod http;
pub mod storage;
pub mod websocket;
