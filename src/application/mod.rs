//! Application layer - coordinates the domain with the document store.
//!
//! - `ProposalSynchronizer` turns commands into store writes and snapshots
//!   into proposal views
//! - `LiveBoard` keeps this process's latest view for the HTTP and
//!   WebSocket surfaces

mod board;
mod synchronizer;

pub use board::{BoardState, LiveBoard};
pub use synchronizer::{ProposalListener, ProposalSynchronizer};
