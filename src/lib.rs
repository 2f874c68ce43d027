//! Trade Approvals - a shared trade proposal with real-time multi-party approval.
//!
//! One proposal lives in a shared document store. Every participant's client
//! subscribes to it, toggles its own approval flag, and sees the approval
//! count and readiness recomputed from each pushed snapshot.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
