//! Domain layer - value objects and the proposal aggregate.
//!
//! Nothing in here performs I/O; snapshots come in as JSON values and
//! derived views come out.

pub mod foundation;
pub mod proposal;
