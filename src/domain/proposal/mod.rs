//! Proposal module - the shared trade record and its approvals.
//!
//! - `participant` - roster of approvers and their identifiers
//! - `aggregate` - the proposal document and its wire encoding
//! - `view` - counts and readiness derived from a snapshot
//! - `errors` - proposal operation failures

mod aggregate;
mod errors;
mod participant;
mod view;

pub use aggregate::{
    Approval, Proposal, APPROVALS_FIELD, CREATED_AT_FIELD, INBOUND_FIELD, OUTBOUND_FIELD,
};
pub use errors::ProposalError;
pub use participant::{ParticipantId, ParticipantRoster, DEFAULT_PARTICIPANTS};
pub use view::ProposalView;
