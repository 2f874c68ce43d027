//! HTTP DTOs for proposal endpoints.
//!
//! Field names follow the stored document (`weSend`, `weReceive`) so that
//! browser clients can use one vocabulary for both.

use serde::{Deserialize, Serialize};

use crate::application::BoardState;
use crate::domain::foundation::ErrorCode;
use crate::domain::proposal::{ParticipantRoster, Proposal, ProposalError, ProposalView};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to create (or replace) the shared proposal.
///
/// Missing fields deserialize as empty and are rejected by validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    #[serde(default)]
    pub we_send: String,
    #[serde(default)]
    pub we_receive: String,
}

/// Request to set one participant's approval.
#[derive(Debug, Clone, Deserialize)]
pub struct SetApprovalRequest {
    pub approved: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResponse {
    pub participant: String,
    pub approved: bool,
}

/// The proposal as rendered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub we_send: Option<String>,
    pub we_receive: Option<String>,
    pub approvals: Vec<ApprovalResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&Proposal> for ProposalResponse {
    fn from(proposal: &Proposal) -> Self {
        Self {
            we_send: proposal.description_outbound().map(str::to_string),
            we_receive: proposal.description_inbound().map(str::to_string),
            approvals: proposal
                .approvals()
                .iter()
                .map(|a| ApprovalResponse {
                    participant: a.participant.to_string(),
                    approved: a.approved,
                })
                .collect(),
            created_at: proposal.created_at().map(|t| t.to_rfc3339()),
        }
    }
}

/// Board state as served by `GET /api/proposal` and the live feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    /// `connecting`, `live` or `stale`
    pub status: String,
    pub proposal: Option<ProposalResponse>,
    pub approved_count: usize,
    pub total: usize,
    pub is_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_reason: Option<String>,
}

impl BoardResponse {
    /// Response for a board that has not received a snapshot yet.
    fn empty(status: &str, roster_len: usize) -> Self {
        Self {
            status: status.to_string(),
            proposal: None,
            approved_count: 0,
            total: roster_len,
            is_ready: false,
            stale_reason: None,
        }
    }

    fn from_view(status: &str, view: &ProposalView) -> Self {
        Self {
            status: status.to_string(),
            proposal: view.proposal.as_ref().map(ProposalResponse::from),
            approved_count: view.approved_count,
            total: view.total,
            is_ready: view.is_ready,
            stale_reason: None,
        }
    }

    pub fn from_state(state: &BoardState, roster: &ParticipantRoster) -> Self {
        let mut response = match state.view() {
            Some(view) => Self::from_view(state.status(), view),
            None => Self::empty(state.status(), roster.len()),
        };
        if let BoardState::Stale { reason, .. } = state {
            response.stale_reason = Some(reason.clone());
        }
        response
    }
}

/// Roster in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantsResponse {
    pub participants: Vec<String>,
}

impl From<&ParticipantRoster> for ParticipantsResponse {
    fn from(roster: &ParticipantRoster) -> Self {
        Self {
            participants: roster.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn no_proposal() -> Self {
        Self::new(
            ErrorCode::ProposalNotFound,
            "There is no active trade proposal to approve",
        )
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&ProposalError> for ErrorResponse {
    fn from(error: &ProposalError) -> Self {
        let response = Self::new(error.code(), error.message());
        match error {
            ProposalError::Validation { field, .. } => {
                response.with_details(serde_json::json!({ "field": field }))
            }
            ProposalError::UnknownParticipant(name) => {
                response.with_details(serde_json::json!({ "participant": name }))
            }
            _ => response,
        }
    }
}
