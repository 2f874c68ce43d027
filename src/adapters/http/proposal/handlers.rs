//! HTTP handlers for proposal endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};

use crate::application::{LiveBoard, ProposalSynchronizer};
use crate::domain::foundation::ErrorCode;
use crate::domain::proposal::ProposalError;

use super::dto::{
    BoardResponse, CreateProposalRequest, ErrorResponse, ParticipantsResponse, ProposalResponse,
    SetApprovalRequest,
};
use super::render::render_board;

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ProposalHandlers {
    synchronizer: Arc<ProposalSynchronizer>,
    board: Arc<LiveBoard>,
}

impl ProposalHandlers {
    pub fn new(synchronizer: Arc<ProposalSynchronizer>, board: Arc<LiveBoard>) -> Self {
        Self {
            synchronizer,
            board,
        }
    }

    pub fn synchronizer(&self) -> &Arc<ProposalSynchronizer> {
        &self.synchronizer
    }

    pub fn board(&self) -> &Arc<LiveBoard> {
        &self.board
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET / - Render the trade board
pub async fn board_page(State(handlers): State<ProposalHandlers>) -> Html<String> {
    Html(render_board(&handlers.board.current()))
}

/// GET /api/proposal - Current board state
pub async fn get_board(State(handlers): State<ProposalHandlers>) -> Response {
    let response =
        BoardResponse::from_state(&handlers.board.current(), handlers.synchronizer.roster());
    (StatusCode::OK, Json(response)).into_response()
}

/// POST /api/proposal - Create (or replace) the shared proposal
pub async fn create_proposal(
    State(handlers): State<ProposalHandlers>,
    payload: Result<Json<CreateProposalRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return handle_rejection(rejection),
    };

    match handlers
        .synchronizer
        .create_proposal(&req.we_send, &req.we_receive)
        .await
    {
        Ok(proposal) => {
            let response = ProposalResponse::from(&proposal);
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => handle_proposal_error(e),
    }
}

/// PUT /api/proposal/approvals/:participant - Set one participant's approval
pub async fn set_approval(
    State(handlers): State<ProposalHandlers>,
    Path(participant): Path<String>,
    payload: Result<Json<SetApprovalRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return handle_rejection(rejection),
    };
    let participant = match handlers.synchronizer.participant(&participant) {
        Ok(participant) => participant.clone(),
        Err(e) => return handle_proposal_error(e),
    };

    // The board may lag behind a create that just landed; ask the store.
    match handlers.synchronizer.fetch_view().await {
        Ok(view) if view.has_proposal() => {}
        Ok(_) => {
            return (StatusCode::CONFLICT, Json(ErrorResponse::no_proposal())).into_response();
        }
        Err(e) => return handle_proposal_error(e),
    }

    match handlers
        .synchronizer
        .set_approval(&participant, req.approved)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_proposal_error(e),
    }
}

/// GET /api/participants - Roster in display order
pub async fn list_participants(State(handlers): State<ProposalHandlers>) -> Response {
    let response = ParticipantsResponse::from(handlers.synchronizer.roster());
    (StatusCode::OK, Json(response)).into_response()
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_proposal_error(error: ProposalError) -> Response {
    let status = match &error {
        ProposalError::Validation { .. } => StatusCode::BAD_REQUEST,
        ProposalError::UnknownParticipant(_) => StatusCode::NOT_FOUND,
        ProposalError::StoreWrite(_)
        | ProposalError::StoreRead(_)
        | ProposalError::StoreSubscription(_) => StatusCode::BAD_GATEWAY,
    };
    if status.is_server_error() {
        tracing::error!("Proposal request failed: {}", error);
    }
    (status, Json(ErrorResponse::from(&error))).into_response()
}

/// Unreadable request bodies keep axum's status but get the standard error body.
fn handle_rejection(rejection: JsonRejection) -> Response {
    let status = rejection.status();
    let response = ErrorResponse::new(ErrorCode::InvalidFormat, rejection.body_text());
    (status, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_to_400() {
        let response = handle_proposal_error(ProposalError::validation("weSend", "empty"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_participant_maps_to_404() {
        let response = handle_proposal_error(ProposalError::unknown_participant("Mallory"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_write_failure_maps_to_502() {
        let response = handle_proposal_error(ProposalError::store_write("down"));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn store_read_failure_maps_to_502() {
        let response = handle_proposal_error(ProposalError::store_read("down"));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn subscription_failure_maps_to_502() {
        let response = handle_proposal_error(ProposalError::store_subscription("closed"));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
