//! HTTP routes for proposal endpoints.

use axum::{
    routing::{get, put},
    Router,
};

use super::handlers::{
    board_page, create_proposal, get_board, list_participants, set_approval, ProposalHandlers,
};

/// Creates the proposal router with the board page and JSON API.
pub fn proposal_routes(handlers: ProposalHandlers) -> Router {
    Router::new()
        .route("/", get(board_page))
        .route("/api/proposal", get(get_board).post(create_proposal))
        .route("/api/proposal/approvals/:participant", put(set_approval))
        .route("/api/participants", get(list_participants))
        .with_state(handlers)
}
