//! HTTP adapter for the shared trade proposal.

mod dto;
mod handlers;
mod render;
mod routes;

pub use dto::{
    ApprovalResponse, BoardResponse, CreateProposalRequest, ErrorResponse, ParticipantsResponse,
    ProposalResponse, SetApprovalRequest,
};
pub use handlers::ProposalHandlers;
pub use render::{escape_html, render_board};
pub use routes::proposal_routes;
