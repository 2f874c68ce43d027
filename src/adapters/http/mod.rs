//! HTTP adapters - REST API, board page and live feed wiring.

pub mod proposal;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::adapters::websocket::{websocket_router, WebSocketState};

pub use proposal::{proposal_routes, ProposalHandlers};

/// GET /health - Liveness probe
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Creates the full application router.
///
/// CORS is only enabled when `cors_origins` is non-empty.
pub fn app_router(
    handlers: ProposalHandlers,
    request_timeout: Duration,
    cors_origins: Vec<HeaderValue>,
) -> Router {
    let ws_state = WebSocketState::new(
        handlers.board().clone(),
        handlers.synchronizer().roster().clone(),
    );

    let router = Router::new()
        .route("/health", get(health))
        .merge(proposal_routes(handlers))
        .merge(websocket_router().with_state(ws_state))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http());

    if cors_origins.is_empty() {
        return router;
    }

    router.layer(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(cors_origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT])
            .allow_headers([header::CONTENT_TYPE]),
    )
}
