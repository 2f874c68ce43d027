//! WebSocket upgrade handler for the live trade board.
//!
//! Each connection follows the process-wide [`LiveBoard`]:
//! 1. Upgrade to WebSocket
//! 2. Send `connected`, then the current board
//! 3. Send a fresh board after every change; answer pings and state requests
//! 4. Close when the client leaves or the board is detached

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};

use crate::adapters::http::proposal::BoardResponse;
use crate::application::{BoardState, LiveBoard};
use crate::domain::foundation::{ErrorCode, Timestamp};
use crate::domain::proposal::ParticipantRoster;

use super::messages::{
    BoardMessage, ClientId, ClientMessage, ConnectedMessage, ErrorMessage, PongMessage,
    ServerMessage,
};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub board: Arc<LiveBoard>,
    pub roster: ParticipantRoster,
}

impl WebSocketState {
    pub fn new(board: Arc<LiveBoard>, roster: ParticipantRoster) -> Self {
        Self { board, roster }
    }
}

/// Handle WebSocket upgrade requests for the live board.
///
/// Route: `GET /api/proposal/live`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WebSocketState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection until either side closes it.
async fn handle_socket(socket: WebSocket, state: WebSocketState) {
    let (mut sender, mut receiver) = socket.split();
    let client_id = ClientId::new();
    let mut board_rx = state.board.watch();

    let connected = ServerMessage::Connected(ConnectedMessage {
        client_id: client_id.to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
    });
    if let Err(e) = send_message(&mut sender, &connected).await {
        tracing::debug!("Failed to send connected message: {}", e);
        return;
    }

    let initial = board_message(&board_rx.borrow_and_update(), &state.roster);
    if let Err(e) = send_message(&mut sender, &initial).await {
        tracing::debug!(client_id = %client_id, "Failed to send initial board: {}", e);
        return;
    }
    tracing::debug!(client_id = %client_id, "Live board client connected");

    loop {
        tokio::select! {
            changed = board_rx.changed() => {
                if changed.is_err() {
                    tracing::debug!(client_id = %client_id, "Board detached, closing connection");
                    break;
                }
                let msg = board_message(&board_rx.borrow_and_update(), &state.roster);
                if let Err(e) = send_message(&mut sender, &msg).await {
                    tracing::debug!(client_id = %client_id, "Send error, closing connection: {}", e);
                    break;
                }
            }
            incoming = receiver.next() => {
                let reply = match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Ping) => {
                                tracing::trace!(client_id = %client_id, "Received ping");
                                Some(ServerMessage::Pong(PongMessage {
                                    timestamp: Timestamp::now().to_rfc3339(),
                                }))
                            }
                            Ok(ClientMessage::RequestState) => {
                                Some(board_message(&state.board.current(), &state.roster))
                            }
                            Err(e) => Some(ServerMessage::Error(ErrorMessage {
                                code: ErrorCode::InvalidFormat.to_string(),
                                message: format!("Unrecognized message: {}", e),
                                timestamp: Timestamp::now().to_rfc3339(),
                            })),
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::warn!(client_id = %client_id, "Received unsupported binary message");
                        None
                    }
                    // Protocol-level ping/pong is answered by axum
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => None,
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(client_id = %client_id, "Client closed connection");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::debug!(client_id = %client_id, "Receive error: {}", e);
                        break;
                    }
                };

                if let Some(reply) = reply {
                    if let Err(e) = send_message(&mut sender, &reply).await {
                        tracing::debug!(client_id = %client_id, "Send error, closing connection: {}", e);
                        break;
                    }
                }
            }
        }
    }
}

fn board_message(state: &BoardState, roster: &ParticipantRoster) -> ServerMessage {
    ServerMessage::Board(BoardMessage {
        board: BoardResponse::from_state(state, roster),
        timestamp: Timestamp::now().to_rfc3339(),
    })
}

/// Send a JSON message over the WebSocket.
async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}

/// Create axum router for the live board endpoint.
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/api/proposal/live", get(ws_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_message_reflects_state() {
        let roster = ParticipantRoster::default();
        let msg = board_message(&BoardState::Connecting, &roster);

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "board");
        assert_eq!(json["board"]["status"], "connecting");
        assert_eq!(json["board"]["total"], 5);
    }
}
