//! WebSocket live search.
//!
//! Each connection owns one [`SearchController`]. Client messages drive it,
//! and every snapshot it publishes is pushed back as JSON.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use nutrisearch_core::SearchController;

use crate::metrics::{
    WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_MESSAGES_RECEIVED, WS_SNAPSHOTS_SENT,
};
use crate::state::AppState;

/// Message sent by a live search client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The search box text changed.
    Query { text: String },
    /// A barcode was scanned.
    Barcode { code: String },
}

impl ClientMessage {
    fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Query { .. } => "query",
            ClientMessage::Barcode { .. } => "barcode",
        }
    }
}

/// Feed one client message into the controller.
pub fn apply_message(controller: &mut SearchController, message: ClientMessage) {
    WS_MESSAGES_RECEIVED
        .with_label_values(&[message.kind()])
        .inc();
    match message {
        ClientMessage::Query { text } => controller.on_query_changed(&text),
        ClientMessage::Barcode { code } => controller.on_barcode_scanned(&code),
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single live search connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut controller = SearchController::new(state.search(), state.debounce());
    let mut rx = controller.subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("Live search client connected");

    // Push the current snapshot, then every change after it
    let send_task = tokio::spawn(async move {
        loop {
            let snapshot = rx.borrow_and_update().clone();
            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                    WS_SNAPSHOTS_SENT.inc();
                }
                Err(e) => {
                    error!("Failed to serialize search snapshot: {}", e);
                }
            }

            if rx.changed().await.is_err() {
                debug!("Search controller dropped");
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(message) => apply_message(&mut controller, message),
                Err(e) => {
                    WS_MESSAGES_RECEIVED.with_label_values(&["invalid"]).inc();
                    warn!(error = %e, "Ignoring malformed live search message");
                }
            },
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(_) => {
                // Ping/pong is handled by axum; binary frames are ignored
            }
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    // Dropping the controller aborts any in-flight search
    drop(controller);
    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("Live search client disconnected");
}
