//! WebSocket handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS; failed upgrades become a broadcast ERROR notice.
//! - Per-session loop: outbound writer + inbound reader joined by select.
//! - Text frames go to the dispatcher; everything else is lifecycle.

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::app_state::AppState;
use crate::dispatch::Dispatcher;
use crate::realtime::Hub;

/// Frames queued per session before the broadcast path starts dropping.
const OUTBOUND_QUEUE: usize = 1024;

pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let dispatcher = state.dispatcher();
    let ws = ws.on_failed_upgrade({
        let dispatcher = Arc::clone(&dispatcher);
        move |err: axum::Error| {
            tracing::warn!(error = %err, "websocket upgrade failed");
            dispatcher.report_transport_error(&err.to_string());
        }
    });
    let hub = state.hub();
    ws.on_upgrade(move |socket| run_session(hub, dispatcher, socket))
}

async fn run_session(hub: Arc<Hub>, dispatcher: Arc<Dispatcher>, socket: WebSocket) {
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(OUTBOUND_QUEUE);
    let session = hub.register(out_tx.clone());
    tracing::info!(session = %session, "session attached");

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // outbound writer: a queued Close ends the session after any
            // frames enqueued before it have been written
            maybe_out = out_rx.recv() => {
                match maybe_out {
                    Some(Message::Close(frame)) => {
                        let _ = ws_tx.send(Message::Close(frame)).await;
                        break;
                    }
                    Some(m) => {
                        if ws_tx.send(m).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let Ok(msg) = incoming else { break; };

                match msg {
                    Message::Text(raw) => dispatcher.dispatch(session, &raw).await,
                    Message::Ping(payload) => {
                        let _ = out_tx.send(Message::Pong(payload)).await;
                    }
                    Message::Pong(_) => {}
                    Message::Binary(_) => {
                        tracing::debug!(session = %session, "ignoring binary frame");
                    }
                    Message::Close(_) => break,
                }
            }
        }
    }

    dispatcher.session_closed(session);
    tracing::info!(session = %session, "session detached");
}
