//! Session WebSocket handler
//!
//! Each connection runs three tasks:
//! - the reader (this function's loop) parses frames into requests
//! - a single worker runs requests through the [`SessionPipeline`] one at a
//!   time, in arrival order
//! - the writer serializes outgoing events onto the socket

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ConnectInfo, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::{select, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::state::AppState;

use super::messages::{IncomingMessage, MAX_AUDIO_PAYLOAD_SIZE, MessageRoute, OutgoingMessage};
use super::pipeline::SessionPipeline;

/// Outgoing event buffer per session
const CHANNEL_BUFFER_SIZE: usize = 64;

/// Requests waiting behind the one in flight
const REQUEST_QUEUE_SIZE: usize = 16;

/// Maximum WebSocket frame size (16 MB). Larger than the audio field limit
/// so an oversized recording reaches `validate_size` and gets an error event.
pub const MAX_WS_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Maximum WebSocket message size (16 MB)
pub const MAX_WS_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

const _: () = assert!(MAX_WS_MESSAGE_SIZE > MAX_AUDIO_PAYLOAD_SIZE + 64 * 1024);

/// How often the reader checks for an idle connection
const IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(30);

pub const CONNECTED_MESSAGE: &str = "Connected to server";
pub const IDLE_MESSAGE: &str = "Connection closed due to inactivity";

/// Query parameters of the upgrade request
#[derive(Debug, Default, Deserialize)]
pub struct SessionParams {
    /// Token from a previous `status` event
    pub session: Option<String>,
}

/// Session WebSocket handler
///
/// Upgrades the HTTP connection to a WebSocket carrying the audio protocol.
/// A valid `?session=` token keeps the previous session identity.
pub async fn session_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(params): Query<SessionParams>,
) -> Response {
    let resumed = params
        .session
        .as_deref()
        .and_then(|token| state.signer.verify(token).map(|id| (id, token.to_string())));

    let (session_id, token, is_resumed) = match resumed {
        Some((id, token)) => (id, token, true),
        None => {
            if params.session.is_some() {
                debug!(%peer, "Ignoring invalid session token");
            }
            let (id, token) = state.signer.mint();
            (id, token, false)
        }
    };

    info!(%peer, session = %session_id, resumed = is_resumed, "Session WebSocket upgrade requested");

    let span = info_span!("session", id = %session_id, %peer);
    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_session_socket(socket, state, token).instrument(span))
}

/// Drive one connected session until it closes
async fn handle_session_socket(socket: WebSocket, app_state: Arc<AppState>, token: String) {
    info!("Client connected");

    let (mut sender, mut receiver) = socket.split();
    let (message_tx, mut message_rx) = mpsc::channel::<MessageRoute>(CHANNEL_BUFFER_SIZE);
    let (request_tx, request_rx) = mpsc::channel::<IncomingMessage>(REQUEST_QUEUE_SIZE);
    let cancel = CancellationToken::new();

    // Sender task for outgoing messages
    let sender_task = tokio::spawn(
        async move {
            while let Some(route) = message_rx.recv().await {
                let result = match route {
                    MessageRoute::Outgoing(message) => match serde_json::to_string(&message) {
                        Ok(json_str) => sender.send(Message::Text(json_str.into())).await,
                        Err(e) => {
                            error!("Failed to serialize outgoing message: {}", e);
                            continue;
                        }
                    },
                    MessageRoute::Close => {
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                };

                if let Err(e) = result {
                    debug!("Failed to send WebSocket message: {}", e);
                    break;
                }
            }
        }
        .in_current_span(),
    );

    let pipeline = SessionPipeline::new(
        app_state.backends.clone(),
        app_state.config.languages.clone(),
    );
    let worker_task = tokio::spawn(
        run_worker(pipeline, request_rx, message_tx.clone(), cancel.clone()).in_current_span(),
    );

    let _ = message_tx
        .send(MessageRoute::Outgoing(OutgoingMessage::status(
            CONNECTED_MESSAGE,
            Some(token),
        )))
        .await;

    let idle_timeout = Duration::from_secs(app_state.config.idle_timeout_seconds);
    let idle_check_interval = IDLE_CHECK_INTERVAL.min(idle_timeout);
    let mut last_activity = std::time::Instant::now();

    loop {
        select! {
            msg_result = receiver.next() => {
                last_activity = std::time::Instant::now();

                match msg_result {
                    Some(Ok(msg)) => {
                        if !process_message(msg, &request_tx, &message_tx).await {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!("Session WebSocket error: {}", e);
                        break;
                    }
                    None => {
                        info!("Session WebSocket closed by client");
                        break;
                    }
                }
            }
            _ = tokio::time::sleep(idle_check_interval) => {
                if last_activity.elapsed() > idle_timeout {
                    warn!(
                        "Session idle for {}s, closing connection",
                        last_activity.elapsed().as_secs()
                    );
                    let _ = message_tx
                        .send(MessageRoute::Outgoing(OutgoingMessage::error(IDLE_MESSAGE)))
                        .await;
                    let _ = message_tx.send(MessageRoute::Close).await;
                    break;
                }
                debug!("Session idle check - still active");
            }
        }
    }

    // Queued requests are dropped; the one in flight finishes.
    cancel.cancel();
    drop(request_tx);
    if let Err(e) = worker_task.await {
        error!("Session worker failed: {}", e);
    }

    drop(message_tx);
    if let Err(e) = sender_task.await {
        error!("Session writer failed: {}", e);
    }

    info!("Client disconnected");
}

/// Process requests one at a time until the queue closes or the session is
/// cancelled
async fn run_worker(
    pipeline: SessionPipeline,
    mut requests: mpsc::Receiver<IncomingMessage>,
    message_tx: mpsc::Sender<MessageRoute>,
    cancel: CancellationToken,
) {
    while let Some(request) = requests.recv().await {
        if cancel.is_cancelled() {
            debug!("Session closed, discarding queued {}", request.event_name());
            break;
        }

        debug!("Processing {}", request.event_name());
        pipeline.handle(request, &message_tx).await;
    }
}

/// Process an incoming WebSocket frame. Returns `false` when the session
/// should end.
async fn process_message(
    msg: Message,
    request_tx: &mpsc::Sender<IncomingMessage>,
    message_tx: &mpsc::Sender<MessageRoute>,
) -> bool {
    match msg {
        Message::Text(text) => {
            debug!("Received text message: {} bytes", text.len());

            let incoming: IncomingMessage = match serde_json::from_str(text.as_str()) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!("Failed to parse session message: {}", e);
                    let _ = message_tx
                        .send(MessageRoute::Outgoing(OutgoingMessage::error(format!(
                            "Invalid message format: {e}"
                        ))))
                        .await;
                    return true;
                }
            };

            if let Err(e) = incoming.validate_size() {
                warn!("Message validation failed: {:?}", e);
                let _ = message_tx
                    .send(MessageRoute::Outgoing(OutgoingMessage::error(e.to_string())))
                    .await;
                return true;
            }

            if request_tx.send(incoming).await.is_err() {
                error!("Session worker stopped, closing connection");
                return false;
            }
            true
        }
        Message::Binary(data) => {
            debug!("Ignoring binary frame: {} bytes", data.len());
            true
        }
        Message::Ping(_) => {
            debug!("Received ping");
            true
        }
        Message::Pong(_) => {
            debug!("Received pong");
            true
        }
        Message::Close(_) => {
            info!("Session WebSocket close received");
            false
        }
    }
}
