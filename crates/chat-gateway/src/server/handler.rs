//! WebSocket handler
//!
//! Authenticates the upgrade request, then runs one reader, one writer and one
//! idle watchdog per connection. Hub cleanup runs however the tasks end.

use crate::connection::Connection;
use crate::handlers::HandlerError;
use crate::protocol::{ClientEvent, CloseCode, ServerEvent};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chat_common::{AppError, ErrorResponse};
use chat_core::{AuthError, UserIdentity};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// How long the writer gets to flush and send the close frame after cleanup
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Smallest ping or idle check period
const MIN_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Default, Deserialize)]
pub struct GatewayQuery {
    pub token: Option<String>,
}

/// WebSocket gateway handler.
///
/// The token comes from `?token=` or an `Authorization: Bearer` header and is
/// verified before upgrading; a rejected request never reaches the hub.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(query): Query<GatewayQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let token = query
        .token
        .or_else(|| bearer_token(&headers))
        .unwrap_or_default();

    match state.authenticate(&token).await {
        Ok(identity) => ws
            .on_upgrade(move |socket| handle_socket(state, socket, identity))
            .into_response(),
        Err(e) => {
            tracing::debug!(error = %e, "Gateway handshake rejected");
            reject(e)
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn reject(error: AuthError) -> Response {
    let error = AppError::Auth(error);
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = serde_json::json!({ "error": ErrorResponse::from(&error) });
    (status, Json(body)).into_response()
}

/// Handle an upgraded, authenticated WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket, identity: UserIdentity) {
    let config = state.config();
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(config.outbound_buffer.max(1));
    let connection = Connection::new(identity, tx);
    let connection_id = connection.id();

    let (mut ws_sink, mut ws_stream) = socket.split();

    if let Err(e) = state.hub().connect(connection.clone()) {
        tracing::error!(connection_id = %connection_id, error = %e, "Failed to register connection");
        let _ = ws_sink.send(close_message(e.to_close_code())).await;
        return;
    }

    tracing::info!(
        connection_id = %connection_id,
        user_id = %connection.user_id(),
        "WebSocket connection established"
    );

    // Reader: decode frames and hand them to the hub, one at a time
    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            connection_recv.touch();
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(e) = handle_text_message(&state_recv, &connection_recv, &text).await
                    {
                        tracing::debug!(
                            connection_id = %connection_id,
                            error = %e,
                            "Closing connection due to error"
                        );
                        return Some(e.to_close_code());
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Binary frames not supported");
                    return Some(CloseCode::DecodeError);
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Pong replies are sent by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(connection_id = %connection_id, "Client closed connection");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "WebSocket error");
                    return Some(CloseCode::UnknownError);
                }
            }
        }
        None
    });

    // Writer: drain the outbound queue, ping on every heartbeat, and send the
    // close frame when asked
    let (close_tx, mut close_rx) = oneshot::channel::<CloseCode>();
    let heartbeat = config.heartbeat_interval();
    let mut send_task = tokio::spawn(async move {
        let mut ping = interval(heartbeat.max(MIN_TICK));
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ping.tick().await;

        loop {
            tokio::select! {
                code = &mut close_rx => {
                    if let Ok(code) = code {
                        let _ = ws_sink.send(close_message(code)).await;
                    }
                    break;
                }
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    match event.to_json() {
                        Ok(json) => {
                            if ws_sink.send(Message::Text(json)).await.is_err() {
                                tracing::warn!(
                                    connection_id = %connection_id,
                                    "Failed to send message to WebSocket"
                                );
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                connection_id = %connection_id,
                                event = event.name(),
                                error = %e,
                                "Failed to encode event"
                            );
                        }
                    }
                }
                _ = ping.tick() => {
                    if ws_sink.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }
            }
        }

        let _ = ws_sink.close().await;
    });

    // Watchdog: close connections that stay silent for the idle timeout
    let idle_timeout = config.idle_timeout();
    let connection_idle = connection.clone();
    let mut idle_task = tokio::spawn(async move {
        let mut check = interval((idle_timeout / 4).max(MIN_TICK));
        check.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            check.tick().await;
            let idle = connection_idle.idle_for();
            if idle >= idle_timeout {
                tracing::warn!(
                    connection_id = %connection_id,
                    idle_ms = idle.as_millis(),
                    "Connection timed out"
                );
                return CloseCode::SessionTimeout;
            }
        }
    });

    // Wait for any task to complete
    let (close_code, recv_done, send_done) = tokio::select! {
        result = &mut recv_task => match result {
            Ok(code) => (code, true, false),
            Err(e) => (Some(HandlerError::Internal(e.to_string()).to_close_code()), true, false),
        },
        result = &mut idle_task => (result.ok(), false, false),
        _ = &mut send_task => {
            tracing::debug!(connection_id = %connection_id, "Send task ended");
            (None, false, true)
        }
    };

    idle_task.abort();
    // The reader may be mid-event on another worker; cleanup must not race it
    if !recv_done {
        stop_task(&mut recv_task).await;
    }

    cleanup_connection(&state, &connection);
    drop(connection);

    if !send_done {
        match close_code {
            Some(code) => {
                let _ = close_tx.send(code);
            }
            None => drop(close_tx),
        }
        if tokio::time::timeout(CLOSE_GRACE, &mut send_task).await.is_err() {
            send_task.abort();
        }
    }
}

/// Decode a text frame and dispatch it to the hub
async fn handle_text_message(
    state: &GatewayState,
    connection: &Arc<Connection>,
    text: &str,
) -> Result<(), HandlerError> {
    let event = ClientEvent::from_json(text)?;
    state.hub().handle_event(connection, event).await;
    Ok(())
}

/// Abort `task` and wait until it has actually stopped
async fn stop_task<T>(task: &mut JoinHandle<T>) {
    task.abort();
    let _ = task.await;
}

/// Remove the connection from the hub on disconnect
fn cleanup_connection(state: &GatewayState, connection: &Arc<Connection>) {
    tracing::info!(
        connection_id = %connection.id(),
        age_ms = connection.age().as_millis(),
        dropped = connection.dropped_events(),
        "Cleaning up connection"
    );

    // Already logged by the hub on failure
    let _ = state.hub().disconnect(connection.id());
}

fn close_message(code: CloseCode) -> Message {
    Message::Close(Some(CloseFrame {
        code: code.as_u16(),
        reason: code.description().into(),
    }))
}
