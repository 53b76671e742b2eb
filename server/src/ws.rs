use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use blockverse_shared::protocol::{ClientMsg, ServerMsg};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, OwnedSemaphorePermit, Semaphore};

use crate::auth::{AuthError, Identity, IdentityVerifier};
use crate::relay::RelayCommand;

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub relay_tx: mpsc::Sender<RelayCommand>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub outbox_capacity: usize,
    pub max_message_bytes: usize,
    pub connection_slots: Arc<Semaphore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

/// HTTP handler for WebSocket upgrade. Identity is checked before upgrading.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    State(app_state): State<AppState>,
) -> Response {
    let token = bearer_token(&headers).or_else(|| params.get("token").cloned());
    let identity = match token
        .ok_or(AuthError::MissingToken)
        .and_then(|t| app_state.verifier.verify(&t))
    {
        Ok(identity) => identity,
        Err(e) => {
            tracing::info!("Rejected connection: {}", e);
            return (StatusCode::UNAUTHORIZED, e.to_string()).into_response();
        }
    };

    let Ok(permit) = app_state.connection_slots.clone().try_acquire_owned() else {
        tracing::warn!("Connection limit reached, rejecting {}", identity.user_id);
        return (StatusCode::SERVICE_UNAVAILABLE, "server full").into_response();
    };

    ws.max_message_size(app_state.max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, app_state, identity, permit))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}

async fn handle_socket(
    socket: WebSocket,
    app_state: AppState,
    identity: Identity,
    _permit: OwnedSemaphorePermit,
) {
    let (mut sink, mut stream) = socket.split();

    let (outbox_tx, mut outbox_rx) = mpsc::channel::<ServerMsg>(app_state.outbox_capacity);
    let (resp_tx, resp_rx) = oneshot::channel();
    if app_state
        .relay_tx
        .send(RelayCommand::Connect {
            identity,
            outbox: outbox_tx,
            response: resp_tx,
        })
        .await
        .is_err()
    {
        tracing::error!("Failed to send Connect command");
        return;
    }

    let my_id = match resp_rx.await {
        Ok(id) => id,
        Err(_) => {
            tracing::error!("Failed to receive connection id");
            return;
        }
    };

    loop {
        tokio::select! {
            // Client -> Server
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMsg>(&text) {
                            Ok(client_msg) => {
                                let cmd = RelayCommand::Client { id: my_id, msg: client_msg };
                                if app_state.relay_tx.send(cmd).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::debug!("Connection {} sent unparseable message: {}", my_id, e);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!("Connection {} read error: {}", my_id, e);
                        break;
                    }
                    _ => {} // Ignore ping/pong/binary
                }
            }

            // Server -> Client
            outgoing = outbox_rx.recv() => {
                let Some(msg) = outgoing else { break };
                match serde_json::to_string(&msg) {
                    Ok(json) => {
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::error!("Failed to encode message: {}", e),
                }
            }
        }
    }

    // Cleanup on disconnect
    let _ = app_state
        .relay_tx
        .send(RelayCommand::Disconnect { id: my_id })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        assert_eq!(bearer_token(&headers), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
