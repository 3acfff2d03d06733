/**
 * WebSocket Endpoints
 *
 * Two WebSocket endpoints share the broadcast hub:
 *
 * - `GET /ws/chat` - interactive chat; inbound text is re-broadcast to
 *   every connected client as `"{username}: {text}"`
 * - `GET /ws/notifications` - listen-only; clients receive server
 *   notifications (e.g. completed background computations)
 *
 * # Authentication
 *
 * The access token is passed as a `?token=` query parameter because
 * browsers cannot set headers on WebSocket handshakes. The token must
 * decode, be of access kind, and belong to an existing user; otherwise
 * the socket is closed with policy-violation code 1008 right after the
 * upgrade.
 */
use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use crate::auth::tokens::{verify_token_of_kind, TokenKind};
use crate::auth::users::get_user_by_username;
use crate::realtime::broadcast::Broadcaster;
use crate::server::state::AppState;

/// Query parameters of the WebSocket handshake.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// Why a WebSocket connection was refused.
#[derive(Debug, PartialEq, Eq)]
pub enum WsAuthError {
    InvalidToken,
    UserNotFound,
    DatabaseUnavailable,
}

impl WsAuthError {
    fn reason(&self) -> &'static str {
        match self {
            WsAuthError::InvalidToken => "invalid or expired token",
            WsAuthError::UserNotFound => "user not found",
            WsAuthError::DatabaseUnavailable => "service unavailable",
        }
    }
}

/// Validate a handshake token: access kind, valid signature, known user.
pub async fn authenticate_ws(state: &AppState, token: &str) -> Result<String, WsAuthError> {
    let claims = verify_token_of_kind(&state.config.jwt, token, TokenKind::Access)
        .ok_or(WsAuthError::InvalidToken)?;

    let pool = state.db_pool.as_ref().ok_or(WsAuthError::DatabaseUnavailable)?;

    match get_user_by_username(pool, &claims.sub).await {
        Ok(Some(user)) => Ok(user.username),
        Ok(None) => Err(WsAuthError::UserNotFound),
        Err(e) => {
            tracing::error!("user lookup failed during ws auth: {e}");
            Err(WsAuthError::DatabaseUnavailable)
        }
    }
}

/// Chat endpoint: clients send and receive broadcast messages.
pub async fn chat(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let auth = authenticate_ws(&state, &query.token).await;
    let hub = state.broadcaster.clone();

    ws.on_upgrade(move |socket| async move {
        match auth {
            Ok(username) => run_chat(socket, hub, username).await,
            Err(e) => close_policy_violation(socket, e.reason()).await,
        }
    })
}

/// Notification endpoint: clients only listen.
pub async fn notifications(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let auth = authenticate_ws(&state, &query.token).await;
    let hub = state.broadcaster.clone();

    ws.on_upgrade(move |socket| async move {
        match auth {
            Ok(username) => run_notifications(socket, hub, username).await,
            Err(e) => close_policy_violation(socket, e.reason()).await,
        }
    })
}

/// Close the socket with code 1008 after a failed authentication.
async fn close_policy_violation(mut socket: WebSocket, reason: &'static str) {
    tracing::warn!("closing websocket: {reason}");
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: close_code::POLICY,
            reason: reason.into(),
        })))
        .await;
}

/// Pump loop for the chat endpoint.
async fn run_chat(socket: WebSocket, hub: Broadcaster, username: String) {
    let mut rx = hub.subscribe();
    let (mut sender, mut receiver) = socket.split();

    hub.broadcast(format!("{username} joined the chat"));

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    hub.broadcast(format!("{username}: {}", text.as_str()));
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {} // binary/ping/pong frames are ignored
                Some(Err(e)) => {
                    tracing::debug!("websocket receive error for {username}: {e}");
                    break;
                }
            },
            outgoing = rx.recv() => match outgoing {
                Ok(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("{username} lagged behind, {missed} frames dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    hub.broadcast(format!("{username} left the chat"));
    tracing::info!("chat connection closed for {username}");
}

/// Pump loop for the notification endpoint. Inbound frames keep the
/// connection alive but their content is ignored.
async fn run_notifications(socket: WebSocket, hub: Broadcaster, username: String) {
    let mut rx = hub.subscribe();
    let (mut sender, mut receiver) = socket.split();

    hub.broadcast(format!("{username} connected to notifications"));

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("websocket receive error for {username}: {e}");
                    break;
                }
            },
            outgoing = rx.recv() => match outgoing {
                Ok(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("{username} lagged behind, {missed} frames dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    hub.broadcast(format!("{username} disconnected from notifications"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, JwtConfig};
    use crate::server::state::AppState;

    fn state_without_db() -> AppState {
        let config = Config {
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                access_ttl_minutes: 30,
                refresh_ttl_days: 7,
            },
            storage: None,
            port: 0,
        };
        AppState::new(config.into_shared(), None, None)
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let state = state_without_db();
        let result = authenticate_ws(&state, "bad_token").await;
        assert_eq!(result.unwrap_err(), WsAuthError::InvalidToken);
    }

    #[tokio::test]
    async fn test_refresh_token_is_rejected() {
        let state = state_without_db();
        let pair =
            crate::auth::tokens::create_token_pair(&state.config.jwt, "alice").unwrap();
        let result = authenticate_ws(&state, &pair.refresh_token).await;
        assert_eq!(result.unwrap_err(), WsAuthError::InvalidToken);
    }

    #[tokio::test]
    async fn test_valid_token_without_db_is_unavailable() {
        let state = state_without_db();
        let pair =
            crate::auth::tokens::create_token_pair(&state.config.jwt, "alice").unwrap();
        let result = authenticate_ws(&state, &pair.access_token).await;
        assert_eq!(result.unwrap_err(), WsAuthError::DatabaseUnavailable);
    }
}
