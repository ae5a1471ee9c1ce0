use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::app_state::AppState;
use crate::auth::AuthService;
use crate::observers::ChannelObserver;
use courtside_core::StoreEvent;
use courtside_types::{ApiError, ClientMessage, ServerMessage};

pub mod connection;
pub mod handlers;
pub mod rate_limiter;

use connection::ConnectionId;
pub use connection::ConnectionManager;
use handlers::MessageHandler;
use rate_limiter::RateLimiter;

pub async fn handle_connection(
    websocket: WebSocket,
    connection_manager: Arc<ConnectionManager>,
    state: Arc<AppState>,
    auth_service: Arc<AuthService>,
) {
    let connection_id = ConnectionId::new();
    info!("New WebSocket connection: {}", connection_id);

    let (mut ws_sender, mut ws_receiver) = websocket.split();
    let message_receiver = connection_manager.register(connection_id).await;

    let message_handler = MessageHandler::new(
        connection_id,
        connection_manager.clone(),
        state,
        auth_service,
    );
    if let Err(e) = message_handler.send_initial_state().await {
        warn!("Failed to send initial state to {}: {}", connection_id, e);
    }

    let incoming_handler = {
        let message_handler = message_handler.clone();
        let mut rate_limiter = RateLimiter::new();

        async move {
            while let Some(result) = ws_receiver.next().await {
                match result {
                    Ok(msg) => {
                        if let Err(e) =
                            handle_message(msg, &mut rate_limiter, &message_handler, connection_id)
                                .await
                        {
                            error!("Error handling message for {}: {}", connection_id, e);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("WebSocket error for {}: {}", connection_id, e);
                        break;
                    }
                }
            }
        }
    };

    let outgoing_handler = async move {
        let mut receiver = message_receiver;

        while let Some(message) = receiver.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize message: {:?}", e);
                    continue;
                }
            };

            if let Err(e) = ws_sender.send(Message::text(json)).await {
                warn!("Failed to send message to {}: {:?}", connection_id, e);
                break;
            }
        }
    };

    tokio::select! {
        _ = incoming_handler => {},
        _ = outgoing_handler => {},
    }

    let account = connection_manager
        .unregister(connection_id)
        .await
        .and_then(|socket| socket.account_id);
    info!(
        "Connection {} disconnected (account {})",
        connection_id,
        account.as_deref().unwrap_or("none")
    );
}

async fn handle_message(
    msg: Message,
    rate_limiter: &mut RateLimiter,
    message_handler: &MessageHandler,
    connection_id: ConnectionId,
) -> Result<(), String> {
    if msg.is_close() {
        return Err("Connection closed by client".to_string());
    }
    if !msg.is_text() {
        return Ok(());
    }

    if !rate_limiter.check_rate_limit() {
        warn!("Rate limit exceeded for connection {}", connection_id);
        return message_handler
            .reply(ServerMessage::error(ApiError::RateLimitExceeded))
            .await;
    }

    let text = msg.to_str().map_err(|_| "Invalid text message".to_string())?;
    let client_message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            debug!("Unparseable message from {}: {}", connection_id, e);
            return message_handler
                .reply(ServerMessage::error(ApiError::InvalidRequest {
                    reason: format!("Invalid JSON message: {}", e),
                }))
                .await;
        }
    };

    message_handler
        .handle_message(client_message)
        .await
        .map_err(|e| format!("Message handling error: {}", e))
}

/// Forward every store change to all open sockets.
pub async fn start_store_fanout(
    state: Arc<AppState>,
    connection_manager: Arc<ConnectionManager>,
) -> JoinHandle<()> {
    let (observer, mut events) = ChannelObserver::new();
    state.subscribe(Box::new(observer)).await;

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            connection_manager.broadcast(store_event_message(event)).await;
        }
        debug!("Store fan-out stopped");
    })
}

fn store_event_message(event: StoreEvent) -> ServerMessage {
    match event {
        StoreEvent::RosterChanged { players } => ServerMessage::RosterUpdate { players },
        StoreEvent::HistoryChanged { games } => ServerMessage::HistoryUpdate { games },
        StoreEvent::SessionChanged { session } => ServerMessage::SessionUpdate { session },
    }
}
