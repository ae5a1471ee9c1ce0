use std::sync::Arc;
use tracing::{info, warn};

use crate::app_state::{AppState, IncrementOutcome};
use crate::auth::AuthService;
use crate::websocket::connection::{ConnectionId, ConnectionManager};
use courtside_core::UndoOutcome;
use courtside_types::{ApiError, ClientMessage, PlayerId, ServerMessage, StatKind};

/// Applies one connection's commands to the shared state. Store changes are
/// pushed to every socket by the fan-out task, so handlers only answer with
/// messages meant for the sender.
#[derive(Clone)]
pub struct MessageHandler {
    connection_id: ConnectionId,
    connection_manager: Arc<ConnectionManager>,
    state: Arc<AppState>,
    auth_service: Arc<AuthService>,
}

impl MessageHandler {
    pub fn new(
        connection_id: ConnectionId,
        connection_manager: Arc<ConnectionManager>,
        state: Arc<AppState>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            connection_id,
            connection_manager,
            state,
            auth_service,
        }
    }

    pub async fn handle_message(&self, message: ClientMessage) -> Result<(), String> {
        self.connection_manager
            .touch(self.connection_id)
            .await;

        match message {
            ClientMessage::Authenticate { token } => self.handle_authenticate(token).await,
            ClientMessage::StartSession { player_id, opponent } => {
                self.handle_start_session(player_id, opponent).await
            }
            ClientMessage::Increment { stat, confirmed } => {
                self.handle_increment(stat, confirmed).await
            }
            ClientMessage::Decrement { stat } => {
                let result = self.state.decrement(stat).await.map(|_| ());
                self.reply_on_error(result).await
            }
            ClientMessage::Undo => self.handle_undo().await,
            ClientMessage::SetTimerRunning { running } => {
                let result = self.state.set_timer_running(running).await;
                self.reply_on_error(result).await
            }
            ClientMessage::EndSession => self.handle_end_session().await,
            ClientMessage::ResetSession { confirmed } => {
                let result = self.state.reset_session(confirmed).await;
                self.reply_on_error(result).await
            }
            ClientMessage::Heartbeat => self.reply(ServerMessage::HeartbeatAck).await,
        }
    }

    /// Pushes the current roster, history and session to this connection.
    pub async fn send_initial_state(&self) -> Result<(), String> {
        self.reply(ServerMessage::RosterUpdate {
            players: self.state.players().await,
        })
        .await?;
        self.reply(ServerMessage::HistoryUpdate {
            games: self.state.history().await,
        })
        .await?;
        self.reply(ServerMessage::SessionUpdate {
            session: self.state.session().await,
        })
        .await
    }

    async fn handle_authenticate(&self, token: String) -> Result<(), String> {
        info!("Authenticating connection {}", self.connection_id);

        match self.auth_service.validate_token(&token) {
            Ok(account) => {
                let account_id = account.id.clone();
                self.state.sign_in(account).await;
                self.connection_manager
                    .set_account(self.connection_id, Some(account_id.clone()))
                    .await;
                self.reply(ServerMessage::AuthenticationSuccess { account_id })
                    .await
            }
            Err(e) => {
                warn!(
                    "Authentication failed for connection {}: {}",
                    self.connection_id, e
                );
                self.reply(ServerMessage::AuthenticationFailed {
                    reason: e.to_string(),
                })
                .await
            }
        }
    }

    async fn handle_start_session(
        &self,
        player_id: PlayerId,
        opponent: Option<String>,
    ) -> Result<(), String> {
        let result = self.state.start_session(&player_id, opponent).await.map(|_| ());
        self.reply_on_error(result).await
    }

    async fn handle_increment(&self, stat: StatKind, confirmed: bool) -> Result<(), String> {
        match self.state.increment(stat, confirmed).await {
            Ok(IncrementOutcome::Applied { .. }) => Ok(()),
            Ok(IncrementOutcome::ConfirmationRequired) => {
                let player_id = self.state.session().await.player_id.unwrap_or_default();
                self.reply(ServerMessage::FoulOutConfirmationRequired { player_id })
                    .await
            }
            Err(e) => self.send_error(e).await,
        }
    }

    async fn handle_undo(&self) -> Result<(), String> {
        match self.state.undo().await {
            UndoOutcome::Restored(_) => Ok(()),
            UndoOutcome::NothingToUndo => self.reply(ServerMessage::NothingToUndo).await,
        }
    }

    async fn handle_end_session(&self) -> Result<(), String> {
        match self.state.end_session().await {
            Some(end) => {
                self.reply(ServerMessage::SessionEnded {
                    game: end.game,
                    synced: end.synced,
                })
                .await
            }
            None => self.send_error(ApiError::NoActiveSession).await,
        }
    }

    async fn reply_on_error(&self, result: Result<(), ApiError>) -> Result<(), String> {
        match result {
            Ok(()) => Ok(()),
            Err(e) => self.send_error(e).await,
        }
    }

    pub async fn reply(&self, message: ServerMessage) -> Result<(), String> {
        self.connection_manager
            .send_to(self.connection_id, message)
            .await
    }

    async fn send_error(&self, error: ApiError) -> Result<(), String> {
        self.reply(ServerMessage::error(error)).await
    }
}
