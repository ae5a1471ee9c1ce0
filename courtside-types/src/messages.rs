use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{ApiError, CompletedGame, GameStats, Player, PlayerId, StatKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SessionPhase {
    Idle,
    Configuring,
    Active,
    FouledOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub player_id: Option<PlayerId>,
    pub opponent: Option<String>,
    pub stats: GameStats,
    pub elapsed_seconds: u32,
    pub timer_running: bool,
    pub undo_depth: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ClientMessage {
    Authenticate { token: String },
    StartSession { player_id: PlayerId, opponent: Option<String> },
    Increment { stat: StatKind, confirmed: bool },
    Decrement { stat: StatKind },
    Undo,
    SetTimerRunning { running: bool },
    EndSession,
    ResetSession { confirmed: bool },
    Heartbeat,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ServerMessage {
    AuthenticationSuccess { account_id: String },
    AuthenticationFailed { reason: String },
    RosterUpdate { players: Vec<Player> },
    HistoryUpdate { games: Vec<CompletedGame> },
    SessionUpdate { session: SessionSnapshot },
    FoulOutConfirmationRequired { player_id: PlayerId },
    NothingToUndo,
    SessionEnded { game: CompletedGame, synced: bool },
    Error { error: ApiError, message: String },
    HeartbeatAck,
}

impl ServerMessage {
    pub fn error(error: ApiError) -> Self {
        let message = error.message();
        ServerMessage::Error { error, message }
    }
}
