use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error payloads sent to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ApiError {
    AuthenticationRequired,
    AuthenticationFailed { reason: String },
    PlayerNotFound { player_id: String },
    GameNotFound { game_id: String },
    NoActiveSession,
    FouledOut,
    ConfirmationRequired { action: String },
    StatUnavailable { stat: String },
    InvalidImport { reason: String },
    InvalidRequest { reason: String },
    RemoteFailure { message: String },
    RateLimitExceeded,
}

impl ApiError {
    pub fn message(&self) -> String {
        match self {
            ApiError::AuthenticationRequired => "Sign in to sync your data".to_string(),
            ApiError::AuthenticationFailed { reason } => format!("Sign-in failed: {}", reason),
            ApiError::PlayerNotFound { player_id } => format!("Unknown player {}", player_id),
            ApiError::GameNotFound { game_id } => format!("Unknown match {}", game_id),
            ApiError::NoActiveSession => "No match is being recorded".to_string(),
            ApiError::FouledOut => "Player has fouled out".to_string(),
            ApiError::ConfirmationRequired { action } => format!("Confirm to {}", action),
            ApiError::StatUnavailable { stat } => {
                format!("{} is not tracked for this age category", stat)
            }
            ApiError::InvalidImport { reason } => format!("Import rejected: {}", reason),
            ApiError::InvalidRequest { reason } => reason.clone(),
            ApiError::RemoteFailure { message } => format!("Could not save online: {}", message),
            ApiError::RateLimitExceeded => "Too many requests".to_string(),
        }
    }
}
