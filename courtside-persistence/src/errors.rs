use sea_orm::DbErr;
use thiserror::Error;

use crate::remote::Collection;
use courtside_types::ApiError;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("could not encode record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{collection} record {id} not found")]
    NotFound { collection: Collection, id: String },
}

#[derive(Debug, Error)]
pub enum LocalStorageError {
    #[error("local storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("local storage entry is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<RemoteError> for ApiError {
    fn from(error: RemoteError) -> Self {
        match error {
            RemoteError::NotFound {
                collection: Collection::Players,
                id,
            } => ApiError::PlayerNotFound { player_id: id },
            RemoteError::NotFound {
                collection: Collection::Games,
                id,
            } => ApiError::GameNotFound { game_id: id },
            other => ApiError::RemoteFailure {
                message: other.to_string(),
            },
        }
    }
}
