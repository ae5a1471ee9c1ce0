use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use courtside_persistence::{
    Collection, LocalStorage, LocalStorageError, RemoteError, RemoteStore, WriteBatch,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum MigrationOutcome {
    AlreadyCompleted,
    NothingToMigrate,
    /// Both remote collections already hold data; nothing was uploaded.
    RemoteNotEmpty,
    Migrated { written: usize, skipped: usize },
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Local(#[from] LocalStorageError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Upload data recorded before the first sign-in on this device.
///
/// The completion flag is only written once the upload has committed, so a
/// failed attempt is retried on the next sign-in.
pub async fn migrate_local_data(
    local: &LocalStorage,
    remote: &dyn RemoteStore,
    owner_id: &str,
) -> Result<MigrationOutcome, MigrationError> {
    if local.is_migrated()? {
        return Ok(MigrationOutcome::AlreadyCompleted);
    }

    let Some(snapshot) = local.load_snapshot()?.filter(|snapshot| !snapshot.is_empty()) else {
        local.mark_migrated()?;
        info!("No local data to migrate for {}", owner_id);
        return Ok(MigrationOutcome::NothingToMigrate);
    };

    let remote_players = remote.count(owner_id, Collection::Players).await?;
    let remote_games = remote.count(owner_id, Collection::Games).await?;
    if remote_players > 0 && remote_games > 0 {
        local.mark_migrated()?;
        warn!(
            "Remote data already present for {} ({} players, {} games); local data not uploaded",
            owner_id, remote_players, remote_games
        );
        return Ok(MigrationOutcome::RemoteNotEmpty);
    }

    let batch = WriteBatch {
        players: snapshot.players,
        games: snapshot.history,
    };
    let outcome = remote.write_batch(owner_id, &batch).await?;
    local.mark_migrated()?;
    info!(
        "Migrated local data for {}: {} records written, {} already present",
        owner_id, outcome.written, outcome.skipped
    );

    Ok(MigrationOutcome::Migrated {
        written: outcome.written,
        skipped: outcome.skipped,
    })
}
