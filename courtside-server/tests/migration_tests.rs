mod test_helpers;

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DbErr;
use tokio::sync::broadcast;

use courtside_persistence::{
    BatchOutcome, Collection, RemoteChange, RemoteError, RemoteStore, WriteBatch,
};
use courtside_server::local_migration::{MigrationOutcome, migrate_local_data};
use courtside_types::{AgeCategory, CompletedGame, LocalSnapshot, Player};
use test_helpers::*;

fn local_snapshot() -> LocalSnapshot {
    let alice = create_test_player("Alice", AgeCategory::Senior);
    let mini = create_test_player("Mini", AgeCategory::U11);
    LocalSnapshot {
        history: vec![
            create_test_game(&alice.id, "2026-03-02T18:00:00.000Z", 5),
            create_test_game(&mini.id, "2026-03-01T18:00:00.000Z", 2),
        ],
        players: vec![alice, mini],
    }
}

/// Remote store that is reachable for reads but rejects batch writes.
struct OfflineRemote {
    changes: broadcast::Sender<RemoteChange>,
}

impl OfflineRemote {
    fn new() -> Self {
        Self {
            changes: broadcast::channel(4).0,
        }
    }
}

fn offline() -> RemoteError {
    RemoteError::Database(DbErr::Custom("connection reset".to_string()))
}

#[async_trait]
impl RemoteStore for OfflineRemote {
    async fn list_players(&self, _owner_id: &str) -> Result<Vec<Player>, RemoteError> {
        Ok(Vec::new())
    }
    async fn list_games(&self, _owner_id: &str) -> Result<Vec<CompletedGame>, RemoteError> {
        Ok(Vec::new())
    }
    async fn count(&self, _owner_id: &str, _collection: Collection) -> Result<u64, RemoteError> {
        Ok(0)
    }
    async fn create_player(&self, _owner_id: &str, _player: &Player) -> Result<(), RemoteError> {
        Err(offline())
    }
    async fn update_player(&self, _owner_id: &str, _player: &Player) -> Result<(), RemoteError> {
        Err(offline())
    }
    async fn delete_player(&self, _owner_id: &str, _player_id: &str) -> Result<(), RemoteError> {
        Err(offline())
    }
    async fn create_game(&self, _owner_id: &str, _game: &CompletedGame) -> Result<(), RemoteError> {
        Err(offline())
    }
    async fn update_game(&self, _owner_id: &str, _game: &CompletedGame) -> Result<(), RemoteError> {
        Err(offline())
    }
    async fn delete_game(&self, _owner_id: &str, _game_id: &str) -> Result<(), RemoteError> {
        Err(offline())
    }
    async fn write_batch(
        &self,
        _owner_id: &str,
        _batch: &WriteBatch,
    ) -> Result<BatchOutcome, RemoteError> {
        Err(offline())
    }
    fn changes(&self) -> broadcast::Receiver<RemoteChange> {
        self.changes.subscribe()
    }
}

#[tokio::test]
async fn test_local_data_is_uploaded_to_empty_remote() {
    let remote = create_remote_store().await;
    let local = temp_local_storage();
    let snapshot = local_snapshot();
    local.save_snapshot(&snapshot).unwrap();

    let outcome = migrate_local_data(&local, remote.as_ref(), "coach-1").await.unwrap();
    assert_eq!(outcome, MigrationOutcome::Migrated { written: 4, skipped: 0 });
    assert!(local.is_migrated().unwrap());

    let mut players = remote.list_players("coach-1").await.unwrap();
    players.sort_by(|a, b| a.id.cmp(&b.id));
    let mut expected_players = snapshot.players.clone();
    expected_players.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(players, expected_players);

    // Listed newest first, as recorded locally
    assert_eq!(remote.list_games("coach-1").await.unwrap(), snapshot.history);
}

#[tokio::test]
async fn test_non_empty_remote_is_never_overwritten() {
    let remote = create_remote_store().await;
    let existing_player = create_test_player("Veteran", AgeCategory::Senior);
    let existing_game = create_test_game(&existing_player.id, "2025-12-01T10:00:00.000Z", 9);
    remote.create_player("coach-1", &existing_player).await.unwrap();
    remote.create_game("coach-1", &existing_game).await.unwrap();

    let local = temp_local_storage();
    local.save_snapshot(&local_snapshot()).unwrap();

    let outcome = migrate_local_data(&local, remote.as_ref(), "coach-1").await.unwrap();
    assert_eq!(outcome, MigrationOutcome::RemoteNotEmpty);
    assert!(local.is_migrated().unwrap());
    assert_eq!(remote.list_players("coach-1").await.unwrap(), vec![existing_player]);
    assert_eq!(remote.list_games("coach-1").await.unwrap(), vec![existing_game]);
}

#[tokio::test]
async fn test_partially_filled_remote_keeps_existing_records() {
    let remote = create_remote_store().await;
    let snapshot = local_snapshot();
    // Same id as a local player, different name
    let mut renamed = snapshot.players[0].clone();
    renamed.name = "Alice (cloud)".to_string();
    remote.create_player("coach-1", &renamed).await.unwrap();

    let local = temp_local_storage();
    local.save_snapshot(&snapshot).unwrap();

    let outcome = migrate_local_data(&local, remote.as_ref(), "coach-1").await.unwrap();
    assert_eq!(outcome, MigrationOutcome::Migrated { written: 3, skipped: 1 });

    let players = remote.list_players("coach-1").await.unwrap();
    assert_eq!(players.len(), 2);
    assert!(players.iter().any(|player| player.name == "Alice (cloud)"));
    assert_eq!(remote.count("coach-1", Collection::Games).await.unwrap(), 2);
}

#[tokio::test]
async fn test_nothing_to_migrate_sets_flag() {
    let remote = create_remote_store().await;
    let local = temp_local_storage();

    let outcome = migrate_local_data(&local, remote.as_ref(), "coach-1").await.unwrap();
    assert_eq!(outcome, MigrationOutcome::NothingToMigrate);
    assert!(local.is_migrated().unwrap());
}

#[tokio::test]
async fn test_completed_migration_does_not_run_again() {
    let remote = create_remote_store().await;
    let local = temp_local_storage();
    local.save_snapshot(&local_snapshot()).unwrap();
    local.mark_migrated().unwrap();

    let outcome = migrate_local_data(&local, remote.as_ref(), "coach-1").await.unwrap();
    assert_eq!(outcome, MigrationOutcome::AlreadyCompleted);
    assert_eq!(remote.count("coach-1", Collection::Players).await.unwrap(), 0);
    assert_eq!(remote.count("coach-1", Collection::Games).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_upload_leaves_flag_unset_and_retries() {
    let local = temp_local_storage();
    local.save_snapshot(&local_snapshot()).unwrap();

    let result = migrate_local_data(&local, &OfflineRemote::new(), "coach-1").await;
    assert!(result.is_err());
    assert!(!local.is_migrated().unwrap());

    // Next sign-in, with the remote reachable again
    let remote = create_remote_store().await;
    let outcome = migrate_local_data(&local, remote.as_ref(), "coach-1").await.unwrap();
    assert_eq!(outcome, MigrationOutcome::Migrated { written: 4, skipped: 0 });
    assert!(local.is_migrated().unwrap());
}

#[tokio::test]
async fn test_sign_in_survives_failed_migration() {
    let setup = TestServerSetup::with_local_snapshot(Some(local_snapshot())).await;
    let offline_state = courtside_server::app_state::AppState::bootstrap(
        Arc::new(OfflineRemote::new()),
        setup.local.clone(),
        std::time::Duration::from_millis(10),
    )
    .unwrap();

    let account = create_test_account("Dana");
    assert_eq!(offline_state.sign_in(account.clone()).await, None);
    assert_eq!(offline_state.account().await, Some(account));
    assert!(!setup.local.is_migrated().unwrap());

    // Local data stays put until it can be uploaded
    assert!(!offline_state.sync().is_subscribed().await);
    assert_eq!(offline_state.players().await.len(), 2);
    assert_eq!(offline_state.history().await.len(), 2);
    offline_state.sign_out().await;
}

#[tokio::test]
async fn test_changes_made_just_before_sign_in_are_uploaded() {
    let setup = TestServerSetup::new().await;
    let draft = courtside_types::PlayerDraft {
        name: "Rae".to_string(),
        number: "3".to_string(),
        position: "Guard".to_string(),
        level: AgeCategory::U15,
    };
    let rae = setup.state.add_player(draft).await.unwrap();

    let account = create_test_account("Dana");
    let outcome = setup.state.sign_in(account.clone()).await;
    assert_eq!(outcome, Some(MigrationOutcome::Migrated { written: 1, skipped: 0 }));
    assert_eq!(setup.remote.list_players(&account.id).await.unwrap(), vec![rae]);
    setup.state.sign_out().await;
}
