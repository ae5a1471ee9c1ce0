#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use courtside_core::ClientStateStore;
use courtside_persistence::connection::connect_and_migrate;
use courtside_persistence::{LocalStorage, RemoteStore, SqlRemoteStore};
use courtside_server::app_state::AppState;
use courtside_server::auth::{Account, AuthService};
use courtside_server::sync::SharedStore;
use courtside_server::websocket::ConnectionManager;
use courtside_types::{AgeCategory, CompletedGame, GameStats, LocalSnapshot, Player};
use uuid::Uuid;

/// Creates a coach account with a predictable id
pub fn create_test_account(name: &str) -> Account {
    Account {
        id: format!("coach-{}", name.to_lowercase()),
        email: format!("{}@test.com", name.to_lowercase()),
        display_name: name.to_string(),
    }
}

/// Dev-mode token for the account
pub fn dev_token(account: &Account) -> String {
    format!("{}:{}:{}", account.id, account.email, account.display_name)
}

pub fn create_test_player(name: &str, level: AgeCategory) -> Player {
    Player {
        id: format!("player-{}", name.to_lowercase()),
        name: name.to_string(),
        number: "7".to_string(),
        position: "Forward".to_string(),
        level,
    }
}

pub fn create_test_game(player_id: &str, date: &str, points_2: u32) -> CompletedGame {
    CompletedGame {
        id: Uuid::new_v4().to_string(),
        date: date.to_string(),
        player_id: player_id.to_string(),
        opponent: Some("Rivals".to_string()),
        stats: GameStats {
            points_2,
            missed_points_2: 1,
            defensive_rebounds: 3,
            assists: 2,
            ..GameStats::default()
        },
    }
}

/// Local storage in a fresh directory under the OS temp dir
pub fn temp_local_storage() -> LocalStorage {
    let root = std::env::temp_dir().join(format!("courtside-server-test-{}", Uuid::new_v4()));
    LocalStorage::open(root).expect("temp storage should open")
}

pub async fn create_remote_store() -> Arc<SqlRemoteStore> {
    let db = connect_and_migrate("sqlite::memory:")
        .await
        .expect("in-memory database should migrate");
    Arc::new(SqlRemoteStore::new(db))
}

/// Test setup that provides all server components
pub struct TestServerSetup {
    pub remote: Arc<SqlRemoteStore>,
    pub local: LocalStorage,
    pub state: Arc<AppState>,
    pub connection_manager: Arc<ConnectionManager>,
    pub auth_service: Arc<AuthService>,
}

impl TestServerSetup {
    pub async fn new() -> Self {
        Self::with_local_snapshot(None).await
    }

    /// Starts as if `snapshot` had been recorded on this device before.
    pub async fn with_local_snapshot(snapshot: Option<LocalSnapshot>) -> Self {
        let remote = create_remote_store().await;
        let local = temp_local_storage();
        if let Some(snapshot) = snapshot {
            local.save_snapshot(&snapshot).expect("snapshot should save");
        }

        let state = AppState::bootstrap(
            remote.clone() as Arc<dyn RemoteStore>,
            local.clone(),
            Duration::from_millis(10),
        )
        .expect("bootstrap should succeed");

        Self {
            remote,
            local,
            state: Arc::new(state),
            connection_manager: Arc::new(ConnectionManager::new()),
            auth_service: Arc::new(AuthService::new_dev_mode()),
        }
    }
}

/// Polls the store until `predicate` holds or two seconds pass.
pub async fn wait_for<F>(store: &SharedStore, predicate: F) -> bool
where
    F: Fn(&ClientStateStore) -> bool,
{
    for _ in 0..200 {
        if predicate(&*store.read().await) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
