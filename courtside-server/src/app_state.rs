use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use courtside_core::exchange::{export_game, export_history, game_file_name, history_file_name};
use courtside_core::{
    ClientStateStore, StoreObserver, SubscriptionId, UndoOutcome, dashboard_summary,
    match_report, parse_import,
};
use courtside_persistence::{BatchOutcome, LocalStorage, LocalStorageError, RemoteStore, WriteBatch};
use courtside_types::{
    ApiError, CompletedGame, DashboardSummary, GameEdit, MatchReport, Player, PlayerDraft,
    PlayerId, SessionPhase, SessionSnapshot, StatKind,
};

use crate::auth::Account;
use crate::local_migration::{MigrationOutcome, migrate_local_data};
use crate::observers::{LocalSnapshotWriter, SnapshotFlusher};
use crate::sync::{RemoteSyncAdapter, SharedStore};
use crate::timer::SessionTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOutcome {
    Applied { value: u32 },
    /// The fifth foul was requested without confirmation; nothing changed.
    ConfirmationRequired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionEnd {
    pub game: CompletedGame,
    /// Whether the remote store accepted the game.
    pub synced: bool,
}

/// A file ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// Everything the presentation layer talks to, constructed once per process.
pub struct AppState {
    store: SharedStore,
    sync: RemoteSyncAdapter,
    local: LocalStorage,
    snapshots: SnapshotFlusher,
    timer: SessionTimer,
    identity: RwLock<Option<Account>>,
}

impl AppState {
    /// Restore the roster and history saved on this device and keep that
    /// copy current from then on. Needs a running tokio runtime.
    pub fn bootstrap(
        remote: Arc<dyn RemoteStore>,
        local: LocalStorage,
        timer_tick: Duration,
    ) -> Result<Self, LocalStorageError> {
        let snapshot = local.load_snapshot()?.unwrap_or_default();
        info!(
            "Loaded {} players and {} games from local storage",
            snapshot.players.len(),
            snapshot.history.len()
        );

        let mut store = ClientStateStore::from_snapshot(snapshot.clone());
        let (writer, snapshots, _) = LocalSnapshotWriter::spawn(local.clone(), snapshot);
        store.subscribe(Box::new(writer));
        let store = Arc::new(RwLock::new(store));

        Ok(Self {
            sync: RemoteSyncAdapter::new(remote, store.clone()),
            store,
            local,
            snapshots,
            timer: SessionTimer::new(timer_tick),
            identity: RwLock::new(None),
        })
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn sync(&self) -> &RemoteSyncAdapter {
        &self.sync
    }

    pub async fn subscribe(&self, observer: Box<dyn StoreObserver>) -> SubscriptionId {
        self.store.write().await.subscribe(observer)
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.write().await.unsubscribe(id)
    }

    /// Waits until local storage reflects every change made so far.
    pub async fn flush_local_storage(&self) {
        self.snapshots.flush().await;
    }

    // Identity

    pub async fn account(&self) -> Option<Account> {
        self.identity.read().await.clone()
    }

    pub async fn require_account(&self) -> Result<Account, ApiError> {
        self.account().await.ok_or(ApiError::AuthenticationRequired)
    }

    /// Returns the migration outcome, or `None` when the migration failed and
    /// will be retried on the next sign-in.
    /// Mirroring starts only after local data has been uploaded.
    pub async fn sign_in(&self, account: Account) -> Option<MigrationOutcome> {
        info!("Signing in {}", account.id);
        *self.identity.write().await = Some(account.clone());
        self.flush_local_storage().await;

        match migrate_local_data(&self.local, self.sync.remote().as_ref(), &account.id).await {
            Ok(outcome) => {
                self.sync.subscribe(&account.id).await;
                Some(outcome)
            }
            Err(e) => {
                error!("Local data migration failed for {}: {}", account.id, e);
                None
            }
        }
    }

    /// Stops mirroring and pauses the match clock.
    pub async fn sign_out(&self) {
        self.sync.unsubscribe().await;
        if self.timer.is_running() {
            self.timer.stop();
            self.store.write().await.set_timer_running(false);
        }
        if let Some(account) = self.identity.write().await.take() {
            info!("Signed out {}", account.id);
        }
    }

    // Roster

    pub async fn players(&self) -> Vec<Player> {
        self.store.read().await.players().to_vec()
    }

    pub async fn add_player(&self, draft: PlayerDraft) -> Result<Player, ApiError> {
        validate_draft(&draft)?;
        let player = draft.into_player(Uuid::new_v4().to_string());
        if let Some(account) = self.account().await {
            self.sync.create_player(&account.id, &player).await?;
        }
        self.store.write().await.add_player(player.clone());
        Ok(player)
    }

    pub async fn update_player(
        &self,
        player_id: &str,
        draft: PlayerDraft,
    ) -> Result<Player, ApiError> {
        validate_draft(&draft)?;
        self.ensure_player(player_id).await?;
        let player = draft.into_player(player_id.to_string());
        if let Some(account) = self.account().await {
            self.sync.update_player(&account.id, &player).await?;
        }
        self.store.write().await.update_player(player.clone());
        Ok(player)
    }

    /// Matches recorded for the player stay in the history.
    pub async fn remove_player(&self, player_id: &str) -> Result<(), ApiError> {
        self.ensure_player(player_id).await?;
        if let Some(account) = self.account().await {
            self.sync.delete_player(&account.id, player_id).await?;
        }
        self.store.write().await.remove_player(player_id);
        Ok(())
    }

    async fn ensure_player(&self, player_id: &str) -> Result<(), ApiError> {
        match self.store.read().await.find_player(player_id) {
            Some(_) => Ok(()),
            None => Err(ApiError::PlayerNotFound {
                player_id: player_id.to_string(),
            }),
        }
    }

    // History

    pub async fn history(&self) -> Vec<CompletedGame> {
        self.store.read().await.history().to_vec()
    }

    pub async fn update_game(&self, game_id: &str, edit: GameEdit) -> Result<CompletedGame, ApiError> {
        let mut game = self.find_game(game_id).await?;
        game.apply_edit(edit.clone());
        if let Some(account) = self.account().await {
            self.sync.update_game(&account.id, &game).await?;
        }
        self.store.write().await.update_game(game_id, edit);
        Ok(game)
    }

    pub async fn remove_game(&self, game_id: &str) -> Result<(), ApiError> {
        self.find_game(game_id).await?;
        if let Some(account) = self.account().await {
            self.sync.delete_game(&account.id, game_id).await?;
        }
        self.store.write().await.remove_game(game_id);
        Ok(())
    }

    /// Add the matches in an exported file. A file with any invalid entry
    /// adds nothing, and matches already in the history are left untouched.
    pub async fn import_games(&self, text: &str) -> Result<BatchOutcome, ApiError> {
        let games = parse_import(text).inspect_err(|e| warn!("Rejected import: {}", e))?;

        let remote_outcome = match self.account().await {
            Some(account) => {
                let batch = WriteBatch {
                    players: Vec::new(),
                    games: games.clone(),
                };
                Some(self.sync.write_batch(&account.id, &batch).await?)
            }
            None => None,
        };

        let mut store = self.store.write().await;
        let mut outcome = BatchOutcome::default();
        for game in games {
            if store.find_game(&game.id).is_some() {
                outcome.skipped += 1;
            } else {
                store.add_game(game);
                outcome.written += 1;
            }
        }
        info!(
            "Imported {} matches ({} already present)",
            outcome.written, outcome.skipped
        );
        Ok(remote_outcome.unwrap_or(outcome))
    }

    async fn find_game(&self, game_id: &str) -> Result<CompletedGame, ApiError> {
        self.store
            .read()
            .await
            .find_game(game_id)
            .cloned()
            .ok_or_else(|| ApiError::GameNotFound {
                game_id: game_id.to_string(),
            })
    }

    // Reports

    pub async fn report(&self, game_id: &str) -> Result<MatchReport, ApiError> {
        let store = self.store.read().await;
        let game = store.find_game(game_id).ok_or_else(|| ApiError::GameNotFound {
            game_id: game_id.to_string(),
        })?;
        Ok(match_report(game, store.find_player(&game.player_id)))
    }

    pub async fn dashboard(&self, player_id: Option<&PlayerId>) -> DashboardSummary {
        dashboard_summary(self.store.read().await.history(), player_id)
    }

    pub async fn export_game(&self, game_id: &str) -> Result<ExportFile, ApiError> {
        let game = self.find_game(game_id).await?;
        let contents = export_game(&game).map_err(|e| ApiError::InvalidRequest {
            reason: e.to_string(),
        })?;
        Ok(ExportFile {
            file_name: game_file_name(&game),
            contents,
        })
    }

    pub async fn export_history(&self) -> Result<ExportFile, ApiError> {
        let contents =
            export_history(self.store.read().await.history()).map_err(|e| {
                ApiError::InvalidRequest {
                    reason: e.to_string(),
                }
            })?;
        Ok(ExportFile {
            file_name: history_file_name(Utc::now().date_naive()),
            contents,
        })
    }

    // Live session

    pub async fn session(&self) -> SessionSnapshot {
        self.store.read().await.session().snapshot()
    }

    pub async fn start_session(
        &self,
        player_id: &PlayerId,
        opponent: Option<String>,
    ) -> Result<SessionSnapshot, ApiError> {
        self.timer.stop();
        let mut store = self.store.write().await;
        store.start_session(player_id, opponent)?;
        info!("Started recording for player {}", player_id);
        Ok(store.session().snapshot())
    }

    pub async fn increment(&self, stat: StatKind, confirmed: bool) -> Result<IncrementOutcome, ApiError> {
        let mut store = self.store.write().await;
        if store.requires_foul_out_confirmation(stat) && !confirmed {
            return Ok(IncrementOutcome::ConfirmationRequired);
        }
        let value = store.increment(stat)?;
        if store.session().phase() == SessionPhase::FouledOut {
            info!("Player fouled out");
        }
        Ok(IncrementOutcome::Applied { value })
    }

    pub async fn decrement(&self, stat: StatKind) -> Result<u32, ApiError> {
        Ok(self.store.write().await.decrement(stat)?)
    }

    pub async fn undo(&self) -> UndoOutcome {
        self.store.write().await.undo()
    }

    pub async fn set_timer_running(&self, running: bool) -> Result<(), ApiError> {
        {
            let mut store = self.store.write().await;
            if !store.session().is_active() {
                return Err(ApiError::NoActiveSession);
            }
            store.set_timer_running(running);
        }
        if running {
            self.timer.start(self.store.clone());
        } else {
            self.timer.stop();
        }
        Ok(())
    }

    /// Record the match. It is kept locally even when the remote write
    /// fails or nobody is signed in. `None` when nothing was being recorded.
    pub async fn end_session(&self) -> Option<SessionEnd> {
        self.timer.stop();
        let date = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let game = self.store.write().await.end_session(date)?;
        info!("Recorded match {} for player {}", game.id, game.player_id);

        let synced = match self.account().await {
            Some(account) => self.sync.create_game(&account.id, &game).await.is_ok(),
            None => false,
        };
        Some(SessionEnd { game, synced })
    }

    pub async fn reset_session(&self, confirmed: bool) -> Result<(), ApiError> {
        if !confirmed {
            return Err(ApiError::ConfirmationRequired {
                action: "discard the current match".to_string(),
            });
        }
        self.timer.stop();
        self.store.write().await.reset_session();
        info!("Discarded the current match");
        Ok(())
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }
}

fn validate_draft(draft: &PlayerDraft) -> Result<(), ApiError> {
    if draft.name.trim().is_empty() {
        return Err(ApiError::InvalidRequest {
            reason: "Player name is required".to_string(),
        });
    }
    Ok(())
}
