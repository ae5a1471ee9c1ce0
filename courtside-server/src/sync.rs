use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use courtside_core::ClientStateStore;
use courtside_persistence::{
    BatchOutcome, Collection, RemoteChange, RemoteError, RemoteStore, WriteBatch,
};
use courtside_types::{CompletedGame, Player};

pub type SharedStore = Arc<RwLock<ClientStateStore>>;

/// A running mirror of one account's collections. Dropping it stops the
/// mirror.
pub struct SyncSubscription {
    owner_id: String,
    task: JoinHandle<()>,
}

impl SyncSubscription {
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SyncSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Mirrors the remote `players` and `games` collections into the store and
/// forwards writes to the remote store.
pub struct RemoteSyncAdapter {
    remote: Arc<dyn RemoteStore>,
    store: SharedStore,
    subscription: Mutex<Option<SyncSubscription>>,
}

impl RemoteSyncAdapter {
    pub fn new(remote: Arc<dyn RemoteStore>, store: SharedStore) -> Self {
        Self {
            remote,
            store,
            subscription: Mutex::new(None),
        }
    }

    pub fn remote(&self) -> &Arc<dyn RemoteStore> {
        &self.remote
    }

    /// Start mirroring for `owner_id`. Returns false when that mirror is
    /// already running; a mirror for another account is replaced.
    pub async fn subscribe(&self, owner_id: &str) -> bool {
        let mut current = self.subscription.lock().await;
        if let Some(existing) = current.as_ref() {
            if existing.owner_id() == owner_id && !existing.is_finished() {
                debug!("Sync for {} already running", owner_id);
                return false;
            }
        }

        // Listen before the first read so no change falls in between
        let changes = self.remote.changes();
        let task = tokio::spawn(mirror_collections(
            self.remote.clone(),
            self.store.clone(),
            owner_id.to_string(),
            changes,
        ));

        // Replacing the old subscription aborts its task
        *current = Some(SyncSubscription {
            owner_id: owner_id.to_string(),
            task,
        });
        info!("Started sync for {}", owner_id);
        true
    }

    pub async fn unsubscribe(&self) -> bool {
        match self.subscription.lock().await.take() {
            Some(subscription) => {
                info!("Stopped sync for {}", subscription.owner_id());
                true
            }
            None => false,
        }
    }

    pub async fn is_subscribed(&self) -> bool {
        self.subscription
            .lock()
            .await
            .as_ref()
            .is_some_and(|subscription| !subscription.is_finished())
    }

    pub async fn create_player(&self, owner_id: &str, player: &Player) -> Result<(), RemoteError> {
        self.remote
            .create_player(owner_id, player)
            .await
            .inspect_err(|e| error!("Failed to create player {}: {}", player.id, e))
    }

    pub async fn update_player(&self, owner_id: &str, player: &Player) -> Result<(), RemoteError> {
        self.remote
            .update_player(owner_id, player)
            .await
            .inspect_err(|e| error!("Failed to update player {}: {}", player.id, e))
    }

    pub async fn delete_player(&self, owner_id: &str, player_id: &str) -> Result<(), RemoteError> {
        self.remote
            .delete_player(owner_id, player_id)
            .await
            .inspect_err(|e| error!("Failed to delete player {}: {}", player_id, e))
    }

    pub async fn create_game(&self, owner_id: &str, game: &CompletedGame) -> Result<(), RemoteError> {
        self.remote
            .create_game(owner_id, game)
            .await
            .inspect_err(|e| error!("Failed to save match {}: {}", game.id, e))
    }

    pub async fn update_game(&self, owner_id: &str, game: &CompletedGame) -> Result<(), RemoteError> {
        self.remote
            .update_game(owner_id, game)
            .await
            .inspect_err(|e| error!("Failed to update match {}: {}", game.id, e))
    }

    pub async fn delete_game(&self, owner_id: &str, game_id: &str) -> Result<(), RemoteError> {
        self.remote
            .delete_game(owner_id, game_id)
            .await
            .inspect_err(|e| error!("Failed to delete match {}: {}", game_id, e))
    }

    pub async fn write_batch(
        &self,
        owner_id: &str,
        batch: &WriteBatch,
    ) -> Result<BatchOutcome, RemoteError> {
        self.remote
            .write_batch(owner_id, batch)
            .await
            .inspect_err(|e| error!("Batch write of {} records failed: {}", batch.len(), e))
    }
}

async fn mirror_collections(
    remote: Arc<dyn RemoteStore>,
    store: SharedStore,
    owner_id: String,
    mut changes: broadcast::Receiver<RemoteChange>,
) {
    refresh(&*remote, &store, &owner_id, Collection::Players).await;
    refresh(&*remote, &store, &owner_id, Collection::Games).await;

    loop {
        match changes.recv().await {
            Ok(change) if change.owner_id == owner_id => {
                refresh(&*remote, &store, &owner_id, change.collection).await;
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!("Sync for {} skipped {} changes, reloading", owner_id, skipped);
                refresh(&*remote, &store, &owner_id, Collection::Players).await;
                refresh(&*remote, &store, &owner_id, Collection::Games).await;
            }
            Err(RecvError::Closed) => {
                info!("Remote change feed closed for {}", owner_id);
                break;
            }
        }
    }
}

/// Replace the local list with a full snapshot of the remote collection.
async fn refresh(remote: &dyn RemoteStore, store: &SharedStore, owner_id: &str, collection: Collection) {
    match collection {
        Collection::Players => match remote.list_players(owner_id).await {
            Ok(players) => store.write().await.replace_players(players),
            Err(e) => error!("Failed to read players for {}: {}", owner_id, e),
        },
        Collection::Games => match remote.list_games(owner_id).await {
            Ok(games) => store.write().await.replace_history(games),
            Err(e) => error!("Failed to read games for {}: {}", owner_id, e),
        },
    }
}
