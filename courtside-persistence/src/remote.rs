use std::fmt;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::errors::RemoteError;
use crate::repositories::{GameRepository, PlayerRepository};
use courtside_types::{CompletedGame, Player};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Players,
    Games,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Players => write!(f, "players"),
            Collection::Games => write!(f, "games"),
        }
    }
}

/// Published after every successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteChange {
    pub owner_id: String,
    pub collection: Collection,
}

#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub players: Vec<Player>,
    pub games: Vec<CompletedGame>,
}

impl WriteBatch {
    pub fn len(&self) -> usize {
        self.players.len() + self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BatchOutcome {
    pub written: usize,
    /// Records whose id already existed remotely.
    pub skipped: usize,
}

/// The account's cloud collections. Writes are single attempts; callers
/// decide what to tell the user when one fails.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list_players(&self, owner_id: &str) -> Result<Vec<Player>, RemoteError>;
    async fn list_games(&self, owner_id: &str) -> Result<Vec<CompletedGame>, RemoteError>;
    async fn count(&self, owner_id: &str, collection: Collection) -> Result<u64, RemoteError>;

    async fn create_player(&self, owner_id: &str, player: &Player) -> Result<(), RemoteError>;
    async fn update_player(&self, owner_id: &str, player: &Player) -> Result<(), RemoteError>;
    async fn delete_player(&self, owner_id: &str, player_id: &str) -> Result<(), RemoteError>;

    async fn create_game(&self, owner_id: &str, game: &CompletedGame) -> Result<(), RemoteError>;
    async fn update_game(&self, owner_id: &str, game: &CompletedGame) -> Result<(), RemoteError>;
    async fn delete_game(&self, owner_id: &str, game_id: &str) -> Result<(), RemoteError>;

    /// All-or-nothing upload. Existing ids are left untouched.
    async fn write_batch(&self, owner_id: &str, batch: &WriteBatch) -> Result<BatchOutcome, RemoteError>;

    fn changes(&self) -> broadcast::Receiver<RemoteChange>;
}

/// Remote store backed by a sea-orm database.
pub struct SqlRemoteStore {
    db: DatabaseConnection,
    players: PlayerRepository,
    games: GameRepository,
    changes: broadcast::Sender<RemoteChange>,
}

impl SqlRemoteStore {
    pub fn new(db: DatabaseConnection) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            players: PlayerRepository::new(db.clone()),
            games: GameRepository::new(db.clone()),
            db,
            changes,
        }
    }

    fn notify(&self, owner_id: &str, collection: Collection) {
        // No receivers simply means nobody is subscribed yet
        let _ = self.changes.send(RemoteChange {
            owner_id: owner_id.to_string(),
            collection,
        });
    }
}

#[async_trait]
impl RemoteStore for SqlRemoteStore {
    async fn list_players(&self, owner_id: &str) -> Result<Vec<Player>, RemoteError> {
        self.players.list_for_owner(owner_id).await
    }

    async fn list_games(&self, owner_id: &str) -> Result<Vec<CompletedGame>, RemoteError> {
        self.games.list_for_owner(owner_id).await
    }

    async fn count(&self, owner_id: &str, collection: Collection) -> Result<u64, RemoteError> {
        match collection {
            Collection::Players => self.players.count_for_owner(owner_id).await,
            Collection::Games => self.games.count_for_owner(owner_id).await,
        }
    }

    async fn create_player(&self, owner_id: &str, player: &Player) -> Result<(), RemoteError> {
        self.players.create(owner_id, player).await?;
        self.notify(owner_id, Collection::Players);
        Ok(())
    }

    async fn update_player(&self, owner_id: &str, player: &Player) -> Result<(), RemoteError> {
        if !self.players.update(owner_id, player).await? {
            return Err(RemoteError::NotFound {
                collection: Collection::Players,
                id: player.id.clone(),
            });
        }
        self.notify(owner_id, Collection::Players);
        Ok(())
    }

    async fn delete_player(&self, owner_id: &str, player_id: &str) -> Result<(), RemoteError> {
        if !self.players.delete(owner_id, player_id).await? {
            return Err(RemoteError::NotFound {
                collection: Collection::Players,
                id: player_id.to_string(),
            });
        }
        self.notify(owner_id, Collection::Players);
        Ok(())
    }

    async fn create_game(&self, owner_id: &str, game: &CompletedGame) -> Result<(), RemoteError> {
        self.games.create(owner_id, game).await?;
        self.notify(owner_id, Collection::Games);
        Ok(())
    }

    async fn update_game(&self, owner_id: &str, game: &CompletedGame) -> Result<(), RemoteError> {
        if !self.games.update(owner_id, game).await? {
            return Err(RemoteError::NotFound {
                collection: Collection::Games,
                id: game.id.clone(),
            });
        }
        self.notify(owner_id, Collection::Games);
        Ok(())
    }

    async fn delete_game(&self, owner_id: &str, game_id: &str) -> Result<(), RemoteError> {
        if !self.games.delete(owner_id, game_id).await? {
            return Err(RemoteError::NotFound {
                collection: Collection::Games,
                id: game_id.to_string(),
            });
        }
        self.notify(owner_id, Collection::Games);
        Ok(())
    }

    async fn write_batch(&self, owner_id: &str, batch: &WriteBatch) -> Result<BatchOutcome, RemoteError> {
        let txn = self.db.begin().await?;
        let mut outcome = BatchOutcome::default();

        for player in &batch.players {
            if PlayerRepository::exists_with(&txn, owner_id, &player.id).await? {
                outcome.skipped += 1;
                continue;
            }
            PlayerRepository::insert_with(&txn, owner_id, player).await?;
            outcome.written += 1;
        }
        for game in &batch.games {
            if GameRepository::exists_with(&txn, owner_id, &game.id).await? {
                outcome.skipped += 1;
                continue;
            }
            GameRepository::insert_with(&txn, owner_id, game).await?;
            outcome.written += 1;
        }

        // Dropping an uncommitted transaction rolls it back
        txn.commit().await.map_err(|e| {
            error!("Batch write for {} failed to commit: {}", owner_id, e);
            e
        })?;
        info!(
            "Batch write for {}: {} written, {} skipped",
            owner_id, outcome.written, outcome.skipped
        );

        if outcome.written > 0 {
            if !batch.players.is_empty() {
                self.notify(owner_id, Collection::Players);
            }
            if !batch.games.is_empty() {
                self.notify(owner_id, Collection::Games);
            }
        }
        Ok(outcome)
    }

    fn changes(&self) -> broadcast::Receiver<RemoteChange> {
        self.changes.subscribe()
    }
}
