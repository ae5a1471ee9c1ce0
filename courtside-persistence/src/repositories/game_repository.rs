use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::entities::{games, prelude::*};
use crate::errors::RemoteError;
use courtside_types::{CompletedGame, GameStats};

/// The `games` collection, scoped by owning account.
#[derive(Clone)]
pub struct GameRepository {
    db: DatabaseConnection,
}

impl GameRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_game(model: games::Model) -> Result<CompletedGame, RemoteError> {
        let stats: GameStats = serde_json::from_str(&model.stats)?;
        Ok(CompletedGame {
            id: model.id,
            date: model.date,
            player_id: model.player_id,
            opponent: model.opponent,
            stats,
        })
    }

    /// Newest first.
    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<CompletedGame>, RemoteError> {
        let models = Games::find()
            .filter(games::Column::OwnerId.eq(owner_id))
            .order_by_desc(games::Column::Date)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::model_to_game).collect()
    }

    pub async fn count_for_owner(&self, owner_id: &str) -> Result<u64, RemoteError> {
        let count = Games::find()
            .filter(games::Column::OwnerId.eq(owner_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn find(&self, owner_id: &str, game_id: &str) -> Result<Option<CompletedGame>, RemoteError> {
        Games::find_by_id((owner_id.to_string(), game_id.to_string()))
            .one(&self.db)
            .await?
            .map(Self::model_to_game)
            .transpose()
    }

    pub async fn create(&self, owner_id: &str, game: &CompletedGame) -> Result<(), RemoteError> {
        Self::insert_with(&self.db, owner_id, game).await
    }

    /// Replaces the whole record. Returns false when it does not exist.
    pub async fn update(&self, owner_id: &str, game: &CompletedGame) -> Result<bool, RemoteError> {
        let Some(model) = Games::find_by_id((owner_id.to_string(), game.id.clone()))
            .one(&self.db)
            .await?
        else {
            return Ok(false);
        };

        let mut active: games::ActiveModel = model.into();
        active.date = ActiveValue::Set(game.date.clone());
        active.player_id = ActiveValue::Set(game.player_id.clone());
        active.opponent = ActiveValue::Set(game.opponent.clone());
        active.stats = ActiveValue::Set(serde_json::to_string(&game.stats)?);
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(&self.db).await?;
        Ok(true)
    }

    pub async fn delete(&self, owner_id: &str, game_id: &str) -> Result<bool, RemoteError> {
        let result = Games::delete_by_id((owner_id.to_string(), game_id.to_string()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub(crate) async fn insert_with<C: ConnectionTrait>(
        conn: &C,
        owner_id: &str,
        game: &CompletedGame,
    ) -> Result<(), RemoteError> {
        let now = chrono::Utc::now();
        let model = games::ActiveModel {
            id: ActiveValue::Set(game.id.clone()),
            owner_id: ActiveValue::Set(owner_id.to_string()),
            date: ActiveValue::Set(game.date.clone()),
            player_id: ActiveValue::Set(game.player_id.clone()),
            opponent: ActiveValue::Set(game.opponent.clone()),
            stats: ActiveValue::Set(serde_json::to_string(&game.stats)?),
            created_at: ActiveValue::Set(now.into()),
            updated_at: ActiveValue::Set(now.into()),
        };

        Games::insert(model).exec_without_returning(conn).await?;
        Ok(())
    }

    pub(crate) async fn exists_with<C: ConnectionTrait>(
        conn: &C,
        owner_id: &str,
        game_id: &str,
    ) -> Result<bool, RemoteError> {
        Ok(Games::find_by_id((owner_id.to_string(), game_id.to_string()))
            .one(conn)
            .await?
            .is_some())
    }
}
