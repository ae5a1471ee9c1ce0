use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use tracing::warn;

use crate::entities::{players, prelude::*};
use crate::errors::RemoteError;
use courtside_types::{AgeCategory, Player};

/// The `players` collection, scoped by owning account.
#[derive(Clone)]
pub struct PlayerRepository {
    db: DatabaseConnection,
}

impl PlayerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_player(model: players::Model) -> Player {
        let level = AgeCategory::parse(&model.level).unwrap_or_else(|| {
            warn!(
                "Player {} has unknown level {:?}, treating as Senior",
                model.id, model.level
            );
            AgeCategory::Senior
        });

        Player {
            id: model.id,
            name: model.name,
            number: model.number,
            position: model.position,
            level,
        }
    }

    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Player>, RemoteError> {
        let models = Players::find()
            .filter(players::Column::OwnerId.eq(owner_id))
            .order_by_asc(players::Column::CreatedAt)
            .order_by_asc(players::Column::Name)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_player).collect())
    }

    pub async fn count_for_owner(&self, owner_id: &str) -> Result<u64, RemoteError> {
        let count = Players::find()
            .filter(players::Column::OwnerId.eq(owner_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn find(&self, owner_id: &str, player_id: &str) -> Result<Option<Player>, RemoteError> {
        let model = Self::find_model(&self.db, owner_id, player_id).await?;
        Ok(model.map(Self::model_to_player))
    }

    pub async fn create(&self, owner_id: &str, player: &Player) -> Result<(), RemoteError> {
        Self::insert_with(&self.db, owner_id, player).await
    }

    /// Returns false when no such player exists for the owner.
    pub async fn update(&self, owner_id: &str, player: &Player) -> Result<bool, RemoteError> {
        let Some(model) = Self::find_model(&self.db, owner_id, &player.id).await? else {
            return Ok(false);
        };

        let mut active: players::ActiveModel = model.into();
        active.name = ActiveValue::Set(player.name.clone());
        active.number = ActiveValue::Set(player.number.clone());
        active.position = ActiveValue::Set(player.position.clone());
        active.level = ActiveValue::Set(player.level.as_str().to_string());
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(&self.db).await?;
        Ok(true)
    }

    pub async fn delete(&self, owner_id: &str, player_id: &str) -> Result<bool, RemoteError> {
        let result = Players::delete_by_id((owner_id.to_string(), player_id.to_string()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub(crate) async fn insert_with<C: ConnectionTrait>(
        conn: &C,
        owner_id: &str,
        player: &Player,
    ) -> Result<(), RemoteError> {
        let now = chrono::Utc::now();
        let model = players::ActiveModel {
            id: ActiveValue::Set(player.id.clone()),
            owner_id: ActiveValue::Set(owner_id.to_string()),
            name: ActiveValue::Set(player.name.clone()),
            number: ActiveValue::Set(player.number.clone()),
            position: ActiveValue::Set(player.position.clone()),
            level: ActiveValue::Set(player.level.as_str().to_string()),
            created_at: ActiveValue::Set(now.into()),
            updated_at: ActiveValue::Set(now.into()),
        };

        Players::insert(model).exec_without_returning(conn).await?;
        Ok(())
    }

    pub(crate) async fn exists_with<C: ConnectionTrait>(
        conn: &C,
        owner_id: &str,
        player_id: &str,
    ) -> Result<bool, RemoteError> {
        Ok(Self::find_model(conn, owner_id, player_id).await?.is_some())
    }

    async fn find_model<C: ConnectionTrait>(
        conn: &C,
        owner_id: &str,
        player_id: &str,
    ) -> Result<Option<players::Model>, RemoteError> {
        let model = Players::find_by_id((owner_id.to_string(), player_id.to_string()))
            .one(conn)
            .await?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> PlayerRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        PlayerRepository::new(db)
    }

    fn player(id: &str, name: &str) -> Player {
        Player {
            id: id.to_string(),
            name: name.to_string(),
            number: "08".to_string(),
            position: "Wing".to_string(),
            level: AgeCategory::U13,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_player() {
        let repo = setup_test_db().await;
        let created = player("p1", "Ana");

        repo.create("coach-1", &created).await.unwrap();

        let found = repo.find("coach-1", "p1").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.number, "08");

        // Other accounts cannot see it
        assert!(repo.find("coach-2", "p1").await.unwrap().is_none());
        assert_eq!(repo.count_for_owner("coach-2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_player() {
        let repo = setup_test_db().await;
        repo.create("coach-1", &player("p1", "Ana")).await.unwrap();

        let mut edited = player("p1", "Ana Maria");
        edited.level = AgeCategory::U15;
        assert!(repo.update("coach-1", &edited).await.unwrap());
        assert_eq!(repo.find("coach-1", "p1").await.unwrap().unwrap(), edited);

        assert!(!repo.update("coach-1", &player("missing", "Nobody")).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_player() {
        let repo = setup_test_db().await;
        repo.create("coach-1", &player("p1", "Ana")).await.unwrap();

        assert!(!repo.delete("coach-2", "p1").await.unwrap());
        assert!(repo.delete("coach-1", "p1").await.unwrap());
        assert!(repo.list_for_owner("coach-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped() {
        let repo = setup_test_db().await;
        repo.create("coach-1", &player("p1", "Ana")).await.unwrap();
        repo.create("coach-1", &player("p2", "Ben")).await.unwrap();
        repo.create("coach-2", &player("p3", "Cy")).await.unwrap();

        let roster = repo.list_for_owner("coach-1").await.unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(repo.count_for_owner("coach-1").await.unwrap(), 2);
    }
}
