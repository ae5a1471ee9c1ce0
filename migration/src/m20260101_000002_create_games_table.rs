use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // player_id is deliberately not a foreign key: deleting a player
        // leaves its games in place.
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Games::OwnerId).string().not_null())
                    .col(ColumnDef::new(Games::Id).string().not_null())
                    .col(ColumnDef::new(Games::Date).string().not_null())
                    .col(ColumnDef::new(Games::PlayerId).string().not_null())
                    .col(ColumnDef::new(Games::Opponent).string().null())
                    .col(ColumnDef::new(Games::Stats).text().not_null())
                    .col(
                        ColumnDef::new(Games::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Games::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(Index::create().col(Games::OwnerId).col(Games::Id))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_games_owner_id_date")
                    .table(Games::Table)
                    .col(Games::OwnerId)
                    .col(Games::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
    OwnerId,
    Date,
    PlayerId,
    Opponent,
    Stats,
    CreatedAt,
    UpdatedAt,
}
