use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Players::OwnerId).string().not_null())
                    .col(ColumnDef::new(Players::Id).string().not_null())
                    .col(ColumnDef::new(Players::Name).string().not_null())
                    .col(ColumnDef::new(Players::Number).string().not_null().default(""))
                    .col(ColumnDef::new(Players::Position).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Players::Level)
                            .string()
                            .not_null()
                            .default("Senior"),
                    )
                    .col(
                        ColumnDef::new(Players::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Players::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // Ids are unique per account only
                    .primary_key(Index::create().col(Players::OwnerId).col(Players::Id))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Players {
    Table,
    Id,
    OwnerId,
    Name,
    Number,
    Position,
    Level,
    CreatedAt,
    UpdatedAt,
}
