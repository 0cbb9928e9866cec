use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_column("tracked_anime", "ranking").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(TrackedAnime::Table)
                        .add_column(ColumnDef::new(TrackedAnime::Ranking).integer().null())
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_tracked_anime_user_ranking")
                    .table(TrackedAnime::Table)
                    .col(TrackedAnime::UserId)
                    .col(TrackedAnime::Ranking)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tracked_anime_user_ranking")
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(TrackedAnime::Table)
                    .drop_column(TrackedAnime::Ranking)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum TrackedAnime {
    Table,
    UserId,
    Ranking,
}
