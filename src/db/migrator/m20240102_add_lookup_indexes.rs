use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_tracked_anime_user_title")
                    .table(TrackedAnime::Table)
                    .col(TrackedAnime::UserId)
                    .col(TrackedAnime::Title)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tracked_anime_mal_id")
                    .table(TrackedAnime::Table)
                    .col(TrackedAnime::MalId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_user_read")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::Read)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_notifications_user_read",
            "idx_tracked_anime_mal_id",
            "idx_tracked_anime_user_title",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum TrackedAnime {
    Table,
    UserId,
    Title,
    MalId,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    UserId,
    Read,
}
