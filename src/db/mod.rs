use crate::models::notification::{NewNotification, Notification};
use crate::models::watchlist::{NewTrackedAnime, ShowGroup, TrackedAnime, TrackedAnimeUpdate};
use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;
pub mod traits;

pub use traits::{NotificationSink, WatchlistStore};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn tracked_repo(&self) -> repositories::tracked_anime::TrackedAnimeRepository {
        repositories::tracked_anime::TrackedAnimeRepository::new(self.conn.clone())
    }

    fn notification_repo(&self) -> repositories::notification::NotificationRepository {
        repositories::notification::NotificationRepository::new(self.conn.clone())
    }

    pub async fn add_tracked(&self, entries: &[NewTrackedAnime]) -> Result<Vec<TrackedAnime>> {
        self.tracked_repo().create_many(entries).await
    }

    pub async fn get_tracked(&self, id: &str) -> Result<Option<TrackedAnime>> {
        self.tracked_repo().get(id).await
    }

    pub async fn list_tracked(&self, user_id: &str) -> Result<Vec<TrackedAnime>> {
        self.tracked_repo().list_for_user(user_id).await
    }

    pub async fn list_shows(&self, user_id: &str) -> Result<Vec<ShowGroup>> {
        let rows = self.list_tracked(user_id).await?;
        Ok(ShowGroup::group_by_title(rows))
    }

    pub async fn update_tracked(
        &self,
        id: &str,
        update: &TrackedAnimeUpdate,
    ) -> Result<Option<TrackedAnime>> {
        self.tracked_repo().update(id, update).await
    }

    pub async fn remove_tracked(&self, id: &str) -> Result<bool> {
        self.tracked_repo().delete(id).await
    }

    pub async fn set_show_rankings(
        &self,
        user_id: &str,
        rankings: &[(String, Option<i32>)],
    ) -> Result<()> {
        self.tracked_repo().set_show_rankings(user_id, rankings).await
    }

    pub async fn list_tracking_users(&self) -> Result<Vec<String>> {
        self.tracked_repo().list_user_ids().await
    }

    pub async fn add_notification(&self, notification: &NewNotification) -> Result<Notification> {
        self.notification_repo().create(notification).await
    }

    pub async fn get_notification(&self, id: &str) -> Result<Option<Notification>> {
        self.notification_repo().get(id).await
    }

    pub async fn list_notifications(&self, user_id: &str) -> Result<Vec<Notification>> {
        self.notification_repo().list_for_user(user_id).await
    }

    pub async fn unread_notification_count(&self, user_id: &str) -> Result<u64> {
        self.notification_repo().unread_count(user_id).await
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<bool> {
        self.notification_repo().mark_read(id).await
    }

    pub async fn mark_all_notifications_read(&self, user_id: &str) -> Result<u64> {
        self.notification_repo().mark_all_read(user_id).await
    }
}

#[async_trait::async_trait]
impl WatchlistStore for Store {
    async fn create_entries(&self, entries: &[NewTrackedAnime]) -> Result<Vec<TrackedAnime>> {
        self.add_tracked(entries).await
    }

    async fn update_entry(
        &self,
        id: &str,
        update: &TrackedAnimeUpdate,
    ) -> Result<Option<TrackedAnime>> {
        self.update_tracked(id, update).await
    }

    async fn list_entries_by_show_title(&self, user_id: &str) -> Result<Vec<ShowGroup>> {
        self.list_shows(user_id).await
    }

    async fn list_user_ids(&self) -> Result<Vec<String>> {
        self.list_tracking_users().await
    }
}

#[async_trait::async_trait]
impl NotificationSink for Store {
    async fn create_notification(&self, notification: &NewNotification) -> Result<()> {
        self.add_notification(notification).await?;
        Ok(())
    }
}
