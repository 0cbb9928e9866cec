//! Narrow persistence seams used by the update checker.

use crate::models::notification::NewNotification;
use crate::models::watchlist::{NewTrackedAnime, ShowGroup, TrackedAnime, TrackedAnimeUpdate};

#[async_trait::async_trait]
pub trait WatchlistStore: Send + Sync {
    /// Inserts every entry or none of them.
    async fn create_entries(&self, entries: &[NewTrackedAnime]) -> anyhow::Result<Vec<TrackedAnime>>;

    async fn update_entry(
        &self,
        id: &str,
        update: &TrackedAnimeUpdate,
    ) -> anyhow::Result<Option<TrackedAnime>>;

    /// A user's rows grouped by show title, seasons ascending.
    async fn list_entries_by_show_title(&self, user_id: &str) -> anyhow::Result<Vec<ShowGroup>>;

    /// Users tracking at least one show with a MAL id.
    async fn list_user_ids(&self) -> anyhow::Result<Vec<String>>;
}

#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn create_notification(&self, notification: &NewNotification) -> anyhow::Result<()>;
}
