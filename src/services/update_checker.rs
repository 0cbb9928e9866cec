use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::db::{NotificationSink, WatchlistStore};
use crate::models::anime::AnimeRecord;
use crate::models::notification::NewNotification;
use crate::models::watchlist::{
    NewTrackedAnime, ShowGroup, TrackedAnime, TrackedAnimeUpdate, WatchStatus,
};
use crate::resolver::{
    AnimeSource, MetadataFetcher, RelationGraphWalker, ResolveError, chronological_order,
    extract_season_info, is_new_season,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    pub episode_updates: usize,
    pub new_seasons: usize,
}

impl UpdateSummary {
    pub const fn absorb(&mut self, other: Self) {
        self.episode_updates += other.episode_updates;
        self.new_seasons += other.new_seasons;
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.episode_updates == 0 && self.new_seasons == 0
    }
}

/// Looks for newly aired episodes and newly announced seasons of tracked shows.
pub struct UpdateChecker {
    source: Arc<dyn AnimeSource>,
    watchlist: Arc<dyn WatchlistStore>,
    notifications: Arc<dyn NotificationSink>,
    min_interval: Duration,
}

impl UpdateChecker {
    pub fn new(
        source: Arc<dyn AnimeSource>,
        watchlist: Arc<dyn WatchlistStore>,
        notifications: Arc<dyn NotificationSink>,
        min_interval: Duration,
    ) -> Self {
        Self {
            source,
            watchlist,
            notifications,
            min_interval,
        }
    }

    fn fetcher(&self) -> MetadataFetcher {
        MetadataFetcher::new(self.source.clone(), self.min_interval)
    }

    /// Runs [`Self::check_user`] for every user that tracks a MAL-linked show.
    /// A failing user is logged and skipped; cancellation stops the sweep.
    ///
    /// Every request of the pass goes through one pacer.
    pub async fn check_all(&self, cancel: &CancellationToken) -> Result<UpdateSummary> {
        let start = std::time::Instant::now();
        let fetcher = self.fetcher();
        let users = self.watchlist.list_user_ids().await?;
        let mut total = UpdateSummary::default();
        let mut errors = 0;

        for user_id in &users {
            if cancel.is_cancelled() {
                return Err(ResolveError::Cancelled.into());
            }

            match self.check_user_with(&fetcher, user_id, cancel).await {
                Ok(summary) => total.absorb(summary),
                Err(e) if cancel.is_cancelled() => return Err(e),
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Update check failed for user");
                    errors += 1;
                }
            }
        }

        info!(
            event = "update_check_finished",
            users = users.len(),
            episode_updates = total.episode_updates,
            new_seasons = total.new_seasons,
            errors,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Update check complete"
        );
        Ok(total)
    }

    /// Refreshes episode counts of one user's tracked seasons and adds stub
    /// rows for sequels that start a new season.
    ///
    /// Upstream failures only cost the affected entry. Storage failures abort
    /// the check and are returned.
    pub async fn check_user(
        &self,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<UpdateSummary> {
        self.check_user_with(&self.fetcher(), user_id, cancel).await
    }

    async fn check_user_with(
        &self,
        fetcher: &MetadataFetcher,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<UpdateSummary> {
        let shows = self.watchlist.list_entries_by_show_title(user_id).await?;
        let mut summary = UpdateSummary::default();

        for show in &shows {
            if cancel.is_cancelled() {
                return Err(ResolveError::Cancelled.into());
            }
            summary.absorb(self.check_show(fetcher, user_id, show, cancel).await?);
        }

        debug!(
            user_id,
            shows = shows.len(),
            episode_updates = summary.episode_updates,
            new_seasons = summary.new_seasons,
            "Checked user watchlist"
        );
        Ok(summary)
    }

    async fn check_show(
        &self,
        fetcher: &MetadataFetcher,
        user_id: &str,
        show: &ShowGroup,
        cancel: &CancellationToken,
    ) -> Result<UpdateSummary> {
        let linked: Vec<&TrackedAnime> = show
            .seasons
            .iter()
            .filter(|s| s.mal_id.is_some())
            .collect();
        let (Some(first), Some(first_mal_id)) =
            (linked.first(), linked.first().and_then(|s| s.mal_id))
        else {
            return Ok(UpdateSummary::default());
        };

        let mut summary = UpdateSummary::default();
        let mut refreshed: Vec<AnimeRecord> = Vec::new();

        for season in &linked {
            let (Some(mal_id), Some(known_total)) = (season.mal_id, season.total_episodes) else {
                continue;
            };

            let record = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ResolveError::Cancelled.into()),
                record = fetcher.fetch(mal_id) => record,
            };
            let Some(record) = record else {
                continue;
            };

            if let Some(live_total) = record.episodes
                && live_total > known_total
            {
                info!(
                    user_id,
                    title = %show.title,
                    season = season.season_number,
                    known_total,
                    live_total,
                    "New episodes released"
                );
                self.watchlist
                    .update_entry(
                        &season.id,
                        &TrackedAnimeUpdate {
                            total_episodes: Some(live_total),
                            ..Default::default()
                        },
                    )
                    .await?;
                self.notify(NewNotification::episode_release(
                    user_id,
                    &season.id,
                    &show.title,
                    season.season_number,
                    live_total,
                ))
                .await?;
                summary.episode_updates += 1;
            }

            refreshed.push(record);
        }

        let walk = RelationGraphWalker::new(fetcher, cancel.clone())
            .with_cache(refreshed)
            .walk(first_mal_id)
            .await?;

        let tracked_ids: HashSet<i32> = show.seasons.iter().filter_map(|s| s.mal_id).collect();
        let mut max_known = show.max_season_number();
        let mut stubs = Vec::new();

        for record in chronological_order(&walk.records) {
            if tracked_ids.contains(&record.id) || record.media_type.is_standalone_release() {
                continue;
            }
            let Some(episodes) = record.episodes else {
                continue;
            };

            let title = record.display_title();
            let extracted = extract_season_info(title).season;
            let starts_season = match extracted {
                Some(number) => number > max_known,
                None => is_new_season(title, &show.title),
            };
            if !starts_season {
                continue;
            }

            let season_number = extracted.unwrap_or(max_known + 1);
            max_known = max_known.max(season_number);

            info!(
                user_id,
                title = %show.title,
                season = season_number,
                mal_id = record.id,
                "New season released"
            );
            stubs.push(NewTrackedAnime {
                user_id: user_id.to_string(),
                title: show.title.clone(),
                episodes_watched: 0,
                total_episodes: Some(episodes),
                status: WatchStatus::Watching,
                rating: None,
                notes: None,
                cover_image: record
                    .image_url
                    .clone()
                    .or_else(|| show.cover_image().map(str::to_string)),
                season_number,
                mal_id: Some(record.id),
                ranking: show.ranking(),
            });
        }

        if stubs.is_empty() {
            return Ok(summary);
        }

        self.watchlist.create_entries(&stubs).await?;
        for stub in &stubs {
            self.notify(NewNotification::season_release(
                user_id,
                Some(first.id.as_str()),
                &show.title,
                stub.season_number,
            ))
            .await?;
        }
        summary.new_seasons += stubs.len();

        Ok(summary)
    }

    async fn notify(&self, notification: NewNotification) -> Result<()> {
        metrics::counter!("update_notifications_total", "kind" => notification.kind.as_str())
            .increment(1);
        self.notifications.create_notification(&notification).await
    }
}
