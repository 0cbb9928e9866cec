//! Watchlist operations on behalf of a single user.

use thiserror::Error;
use tracing::info;

use crate::db::Store;
use crate::models::notification::Notification;
use crate::models::season::{Resolution, SeasonEntry};
use crate::models::watchlist::{
    NewTrackedAnime, ShowGroup, TrackedAnime, TrackedAnimeUpdate, WatchStatus,
};

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Entry {0} belongs to another user")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for WatchlistError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// A show to add, either from a resolved season list or entered by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct AddShowRequest {
    pub title: String,
    pub status: WatchStatus,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub cover_image: Option<String>,
    pub mal_id: Option<i32>,
    /// Resolved seasons; only the selected ones are stored. Empty means the
    /// manual fields below are used instead.
    pub seasons: Vec<SeasonEntry>,
    pub episodes_watched: i32,
    pub total_episodes: Option<i32>,
    pub number_of_seasons: i32,
}

impl Default for AddShowRequest {
    fn default() -> Self {
        Self {
            title: String::new(),
            status: WatchStatus::default(),
            rating: None,
            notes: None,
            cover_image: None,
            mal_id: None,
            seasons: Vec::new(),
            episodes_watched: 0,
            total_episodes: None,
            number_of_seasons: 1,
        }
    }
}

impl AddShowRequest {
    #[must_use]
    pub fn from_resolution(resolution: &Resolution, status: WatchStatus) -> Self {
        Self {
            title: resolution.base_title.clone(),
            status,
            rating: resolution.rating,
            cover_image: resolution.cover_image.clone(),
            mal_id: Some(resolution.mal_id),
            seasons: resolution.seasons.clone(),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<(), WatchlistError> {
        if self.title.trim().is_empty() {
            return Err(WatchlistError::Validation("title must not be empty".into()));
        }
        validate_rating(self.rating)?;

        if self.seasons.is_empty() {
            if self.number_of_seasons < 1 {
                return Err(WatchlistError::Validation(
                    "number of seasons must be at least 1".into(),
                ));
            }
            return validate_progress(self.episodes_watched, self.total_episodes);
        }

        if !self.seasons.iter().any(|s| s.selected) {
            return Err(WatchlistError::Validation(
                "select at least one season".into(),
            ));
        }
        for season in self.seasons.iter().filter(|s| s.selected) {
            validate_progress(season.episodes_watched, season.episodes).map_err(|_| {
                WatchlistError::Validation(format!(
                    "season {} progress {} is outside 0..={}",
                    season.season_number,
                    season.episodes_watched,
                    season.episodes.unwrap_or_default()
                ))
            })?;
        }
        Ok(())
    }

    fn into_rows(self, user_id: &str) -> Vec<NewTrackedAnime> {
        let row = |season_number, episodes_watched, total_episodes, mal_id| NewTrackedAnime {
            user_id: user_id.to_string(),
            title: self.title.trim().to_string(),
            episodes_watched,
            total_episodes,
            status: self.status,
            rating: self.rating,
            notes: self.notes.clone(),
            cover_image: self.cover_image.clone(),
            season_number,
            mal_id,
            ranking: None,
        };

        if self.seasons.is_empty() {
            return (1..=self.number_of_seasons)
                .map(|n| {
                    let mal_id = if n == 1 { self.mal_id } else { None };
                    row(n, self.episodes_watched, self.total_episodes, mal_id)
                })
                .collect();
        }

        self.seasons
            .iter()
            .filter(|s| s.selected)
            .map(|s| row(s.season_number, s.episodes_watched, s.episodes, Some(s.mal_id)))
            .collect()
    }
}

fn validate_rating(rating: Option<i32>) -> Result<(), WatchlistError> {
    match rating {
        Some(r) if !(1..=10).contains(&r) => Err(WatchlistError::Validation(format!(
            "rating {r} must be between 1 and 10"
        ))),
        _ => Ok(()),
    }
}

fn validate_progress(watched: i32, total: Option<i32>) -> Result<(), WatchlistError> {
    if watched < 0 {
        return Err(WatchlistError::Validation(
            "episodes watched must not be negative".into(),
        ));
    }
    if let Some(total) = total
        && watched > total
    {
        return Err(WatchlistError::Validation(format!(
            "episodes watched ({watched}) exceeds total episodes ({total})"
        )));
    }
    Ok(())
}

/// Titles of ranked shows in rank order, leaving out `title`.
fn ranked_titles_without(shows: Vec<ShowGroup>, title: &str) -> Vec<String> {
    ShowGroup::ranking_order(shows)
        .into_iter()
        .filter(|s| s.ranking().is_some() && s.title != title)
        .map(|s| s.title)
        .collect()
}

#[derive(Clone)]
pub struct WatchlistService {
    store: Store,
}

impl WatchlistService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Validates the request, then writes all of its rows in one batch.
    pub async fn add_show(
        &self,
        user_id: &str,
        request: AddShowRequest,
    ) -> Result<Vec<TrackedAnime>, WatchlistError> {
        request.validate()?;

        let title = request.title.trim().to_string();
        let rows = request.into_rows(user_id);
        let created = self.store.add_tracked(&rows).await?;

        info!(user_id, title = %title, seasons = created.len(), "Added show to watchlist");
        Ok(created)
    }

    pub async fn list_shows(&self, user_id: &str) -> Result<Vec<ShowGroup>, WatchlistError> {
        Ok(self.store.list_shows(user_id).await?)
    }

    pub async fn update_entry(
        &self,
        user_id: &str,
        id: &str,
        update: TrackedAnimeUpdate,
    ) -> Result<TrackedAnime, WatchlistError> {
        let current = self.owned_entry(user_id, id).await?;

        validate_rating(update.rating)?;
        let watched = update.episodes_watched.unwrap_or(current.episodes_watched);
        let total = update.total_episodes.or(current.total_episodes);
        validate_progress(watched, total)?;

        if update.is_empty() {
            return Ok(current);
        }

        self.store
            .update_tracked(id, &update)
            .await?
            .ok_or_else(|| WatchlistError::NotFound(id.to_string()))
    }

    pub async fn remove_entry(&self, user_id: &str, id: &str) -> Result<(), WatchlistError> {
        self.owned_entry(user_id, id).await?;

        if !self.store.remove_tracked(id).await? {
            return Err(WatchlistError::NotFound(id.to_string()));
        }
        info!(user_id, id, "Removed watchlist entry");
        Ok(())
    }

    /// Shows in ranking order: ranked ones by rank, then the rest by title.
    pub async fn ranked_shows(&self, user_id: &str) -> Result<Vec<ShowGroup>, WatchlistError> {
        Ok(ShowGroup::ranking_order(self.store.list_shows(user_id).await?))
    }

    /// Moves `title` to `rank`, shifting the shows at and below it down by one.
    ///
    /// `rank` must lie within `1..=number of shows`. Ranks stay contiguous, so
    /// a rank past the end of the ranked shows places the title last among them.
    pub async fn rank_show(
        &self,
        user_id: &str,
        title: &str,
        rank: i32,
    ) -> Result<Vec<ShowGroup>, WatchlistError> {
        let shows = self.store.list_shows(user_id).await?;
        if !shows.iter().any(|s| s.title == title) {
            return Err(WatchlistError::NotFound(title.to_string()));
        }

        let count = shows.len();
        let position = usize::try_from(rank)
            .ok()
            .filter(|r| (1..=count).contains(r))
            .ok_or_else(|| {
                WatchlistError::Validation(format!("rank must be between 1 and {count}"))
            })?;

        let mut ranked = ranked_titles_without(shows, title);
        ranked.insert((position - 1).min(ranked.len()), title.to_string());

        let rankings: Vec<(String, Option<i32>)> =
            (1..).zip(ranked).map(|(r, t)| (t, Some(r))).collect();
        self.store.set_show_rankings(user_id, &rankings).await?;

        info!(user_id, title, rank, "Ranked show");
        self.ranked_shows(user_id).await
    }

    /// Removes `title` from the ranking and closes the gap it leaves.
    pub async fn unrank_show(
        &self,
        user_id: &str,
        title: &str,
    ) -> Result<Vec<ShowGroup>, WatchlistError> {
        let shows = self.store.list_shows(user_id).await?;
        let Some(show) = shows.iter().find(|s| s.title == title) else {
            return Err(WatchlistError::NotFound(title.to_string()));
        };
        if show.ranking().is_none() {
            return Ok(ShowGroup::ranking_order(shows));
        }

        let rankings: Vec<(String, Option<i32>)> = (1..)
            .zip(ranked_titles_without(shows, title))
            .map(|(r, t)| (t, Some(r)))
            .chain(std::iter::once((title.to_string(), None)))
            .collect();
        self.store.set_show_rankings(user_id, &rankings).await?;

        info!(user_id, title, "Removed show from ranking");
        self.ranked_shows(user_id).await
    }

    pub async fn notifications(&self, user_id: &str) -> Result<Vec<Notification>, WatchlistError> {
        Ok(self.store.list_notifications(user_id).await?)
    }

    pub async fn unread_notifications(&self, user_id: &str) -> Result<u64, WatchlistError> {
        Ok(self.store.unread_notification_count(user_id).await?)
    }

    pub async fn mark_notification_read(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<(), WatchlistError> {
        let notification = self
            .store
            .get_notification(id)
            .await?
            .ok_or_else(|| WatchlistError::NotFound(id.to_string()))?;
        if notification.user_id != user_id {
            return Err(WatchlistError::Forbidden(id.to_string()));
        }

        self.store.mark_notification_read(id).await?;
        Ok(())
    }

    pub async fn mark_all_notifications_read(&self, user_id: &str) -> Result<u64, WatchlistError> {
        Ok(self.store.mark_all_notifications_read(user_id).await?)
    }

    async fn owned_entry(&self, user_id: &str, id: &str) -> Result<TrackedAnime, WatchlistError> {
        let entry = self
            .store
            .get_tracked(id)
            .await?
            .ok_or_else(|| WatchlistError::NotFound(id.to_string()))?;

        if entry.user_id != user_id {
            return Err(WatchlistError::Forbidden(id.to_string()));
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn season(number: i32, episodes: Option<i32>, selected: bool) -> SeasonEntry {
        SeasonEntry {
            mal_id: 100 + number,
            season_number: number,
            title: "Show".to_string(),
            episodes,
            selected,
            episodes_watched: episodes.unwrap_or(0),
        }
    }

    #[test]
    fn test_rejects_blank_title_and_bad_rating() {
        let request = AddShowRequest {
            title: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(WatchlistError::Validation(_))));

        let request = AddShowRequest {
            title: "Show".to_string(),
            rating: Some(11),
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(WatchlistError::Validation(_))));
    }

    #[test]
    fn test_requires_a_selected_season() {
        let request = AddShowRequest {
            title: "Show".to_string(),
            seasons: vec![season(1, Some(12), false), season(2, Some(12), false)],
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(WatchlistError::Validation(_))));
    }

    #[test]
    fn test_progress_cannot_exceed_total() {
        let mut over = season(1, Some(12), true);
        over.episodes_watched = 13;
        let request = AddShowRequest {
            title: "Show".to_string(),
            seasons: vec![over],
            ..Default::default()
        };
        assert!(request.validate().is_err());

        let request = AddShowRequest {
            title: "Show".to_string(),
            episodes_watched: 5,
            total_episodes: Some(4),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_rows_for_selected_seasons_only() {
        let request = AddShowRequest {
            title: "Show".to_string(),
            seasons: vec![
                season(1, Some(12), true),
                season(2, Some(12), false),
                season(3, None, true),
            ],
            ..Default::default()
        };
        assert!(request.validate().is_ok());

        let rows = request.into_rows("u1");
        let numbers: Vec<i32> = rows.iter().map(|r| r.season_number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(rows[0].mal_id, Some(101));
        assert_eq!(rows[1].total_episodes, None);
    }

    #[test]
    fn test_manual_rows_are_numbered() {
        let request = AddShowRequest {
            title: "Show".to_string(),
            mal_id: Some(42),
            episodes_watched: 3,
            total_episodes: Some(12),
            number_of_seasons: 3,
            ..Default::default()
        };
        assert!(request.validate().is_ok());

        let rows = request.into_rows("u1");
        let numbers: Vec<i32> = rows.iter().map(|r| r.season_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(rows[0].mal_id, Some(42));
        assert_eq!(rows[2].mal_id, None);
        assert!(rows.iter().all(|r| r.episodes_watched == 3));
    }
}
