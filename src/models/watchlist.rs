use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One tracked season of a show, owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedAnime {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub episodes_watched: i32,
    pub total_episodes: Option<i32>,
    pub status: WatchStatus,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub cover_image: Option<String>,
    pub season_number: i32,
    pub mal_id: Option<i32>,
    pub ranking: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert shape for [`TrackedAnime`]; ids and timestamps are assigned on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrackedAnime {
    pub user_id: String,
    pub title: String,
    pub episodes_watched: i32,
    pub total_episodes: Option<i32>,
    pub status: WatchStatus,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub cover_image: Option<String>,
    pub season_number: i32,
    pub mal_id: Option<i32>,
    pub ranking: Option<i32>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackedAnimeUpdate {
    pub episodes_watched: Option<i32>,
    pub total_episodes: Option<i32>,
    pub status: Option<WatchStatus>,
    pub rating: Option<i32>,
    pub notes: Option<String>,
}

impl TrackedAnimeUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// All tracked seasons sharing a show title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowGroup {
    pub title: String,
    pub seasons: Vec<TrackedAnime>,
}

impl ShowGroup {
    /// Groups rows by exact title. Groups keep first-seen order and seasons
    /// are sorted by number.
    #[must_use]
    pub fn group_by_title(rows: Vec<TrackedAnime>) -> Vec<Self> {
        let mut groups: Vec<Self> = Vec::new();

        for row in rows {
            match groups.iter_mut().find(|g| g.title == row.title) {
                Some(group) => group.seasons.push(row),
                None => groups.push(Self {
                    title: row.title.clone(),
                    seasons: vec![row],
                }),
            }
        }

        for group in &mut groups {
            group.seasons.sort_by_key(|s| s.season_number);
        }
        groups
    }

    #[must_use]
    pub fn max_season_number(&self) -> i32 {
        self.seasons
            .iter()
            .map(|s| s.season_number)
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.seasons.iter().find_map(|s| s.cover_image.as_deref())
    }

    /// Best rank found on any season row.
    #[must_use]
    pub fn ranking(&self) -> Option<i32> {
        self.seasons.iter().filter_map(|s| s.ranking).min()
    }

    /// Ranked shows first by rank, then unranked shows by title.
    #[must_use]
    pub fn ranking_order(mut shows: Vec<Self>) -> Vec<Self> {
        shows.sort_by(|a, b| match (a.ranking(), b.ranking()) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.title.cmp(&b.title),
        });
        shows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    #[default]
    Watching,
    Completed,
    OnHold,
    Dropped,
    PlanToWatch,
}

impl WatchStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Watching => "watching",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
            Self::Dropped => "dropped",
            Self::PlanToWatch => "plan_to_watch",
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "watching" => Ok(Self::Watching),
            "completed" => Ok(Self::Completed),
            "on_hold" => Ok(Self::OnHold),
            "dropped" => Ok(Self::Dropped),
            "plan_to_watch" => Ok(Self::PlanToWatch),
            other => Err(format!("unknown watch status: {other}")),
        }
    }
}
