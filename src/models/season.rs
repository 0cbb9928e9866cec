use serde::{Deserialize, Serialize};

use crate::models::anime::AnimeRecord;

/// The search result the user picked; a resolution run starts from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedSelection {
    pub mal_id: i32,
    pub title: String,
    pub title_english: Option<String>,
    pub episodes: Option<i32>,
    pub image_url: Option<String>,
    pub score: Option<f32>,
}

impl SeedSelection {
    /// Seed for a run that starts from an already fetched record.
    #[must_use]
    pub fn from_record(record: &AnimeRecord) -> Self {
        Self {
            mal_id: record.id,
            title: record.title.clone(),
            title_english: record.title_english.clone(),
            episodes: record.episodes,
            image_url: record.image_url.clone(),
            score: record.score,
        }
    }

    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title_english
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.title)
    }

    /// MAL scores are 0-10 floats; the watchlist stores whole numbers.
    #[must_use]
    pub fn rounded_score(&self) -> Option<i32> {
        #[allow(clippy::cast_possible_truncation)]
        self.score.map(|s| s.round() as i32)
    }
}

/// One season as proposed to the user before anything is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonEntry {
    pub mal_id: i32,
    pub season_number: i32,
    pub title: String,
    pub episodes: Option<i32>,
    pub selected: bool,
    pub episodes_watched: i32,
}

/// Terminal state of a resolution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    Done,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub outcome: ResolutionOutcome,
    pub base_title: String,
    pub cover_image: Option<String>,
    pub rating: Option<i32>,
    pub mal_id: i32,
    pub seasons: Vec<SeasonEntry>,
}

impl Resolution {
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.seasons.iter().filter(|s| s.selected).count()
    }
}
