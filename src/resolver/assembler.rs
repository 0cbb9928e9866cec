use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};

use super::classifier::extract_season_info;
use crate::models::anime::{AnimeRecord, MediaType};
use crate::models::season::{SeasonEntry, SeedSelection};

/// Normalized view of a record used for ordering and numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonCandidate<'a> {
    pub mal_id: i32,
    pub display_title: &'a str,
    pub episodes: Option<i32>,
    /// Seconds since the Unix epoch; absent or unparsable dates are 0.
    pub aired_at: i64,
    pub media_type: &'a MediaType,
    pub extracted_season: Option<i32>,
}

impl<'a> SeasonCandidate<'a> {
    #[must_use]
    pub fn from_record(record: &'a AnimeRecord) -> Self {
        let display_title = record.display_title();
        Self {
            mal_id: record.id,
            display_title,
            episodes: record.episodes,
            aired_at: parse_air_date(record.aired_from.as_deref()),
            media_type: &record.media_type,
            extracted_season: extract_season_info(display_title).season,
        }
    }

    /// Movies never count; single-episode entries count only when their title
    /// names a season.
    #[must_use]
    pub fn is_season(&self) -> bool {
        if self.media_type.is_movie() {
            return false;
        }
        !(self.episodes == Some(1) && self.extracted_season.is_none())
    }

    fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.aired_at
            .cmp(&other.aired_at)
            .then_with(|| {
                self.display_title
                    .to_lowercase()
                    .cmp(&other.display_title.to_lowercase())
            })
            .then_with(|| self.mal_id.cmp(&other.mal_id))
    }
}

fn parse_air_date(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp();
    }

    raw.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map_or(0, |dt| dt.and_utc().timestamp())
}

/// Orders records by air date, then lowercase display title, then id.
#[must_use]
pub fn chronological_order(records: &[AnimeRecord]) -> Vec<&AnimeRecord> {
    let mut candidates: Vec<(SeasonCandidate<'_>, &AnimeRecord)> = records
        .iter()
        .map(|r| (SeasonCandidate::from_record(r), r))
        .collect();
    candidates.sort_by(|(a, _), (b, _)| a.chronological_cmp(b));
    candidates.into_iter().map(|(_, r)| r).collect()
}

/// Turns the records of one relation walk into numbered seasons.
///
/// Numbers start at 1 and stay contiguous. Records whose titles name the same
/// season share one number; records without a season in their title each
/// take the next free number.
#[must_use]
pub fn assemble(records: &[AnimeRecord], base_title: &str) -> Vec<SeasonEntry> {
    let mut candidates: Vec<SeasonCandidate<'_>> = records
        .iter()
        .map(SeasonCandidate::from_record)
        .filter(SeasonCandidate::is_season)
        .collect();
    candidates.sort_by(SeasonCandidate::chronological_cmp);

    let mut assigned: HashMap<i32, i32> = HashMap::new();
    let mut next = 1;

    candidates
        .into_iter()
        .map(|candidate| {
            let season_number = match candidate.extracted_season {
                Some(extracted) => *assigned.entry(extracted).or_insert_with(|| {
                    let number = next;
                    next += 1;
                    number
                }),
                None => {
                    let number = next;
                    next += 1;
                    number
                }
            };

            SeasonEntry {
                mal_id: candidate.mal_id,
                season_number,
                title: base_title.to_string(),
                episodes: candidate.episodes,
                selected: true,
                episodes_watched: candidate.episodes.unwrap_or(0),
            }
        })
        .collect()
}

/// Single season built from the search result alone.
#[must_use]
pub fn fallback_entry(seed: &SeedSelection) -> SeasonEntry {
    SeasonEntry {
        mal_id: seed.mal_id,
        season_number: 1,
        title: seed.display_title().to_string(),
        episodes: seed.episodes,
        selected: true,
        episodes_watched: seed.episodes.unwrap_or(0),
    }
}
