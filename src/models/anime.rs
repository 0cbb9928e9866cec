use serde::{Deserialize, Serialize};
use std::fmt;

/// One catalog entry as returned by the metadata source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub id: i32,
    pub title: String,
    pub title_english: Option<String>,
    pub episodes: Option<i32>,
    /// ISO-8601 air start, as delivered upstream.
    pub aired_from: Option<String>,
    pub media_type: MediaType,
    pub image_url: Option<String>,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl AnimeRecord {
    /// English title when present, primary title otherwise.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title_english
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.title)
    }

    /// Identifiers reachable through sequel, prequel and season edges.
    pub fn season_relation_targets(&self) -> impl Iterator<Item = i32> + '_ {
        self.relations
            .iter()
            .filter(|r| r.kind.is_traversed())
            .flat_map(|r| r.targets.iter())
            .filter(|t| t.is_anime())
            .map(|t| t.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Tv,
    Movie,
    Ova,
    Ona,
    Special,
    TvSpecial,
    Music,
    Unknown(String),
}

impl MediaType {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "tv" => Self::Tv,
            "movie" => Self::Movie,
            "ova" => Self::Ova,
            "ona" => Self::Ona,
            "special" => Self::Special,
            "tv special" => Self::TvSpecial,
            "music" => Self::Music,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    #[must_use]
    pub const fn is_movie(&self) -> bool {
        matches!(self, Self::Movie)
    }

    /// Formats that never count as a broadcast season when looking for sequels.
    #[must_use]
    pub const fn is_standalone_release(&self) -> bool {
        matches!(self, Self::Movie | Self::Ova | Self::Ona)
    }
}

impl Default for MediaType {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Tv => "TV",
            Self::Movie => "Movie",
            Self::Ova => "OVA",
            Self::Ona => "ONA",
            Self::Special => "Special",
            Self::TvSpecial => "TV Special",
            Self::Music => "Music",
            Self::Unknown(raw) if raw.is_empty() => "Unknown",
            Self::Unknown(raw) => raw,
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Sequel,
    Prequel,
    Season,
    Other,
}

impl RelationKind {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Sequel" => Self::Sequel,
            "Prequel" => Self::Prequel,
            "Season" => Self::Season,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn is_traversed(self) -> bool {
        matches!(self, Self::Sequel | Self::Prequel | Self::Season)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub kind: RelationKind,
    pub targets: Vec<RelationTarget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationTarget {
    pub id: i32,
    /// "anime" or "manga"; missing means anime.
    pub entry_type: Option<String>,
    pub name: Option<String>,
}

impl RelationTarget {
    #[must_use]
    pub fn is_anime(&self) -> bool {
        self.entry_type
            .as_deref()
            .is_none_or(|t| t.eq_ignore_ascii_case("anime"))
    }
}
