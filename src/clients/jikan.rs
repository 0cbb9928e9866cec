use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::models::anime::{AnimeRecord, MediaType, Relation, RelationKind, RelationTarget};
use crate::models::season::SeedSelection;

pub const JIKAN_API: &str = "https://api.jikan.moe/v4";

#[derive(Debug, Deserialize)]
struct JikanResponse<T> {
    data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MalAnime {
    pub mal_id: i32,
    pub title: Option<String>,
    pub title_english: Option<String>,
    pub episodes: Option<i32>,
    #[serde(rename = "type")]
    pub anime_type: Option<String>,
    pub score: Option<f32>,
    pub aired: Option<Aired>,
    pub images: Option<MalImages>,
    /// Only present on the `/full` endpoint.
    pub relations: Option<Vec<MalRelation>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Aired {
    pub from: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MalImages {
    pub jpg: Option<MalImageSet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MalImageSet {
    pub image_url: Option<String>,
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MalRelation {
    pub relation: String,
    pub entry: Option<Vec<MalRelationEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MalRelationEntry {
    pub mal_id: Option<i32>,
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub name: Option<String>,
}

impl MalAnime {
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title_english
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(self.title.as_deref())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn cover_image(&self) -> Option<String> {
        let jpg = self.images.as_ref()?.jpg.as_ref()?;
        jpg.large_image_url.clone().or_else(|| jpg.image_url.clone())
    }

    /// The search-result view a resolution run starts from.
    #[must_use]
    pub fn to_seed(&self) -> SeedSelection {
        SeedSelection {
            mal_id: self.mal_id,
            title: self
                .title
                .clone()
                .or_else(|| self.title_english.clone())
                .unwrap_or_default(),
            title_english: self.title_english.clone(),
            episodes: self.episodes,
            image_url: self.cover_image(),
            score: self.score,
        }
    }

    #[must_use]
    pub fn into_record(self) -> AnimeRecord {
        let image_url = self.cover_image();

        let relations = self
            .relations
            .unwrap_or_default()
            .into_iter()
            .map(|group| Relation {
                kind: RelationKind::parse(&group.relation),
                targets: group
                    .entry
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|e| {
                        Some(RelationTarget {
                            id: e.mal_id?,
                            entry_type: e.entry_type,
                            name: e.name,
                        })
                    })
                    .collect(),
            })
            .collect();

        AnimeRecord {
            id: self.mal_id,
            title: self
                .title
                .or_else(|| self.title_english.clone())
                .unwrap_or_default(),
            title_english: self.title_english,
            episodes: self.episodes,
            aired_from: self.aired.and_then(|a| a.from),
            media_type: self
                .anime_type
                .as_deref()
                .map(MediaType::parse)
                .unwrap_or_default(),
            image_url,
            score: self.score,
            relations,
        }
    }
}

#[derive(Clone)]
pub struct JikanClient {
    client: Client,
    base_url: String,
}

impl Default for JikanClient {
    fn default() -> Self {
        Self::new()
    }
}

impl JikanClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: JIKAN_API.to_string(),
        }
    }

    pub fn with_shared_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Full detail record, including the relation list.
    pub async fn get_anime_full(&self, mal_id: i32) -> Result<Option<MalAnime>> {
        let url = format!("{}/anime/{}/full", self.base_url, mal_id);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Jikan API error: {} - {}", status, body));
        }

        let response: JikanResponse<MalAnime> = response.json().await?;

        Ok(Some(response.data))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<MalAnime>> {
        let url = format!(
            "{}/anime?q={}&limit=10",
            self.base_url,
            urlencoding::encode(query)
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Jikan API error: {} - {}", status, body));
        }

        let response: JikanResponse<Vec<MalAnime>> = response.json().await?;

        Ok(response.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_payload_maps_to_record() {
        let payload = r#"{
            "data": {
                "mal_id": 16498,
                "title": "Shingeki no Kyojin",
                "title_english": "Attack on Titan",
                "episodes": 25,
                "type": "TV",
                "score": 8.54,
                "aired": { "from": "2013-04-07T00:00:00+00:00", "to": null },
                "images": { "jpg": { "image_url": "small.jpg", "large_image_url": "large.jpg" } },
                "relations": [
                    { "relation": "Sequel", "entry": [
                        { "mal_id": 25777, "type": "anime", "name": "Shingeki no Kyojin Season 2" }
                    ] },
                    { "relation": "Adaptation", "entry": [
                        { "mal_id": 23390, "type": "manga", "name": "Shingeki no Kyojin" }
                    ] },
                    { "relation": "Side Story" }
                ]
            }
        }"#;

        let parsed: JikanResponse<MalAnime> = serde_json::from_str(payload).unwrap();
        let record = parsed.data.into_record();

        assert_eq!(record.id, 16498);
        assert_eq!(record.display_title(), "Attack on Titan");
        assert_eq!(record.media_type, MediaType::Tv);
        assert_eq!(record.image_url.as_deref(), Some("large.jpg"));
        assert_eq!(record.score, Some(8.54));
        assert_eq!(record.relations.len(), 3);
        assert_eq!(record.season_relation_targets().collect::<Vec<_>>(), vec![25777]);
    }

    #[test]
    fn test_nulls_are_tolerated() {
        let payload = r#"{
            "data": {
                "mal_id": 1,
                "title": "Unknown Show",
                "title_english": null,
                "episodes": null,
                "type": null,
                "aired": null
            }
        }"#;

        let parsed: JikanResponse<MalAnime> = serde_json::from_str(payload).unwrap();
        let record = parsed.data.into_record();

        assert_eq!(record.episodes, None);
        assert_eq!(record.aired_from, None);
        assert_eq!(record.media_type, MediaType::default());
        assert!(record.relations.is_empty());
    }
}
