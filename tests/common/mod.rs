//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use animelog::db::Store;
use animelog::models::anime::{AnimeRecord, MediaType, Relation, RelationKind, RelationTarget};
use animelog::resolver::AnimeSource;

/// In-memory catalog standing in for Jikan.
pub struct FakeSource {
    records: Mutex<HashMap<i32, AnimeRecord>>,
    failing: Vec<i32>,
    pub calls: Mutex<Vec<i32>>,
    started: Mutex<Vec<Instant>>,
}

impl FakeSource {
    pub fn new(records: Vec<AnimeRecord>) -> Self {
        Self {
            records: Mutex::new(records.into_iter().map(|r| (r.id, r)).collect()),
            failing: Vec::new(),
            calls: Mutex::new(Vec::new()),
            started: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, ids: &[i32]) -> Self {
        self.failing.extend_from_slice(ids);
        self
    }

    pub fn replace(&self, record: AnimeRecord) {
        self.records.lock().unwrap().insert(record.id, record);
    }

    pub fn calls(&self) -> Vec<i32> {
        self.calls.lock().unwrap().clone()
    }

    /// Time between the starts of consecutive fetches.
    pub fn gaps(&self) -> Vec<Duration> {
        let started = self.started.lock().unwrap();
        started.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

#[async_trait::async_trait]
impl AnimeSource for FakeSource {
    async fn fetch_anime(&self, id: i32) -> anyhow::Result<Option<AnimeRecord>> {
        self.calls.lock().unwrap().push(id);
        self.started.lock().unwrap().push(Instant::now());
        if self.failing.contains(&id) {
            anyhow::bail!("upstream returned 500 for {id}");
        }
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }
}

pub struct RecordBuilder(AnimeRecord);

pub fn record(id: i32, title: &str) -> RecordBuilder {
    RecordBuilder(AnimeRecord {
        id,
        title: title.to_string(),
        title_english: None,
        episodes: Some(12),
        aired_from: None,
        media_type: MediaType::Tv,
        image_url: None,
        score: None,
        relations: Vec::new(),
    })
}

impl RecordBuilder {
    pub fn english(mut self, title: &str) -> Self {
        self.0.title_english = Some(title.to_string());
        self
    }

    pub fn episodes(mut self, episodes: Option<i32>) -> Self {
        self.0.episodes = episodes;
        self
    }

    pub fn aired(mut self, from: &str) -> Self {
        self.0.aired_from = Some(from.to_string());
        self
    }

    pub fn media(mut self, media_type: MediaType) -> Self {
        self.0.media_type = media_type;
        self
    }

    pub fn score(mut self, score: f32) -> Self {
        self.0.score = Some(score);
        self
    }

    pub fn image(mut self, url: &str) -> Self {
        self.0.image_url = Some(url.to_string());
        self
    }

    pub fn related(mut self, kind: RelationKind, ids: &[i32]) -> Self {
        self.0.relations.push(Relation {
            kind,
            targets: ids
                .iter()
                .map(|&id| RelationTarget {
                    id,
                    entry_type: Some("anime".to_string()),
                    name: None,
                })
                .collect(),
        });
        self
    }

    pub fn build(self) -> AnimeRecord {
        self.0
    }
}

pub async fn temp_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("animelog-test-{}.db", uuid::Uuid::new_v4()));
    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open test database")
}
