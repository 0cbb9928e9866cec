use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::clients::jikan::JikanClient;
use crate::models::anime::AnimeRecord;

/// Anything that can hand out full anime records by MAL id.
#[async_trait::async_trait]
pub trait AnimeSource: Send + Sync {
    /// `Ok(None)` when the id is unknown upstream.
    async fn fetch_anime(&self, id: i32) -> anyhow::Result<Option<AnimeRecord>>;
}

#[async_trait::async_trait]
impl AnimeSource for JikanClient {
    async fn fetch_anime(&self, id: i32) -> anyhow::Result<Option<AnimeRecord>> {
        Ok(self.get_anime_full(id).await?.map(|a| a.into_record()))
    }
}

/// Single-slot pacer: at most one call in flight, and each call starts no
/// earlier than `min_interval` after the previous one finished.
pub struct RequestPacer {
    min_interval: Duration,
    last_finished: Mutex<Option<Instant>>,
}

impl RequestPacer {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_finished: Mutex::new(None),
        }
    }

    pub async fn run<F, T>(&self, call: F) -> T
    where
        F: Future<Output = T>,
    {
        let mut last = self.last_finished.lock().await;

        if let Some(finished) = *last {
            tokio::time::sleep_until(finished + self.min_interval).await;
        }

        let output = call.await;
        *last = Some(Instant::now());
        output
    }
}

/// Paced, failure-swallowing front for an [`AnimeSource`].
///
/// One fetcher belongs to one resolution run or one update check.
pub struct MetadataFetcher {
    source: Arc<dyn AnimeSource>,
    pacer: RequestPacer,
}

impl MetadataFetcher {
    #[must_use]
    pub fn new(source: Arc<dyn AnimeSource>, min_interval: Duration) -> Self {
        Self {
            source,
            pacer: RequestPacer::new(min_interval),
        }
    }

    /// Returns `None` for missing ids and for every kind of upstream failure.
    pub async fn fetch(&self, mal_id: i32) -> Option<AnimeRecord> {
        let result = self.pacer.run(self.source.fetch_anime(mal_id)).await;

        match result {
            Ok(Some(record)) => {
                metrics::counter!("metadata_fetch_total", "outcome" => "ok").increment(1);
                debug!(mal_id, title = %record.display_title(), "Fetched anime record");
                Some(record)
            }
            Ok(None) => {
                metrics::counter!("metadata_fetch_total", "outcome" => "missing").increment(1);
                warn!(mal_id, "Anime not found upstream");
                None
            }
            Err(e) => {
                metrics::counter!("metadata_fetch_total", "outcome" => "error").increment(1);
                warn!(mal_id, error = %e, "Failed to fetch anime record");
                None
            }
        }
    }
}
