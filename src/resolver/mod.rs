//! Season resolution: from one picked search result to the numbered list of
//! seasons that belong to the same show.

pub mod assembler;
pub mod classifier;
pub mod fetcher;
pub mod graph;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::anime::AnimeRecord;
use crate::models::season::{Resolution, ResolutionOutcome, SeedSelection};

pub use assembler::{assemble, chronological_order, fallback_entry};
pub use classifier::{SeasonInfo, extract_season_info, is_new_season};
pub use fetcher::{AnimeSource, MetadataFetcher, RequestPacer};
pub use graph::{RelationGraphWalker, RelationWalk};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Season resolution was cancelled")]
    Cancelled,
}

/// Progress of a single resolution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Idle,
    Walking,
    Assembling,
    Done,
    Fallback,
}

impl ResolutionState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Fallback)
    }
}

#[derive(Clone)]
pub struct SeasonResolver {
    source: Arc<dyn AnimeSource>,
    min_interval: Duration,
    max_duration: Duration,
}

impl SeasonResolver {
    #[must_use]
    pub fn new(source: Arc<dyn AnimeSource>, min_interval: Duration, max_duration: Duration) -> Self {
        Self {
            source,
            min_interval,
            max_duration,
        }
    }

    #[must_use]
    pub fn from_config(source: Arc<dyn AnimeSource>, config: &Config) -> Self {
        Self::new(
            source,
            config.jikan.min_request_interval(),
            Duration::from_secs(config.resolver.max_resolution_seconds),
        )
    }

    fn fetcher(&self) -> MetadataFetcher {
        MetadataFetcher::new(self.source.clone(), self.min_interval)
    }

    /// Runs one resolution for `seed`.
    ///
    /// A seed that cannot be fetched, or a run that exceeds the wall-clock
    /// cap, yields a single-season [`ResolutionOutcome::Fallback`].
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Cancelled`] when `cancel` fires before the run
    /// completes. Nothing from the partial walk is returned.
    pub async fn resolve(
        &self,
        seed: &SeedSelection,
        cancel: &CancellationToken,
    ) -> Result<Resolution, ResolveError> {
        self.run(&self.fetcher(), seed, Vec::new(), cancel).await
    }

    /// Fetches `mal_id` and resolves from it. The seed request and the walk
    /// share one pacer, and the seed record is not fetched twice.
    ///
    /// Returns `Ok(None)` when the entry does not exist or cannot be fetched.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Cancelled`] when `cancel` fires first.
    pub async fn resolve_id(
        &self,
        mal_id: i32,
        cancel: &CancellationToken,
    ) -> Result<Option<Resolution>, ResolveError> {
        let fetcher = self.fetcher();
        let record = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ResolveError::Cancelled),
            record = fetcher.fetch(mal_id) => record,
        };
        let Some(record) = record else {
            return Ok(None);
        };

        let seed = SeedSelection::from_record(&record);
        self.run(&fetcher, &seed, vec![record], cancel)
            .await
            .map(Some)
    }

    async fn run(
        &self,
        fetcher: &MetadataFetcher,
        seed: &SeedSelection,
        cached: Vec<AnimeRecord>,
        cancel: &CancellationToken,
    ) -> Result<Resolution, ResolveError> {
        let base_title = seed.display_title().to_string();
        let mut state = ResolutionState::Idle;
        debug!(mal_id = seed.mal_id, ?state, "Starting season resolution");

        let walker = RelationGraphWalker::new(fetcher, cancel.clone()).with_cache(cached);

        state = Self::transition(seed.mal_id, state, ResolutionState::Walking);
        let walk = match tokio::time::timeout(self.max_duration, walker.walk(seed.mal_id)).await {
            Ok(walk) => walk?,
            Err(_) => {
                warn!(
                    mal_id = seed.mal_id,
                    limit_secs = self.max_duration.as_secs(),
                    "Season resolution timed out, using search result only"
                );
                Self::transition(seed.mal_id, state, ResolutionState::Fallback);
                return Ok(Self::fallback(seed, base_title));
            }
        };

        let Some(seed_record) = walk.get(seed.mal_id) else {
            warn!(
                mal_id = seed.mal_id,
                "Seed could not be fetched, using search result only"
            );
            Self::transition(seed.mal_id, state, ResolutionState::Fallback);
            return Ok(Self::fallback(seed, base_title));
        };

        state = Self::transition(seed.mal_id, state, ResolutionState::Assembling);
        let cover_image = seed
            .image_url
            .clone()
            .or_else(|| seed_record.image_url.clone());
        let seasons = assemble(&walk.records, &base_title);

        Self::transition(seed.mal_id, state, ResolutionState::Done);
        info!(
            mal_id = seed.mal_id,
            title = %base_title,
            related = walk.records.len(),
            seasons = seasons.len(),
            "Resolved seasons"
        );

        Ok(Resolution {
            outcome: ResolutionOutcome::Done,
            base_title,
            cover_image,
            rating: seed.rounded_score(),
            mal_id: seed.mal_id,
            seasons,
        })
    }

    fn transition(mal_id: i32, from: ResolutionState, to: ResolutionState) -> ResolutionState {
        debug!(mal_id, ?from, ?to, "Resolution state change");
        to
    }

    fn fallback(seed: &SeedSelection, base_title: String) -> Resolution {
        Resolution {
            outcome: ResolutionOutcome::Fallback,
            base_title,
            cover_image: seed.image_url.clone(),
            rating: seed.rounded_score(),
            mal_id: seed.mal_id,
            seasons: vec![fallback_entry(seed)],
        }
    }
}
