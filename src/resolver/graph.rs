use std::collections::{HashMap, HashSet, VecDeque};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::ResolveError;
use super::fetcher::MetadataFetcher;
use crate::models::anime::AnimeRecord;

/// Everything reachable from a seed through season edges.
#[derive(Debug, Clone, Default)]
pub struct RelationWalk {
    /// One record per visited id that could be fetched, in visit order.
    pub records: Vec<AnimeRecord>,
    pub visited: usize,
}

impl RelationWalk {
    #[must_use]
    pub fn get(&self, mal_id: i32) -> Option<&AnimeRecord> {
        self.records.iter().find(|r| r.id == mal_id)
    }

    #[must_use]
    pub fn contains(&self, mal_id: i32) -> bool {
        self.get(mal_id).is_some()
    }
}

/// Breadth-first walk over Sequel, Prequel and Season relations.
pub struct RelationGraphWalker<'a> {
    fetcher: &'a MetadataFetcher,
    cache: HashMap<i32, AnimeRecord>,
    cancel: CancellationToken,
}

impl<'a> RelationGraphWalker<'a> {
    #[must_use]
    pub fn new(fetcher: &'a MetadataFetcher, cancel: CancellationToken) -> Self {
        Self {
            fetcher,
            cache: HashMap::new(),
            cancel,
        }
    }

    /// Records already in hand; their ids are never fetched again.
    #[must_use]
    pub fn with_cache(mut self, records: impl IntoIterator<Item = AnimeRecord>) -> Self {
        self.cache
            .extend(records.into_iter().map(|record| (record.id, record)));
        self
    }

    pub async fn walk(mut self, seed: i32) -> Result<RelationWalk, ResolveError> {
        let mut queue = VecDeque::from([seed]);
        let mut queued = HashSet::from([seed]);
        let mut visited = HashSet::new();
        let mut records = Vec::new();

        while let Some(mal_id) = queue.pop_front() {
            if !visited.insert(mal_id) {
                continue;
            }

            let record = match self.cache.remove(&mal_id) {
                Some(record) => Some(record),
                None => {
                    if self.cancel.is_cancelled() {
                        return Err(ResolveError::Cancelled);
                    }
                    tokio::select! {
                        biased;
                        () = self.cancel.cancelled() => return Err(ResolveError::Cancelled),
                        record = self.fetcher.fetch(mal_id) => record,
                    }
                }
            };

            let Some(record) = record else {
                continue;
            };

            for target in record.season_relation_targets() {
                if !visited.contains(&target) && queued.insert(target) {
                    queue.push_back(target);
                }
            }
            records.push(record);
        }

        debug!(
            seed,
            visited = visited.len(),
            found = records.len(),
            "Relation walk finished"
        );

        Ok(RelationWalk {
            records,
            visited: visited.len(),
        })
    }
}
