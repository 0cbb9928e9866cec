use std::sync::Arc;

use crate::clients::jikan::JikanClient;
use crate::config::Config;
use crate::db::Store;
use crate::resolver::{AnimeSource, SeasonResolver};
use crate::services::{UpdateChecker, WatchlistService};

/// Build the HTTP client shared by every Jikan caller.
fn build_shared_http_client(timeout_seconds: u64, user_agent: &str) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(user_agent)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub jikan: Arc<JikanClient>,

    pub resolver: SeasonResolver,

    pub watchlist: WatchlistService,

    pub update_checker: Arc<UpdateChecker>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(
            config.jikan.request_timeout_seconds,
            &config.jikan.user_agent,
        )?;
        let jikan = Arc::new(JikanClient::with_shared_client(
            http_client,
            &config.jikan.base_url,
        ));

        Ok(Self::from_parts(config, store, jikan))
    }

    /// Wires the services around an already opened store and metadata source.
    pub fn from_parts(config: Config, store: Store, jikan: Arc<JikanClient>) -> Self {
        let source: Arc<dyn AnimeSource> = jikan.clone();
        let resolver = SeasonResolver::from_config(source.clone(), &config);
        let watchlist = WatchlistService::new(store.clone());
        let update_checker = Arc::new(UpdateChecker::new(
            source,
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            config.jikan.min_request_interval(),
        ));

        Self {
            config,
            store,
            jikan,
            resolver,
            watchlist,
            update_checker,
        }
    }
}
