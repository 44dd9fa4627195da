use std::sync::Arc;

use cache::TtlCache;
use config::Config;
use history::HistoryStore;
use routes::gold::model::GoldResponse;
use routes::rates::model::RatesPayload;
use upstream::Upstream;

pub mod cache;
pub mod config;
pub mod error;
pub mod history;
pub mod middleware;
pub mod router;
pub mod upstream;
pub mod utils;

pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub upstream: Upstream,
    pub rates_cache: Arc<TtlCache<RatesPayload>>,
    pub gold_cache: Arc<TtlCache<GoldResponse>>,
    pub history: Arc<HistoryStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let upstream = Upstream::new(&config);
        let rates_cache = Arc::new(TtlCache::new(config.rates_cache_duration()));
        let gold_cache = Arc::new(TtlCache::new(config.gold_cache_duration()));
        let history = Arc::new(HistoryStore::new(config.history_file.clone()));

        Self {
            config,
            upstream,
            rates_cache,
            gold_cache,
            history,
        }
    }
}
