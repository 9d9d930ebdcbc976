use dashmap::DashMap;
use std::time::Duration;

use crate::cache::CacheEntry;
use crate::history::HistoryStore;
use crate::rate_limit::RateLimiter;

// App's shared state, built once in main and handed to every handler.
pub struct AppState {
    pub client: reqwest::Client,
    pub backend_url: String,
    pub rate_limiter: RateLimiter,
    pub cache: DashMap<String, CacheEntry>, // url hash -> CacheEntry
    pub ttl: Duration,                      // how long cached analyses stay valid
    pub history: HistoryStore,
}
