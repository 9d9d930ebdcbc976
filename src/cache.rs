use sha2::{Digest, Sha256};
use std::time::Instant;

// Cached backend analysis with timestamp
#[derive(Clone)]
pub struct CacheEntry {
    pub response: String,
    pub created_at: Instant,
}

// Create a cache key (hash of the article URL)
pub fn make_cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url);
    format!("{:x}", hasher.finalize())
}
