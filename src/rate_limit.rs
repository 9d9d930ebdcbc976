use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::HeaderMap;
use dashmap::DashMap;
use tracing::warn;

use crate::metrics::LIMITER_KEYS;
use crate::remote::RemoteStore;

// Admission policy: compiled in, not a flag.
pub const LIMIT: u32 = 100;
pub const WINDOW_MS: u64 = 60 * 60 * 1000; // 1 hour

// Clients that send no forwarded address all share this bucket.
pub const DEFAULT_CLIENT_KEY: &str = "127.0.0.1";

/// Outcome of an admission check. `reset_at` is epoch milliseconds at which
/// the caller's current window expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub admitted: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: u64,
}

// Per-key window record, created lazily on first request.
struct QuotaWindow {
    count: u32,
    window_start_ms: u64,
}

// Backing strategy, picked once at construction. The local map lives on the
// limiter itself either way: in remote mode it doubles as the fallback store.
enum Strategy {
    Remote(RemoteStore),
    Local,
}

/// Fixed-window admission controller keyed by client address.
///
/// With a remote counter store configured the store is the system of record;
/// the first failed call marks it unhealthy for the rest of the process and
/// every check from then on is answered from the in-memory map. A check never
/// fails: the only caller-visible outcome is a `Decision`.
pub struct RateLimiter {
    strategy: Strategy,
    remote_healthy: AtomicBool,
    windows: DashMap<String, QuotaWindow>,
    limit: u32,
    window_ms: u64,
}

impl RateLimiter {
    pub fn new(remote: Option<RemoteStore>) -> Self {
        let strategy = match remote {
            Some(store) => Strategy::Remote(store),
            None => Strategy::Local,
        };
        Self {
            strategy,
            remote_healthy: AtomicBool::new(true),
            windows: DashMap::new(),
            limit: LIMIT,
            window_ms: WINDOW_MS,
        }
    }

    /// Local-only limiter with an arbitrary policy. Used by tests to scale
    /// the window down; production code goes through `new`.
    pub fn with_policy(limit: u32, window_ms: u64) -> Self {
        Self {
            strategy: Strategy::Local,
            remote_healthy: AtomicBool::new(true),
            windows: DashMap::new(),
            limit,
            window_ms,
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        match &self.strategy {
            Strategy::Remote(_) if self.remote_healthy.load(Ordering::Relaxed) => "remote",
            _ => "local",
        }
    }

    /// Admit or reject one request from `key`.
    pub async fn check(&self, key: &str) -> Decision {
        if let Strategy::Remote(store) = &self.strategy {
            if self.remote_healthy.load(Ordering::Relaxed) {
                match store.sliding_window(key).await {
                    Ok(decision) => return decision,
                    Err(e) => {
                        // Pin to the local map so the two stores never
                        // count the same key concurrently.
                        warn!(error = %e, "counter store unavailable, switching to in-memory windows");
                        self.remote_healthy.store(false, Ordering::Relaxed);
                    }
                }
            }
        }
        self.check_local_at(key, now_ms())
    }

    // The DashMap entry guard serializes the read-modify-write per key, so
    // two overlapping checks cannot both observe count < limit.
    fn check_local_at(&self, key: &str, now_ms: u64) -> Decision {
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(QuotaWindow {
                count: 0,
                window_start_ms: now_ms,
            });

        // Window expired? The boundary itself starts a new window.
        if now_ms.saturating_sub(entry.window_start_ms) >= self.window_ms {
            entry.count = 0;
            entry.window_start_ms = now_ms;
        }

        let reset_at = entry.window_start_ms + self.window_ms;

        if entry.count >= self.limit {
            return Decision {
                admitted: false,
                limit: self.limit,
                remaining: 0,
                reset_at,
            };
        }

        entry.count += 1;
        Decision {
            admitted: true,
            limit: self.limit,
            remaining: self.limit - entry.count,
            reset_at,
        }
    }

    /// Drop windows that expired before `now_ms`. Called on an interval from
    /// a background task; without it the map grows with every distinct key.
    pub fn sweep_expired(&self, now_ms: u64) {
        self.windows
            .retain(|_, w| w.window_start_ms + self.window_ms > now_ms);
        LIMITER_KEYS.set(self.windows.len() as f64);
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

/// Client key for admission: first entry of `x-forwarded-for`, or the shared
/// default when the header is missing or empty.
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_CLIENT_KEY)
        .to_string()
}
