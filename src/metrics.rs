use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("gateway_requests_total", "Total number of analyze requests").unwrap();
    pub static ref ADMITTED_TOTAL: Counter =
        register_counter!("gateway_admitted_total", "Requests admitted by the rate limiter")
            .unwrap();
    pub static ref REJECTED_TOTAL: Counter =
        register_counter!("gateway_rejected_total", "Requests rejected with 429").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("gateway_cache_hits_total", "Total cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("gateway_cache_misses_total", "Total cache misses").unwrap();
    pub static ref BACKEND_LATENCY: Histogram = register_histogram!(
        "gateway_backend_latency_seconds",
        "Analysis backend latency in seconds"
    )
    .unwrap();
    pub static ref LIMITER_KEYS: Gauge = register_gauge!(
        "gateway_limiter_keys",
        "Client keys currently tracked by the in-memory limiter"
    )
    .unwrap();
}
