use clap::Parser;

// CLI argument structure. The admission policy (100 requests / 1 hour) is
// compiled into the limiter and deliberately not a flag.
#[derive(Parser, Debug, Clone)]
#[command(name = "sentiment-gateway")]
#[command(about = "Gateway for a news-article sentiment analysis backend")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Analysis backend URL
    #[arg(short, long, default_value = "http://localhost:8000")]
    pub backend_url: String,

    // Cache TTL in seconds
    #[arg(short, long, default_value_t = 300)]
    pub cache_ttl: u64,

    // Interval between sweeps of expired limiter windows, in seconds
    #[arg(long, default_value_t = 600)]
    pub sweep_interval: u64,
}

/// Remote counter-store settings. Present only when both env values are set;
/// their absence selects the in-memory limiter for the whole process.
#[derive(Debug, Clone)]
pub struct RemoteStoreConfig {
    pub url: String,
    pub token: String,
}

impl RemoteStoreConfig {
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("COUNTER_STORE_URL").ok()?;
        let token = std::env::var("COUNTER_STORE_TOKEN").ok()?;
        if url.is_empty() || token.is_empty() {
            return None;
        }
        Some(Self { url, token })
    }
}
