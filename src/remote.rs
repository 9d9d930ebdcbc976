use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rate_limit::Decision;

// Kept short so the admission check never dominates request latency; the
// limiter falls back locally when this expires.
const STORE_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum RemoteStoreError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store answered {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Serialize)]
struct LimitRequest<'a> {
    identifier: &'a str,
    limit: u32,
    window_ms: u64,
}

// Wire shape of the store's sliding-window primitive.
#[derive(Deserialize)]
struct LimitResponse {
    success: bool,
    limit: u32,
    remaining: u32,
    reset: u64,
}

/// Client for the hosted counter store's sliding-window limiter.
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
    limit: u32,
    window_ms: u64,
}

impl RemoteStore {
    pub fn new(base_url: String, token: String, limit: u32, window_ms: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            limit,
            window_ms,
        }
    }

    /// One admit-and-count round trip for `key`. The store owns the window
    /// arithmetic; its answer is mapped straight into a `Decision`.
    pub async fn sliding_window(&self, key: &str) -> Result<Decision, RemoteStoreError> {
        let res = self
            .client
            .post(format!("{}/v1/limit", self.base_url))
            .bearer_auth(&self.token)
            .timeout(STORE_TIMEOUT)
            .json(&LimitRequest {
                identifier: key,
                limit: self.limit,
                window_ms: self.window_ms,
            })
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(RemoteStoreError::Status(res.status()));
        }

        let body: LimitResponse = res.json().await?;
        Ok(Decision {
            admitted: body.success,
            limit: body.limit,
            remaining: body.remaining,
            reset_at: body.reset,
        })
    }
}
