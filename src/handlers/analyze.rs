use axum::http::HeaderMap;
use axum::{Json, extract::State};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::cache::{CacheEntry, make_cache_key};
use crate::error::ApiError;
use crate::metrics::{
    ADMITTED_TOTAL, BACKEND_LATENCY, CACHE_HITS, CACHE_MISSES, REJECTED_TOTAL, REQUEST_TOTAL,
};
use crate::models::{AnalyzeRequest, AnalyzeResponse, HistoryEntry};
use crate::rate_limit::client_key;
use crate::state::AppState;

// Scraping plus model inference on the backend side is slow; this bounds the
// wait rather than the admission check, which has its own timeout.
const BACKEND_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    REQUEST_TOTAL.inc();

    let key = client_key(&headers);
    let decision = state.rate_limiter.check(&key).await;
    if !decision.admitted {
        REJECTED_TOTAL.inc();
        info!(client = %key, reset_at = decision.reset_at, "request rejected by rate limit");
        return Err(ApiError::RateLimited {
            reset_at: decision.reset_at,
        });
    }
    ADMITTED_TOTAL.inc();

    if payload.url.trim().is_empty() {
        return Err(ApiError::InvalidRequest("url must not be empty".into()));
    }

    // Check cache first
    let cache_key = make_cache_key(&payload.url);
    if let Some(entry) = state.cache.get(&cache_key) {
        if entry.created_at.elapsed() < state.ttl {
            if let Ok(response) = serde_json::from_str::<AnalyzeResponse>(&entry.response) {
                CACHE_HITS.inc();
                debug!(url = %payload.url, "cache hit");
                return Ok(Json(response));
            }
        }
    }
    CACHE_MISSES.inc();

    let start_time = Instant::now();
    let result = state
        .client
        .post(format!("{}/analyze/", state.backend_url))
        .timeout(BACKEND_TIMEOUT)
        .json(&payload)
        .send()
        .await
        .map_err(|e| ApiError::Backend(format!("request failed: {e}")))?;
    BACKEND_LATENCY.observe(start_time.elapsed().as_secs_f64());

    if !result.status().is_success() {
        return Err(ApiError::Backend(format!(
            "backend answered {}",
            result.status()
        )));
    }

    let analysis: AnalyzeResponse = result
        .json()
        .await
        .map_err(|e| ApiError::Backend(format!("parse error: {e}")))?;

    if let Ok(json) = serde_json::to_string(&analysis) {
        state.cache.insert(
            cache_key,
            CacheEntry {
                response: json,
                created_at: Instant::now(),
            },
        );
    }
    state
        .history
        .push(HistoryEntry::from_analysis(&payload.url, &analysis));

    Ok(Json(analysis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimiter;
    use axum::extract::State;
    use dashmap::DashMap;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_state(backend_url: String, limiter: RateLimiter) -> Arc<AppState> {
        Arc::new(AppState {
            client: reqwest::Client::new(),
            backend_url,
            rate_limiter: limiter,
            cache: DashMap::new(),
            ttl: Duration::from_secs(300),
            history: crate::history::HistoryStore::new(),
        })
    }

    fn analysis_body() -> serde_json::Value {
        json!({
            "heading": "Markets rally",
            "summary": "Stocks rose on upbeat earnings.",
            "sentiment": "POSITIVE",
            "score": 0.93,
        })
    }

    #[tokio::test]
    async fn admitted_request_is_forwarded_and_recorded() {
        let backend = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(analysis_body()))
            .expect(1)
            .mount(&backend)
            .await;

        let state = test_state(backend.uri(), RateLimiter::with_policy(10, 60_000));
        let req = AnalyzeRequest {
            url: "https://example.com/story".into(),
        };

        let res = analyze_handler(State(Arc::clone(&state)), HeaderMap::new(), Json(req.clone()))
            .await
            .unwrap();
        assert_eq!(res.0.sentiment, "POSITIVE");
        assert_eq!(state.history.recent().len(), 1);

        // Second submission of the same URL is served from cache.
        let res = analyze_handler(State(Arc::clone(&state)), HeaderMap::new(), Json(req))
            .await
            .unwrap();
        assert_eq!(res.0.heading, "Markets rally");
        assert_eq!(state.history.recent().len(), 1);
    }

    #[tokio::test]
    async fn exhausted_quota_returns_rate_limited() {
        let backend = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(analysis_body()))
            .mount(&backend)
            .await;

        let state = test_state(backend.uri(), RateLimiter::with_policy(1, 3_600_000));
        let req = AnalyzeRequest {
            url: "https://example.com/story".into(),
        };

        let res = analyze_handler(State(Arc::clone(&state)), HeaderMap::new(), Json(req.clone()))
            .await
            .unwrap();
        assert_eq!(res.0.sentiment, "POSITIVE");

        let err = analyze_handler(State(state), HeaderMap::new(), Json(req))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn backend_failure_maps_to_backend_error() {
        let backend = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&backend)
            .await;

        let state = test_state(backend.uri(), RateLimiter::with_policy(10, 60_000));
        let err = analyze_handler(
            State(state),
            HeaderMap::new(),
            Json(AnalyzeRequest {
                url: "https://example.com/story".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Backend(_)));
    }

    #[tokio::test]
    async fn empty_url_is_rejected_before_the_backend() {
        let state = test_state("http://127.0.0.1:1".into(), RateLimiter::with_policy(10, 60_000));
        let err = analyze_handler(
            State(state),
            HeaderMap::new(),
            Json(AnalyzeRequest { url: "  ".into() }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}
