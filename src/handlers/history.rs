use axum::{Json, extract::State};
use std::sync::Arc;

use crate::models::HistoryResponse;
use crate::state::AppState;

pub async fn history_handler(State(state): State<Arc<AppState>>) -> Json<HistoryResponse> {
    let articles = state.history.recent();
    let total = articles.len();
    Json(HistoryResponse {
        articles,
        source: "memory",
        total,
    })
}
