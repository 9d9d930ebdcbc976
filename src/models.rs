use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Inbound analysis request
#[derive(Deserialize, Serialize, Clone)]
pub struct AnalyzeRequest {
    pub url: String,
}

// Analysis backend response format
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalyzeResponse {
    pub heading: String,
    pub summary: String,
    pub sentiment: String,
    pub score: f64,
}

// One history entry: what was analyzed, and when
#[derive(Serialize, Clone)]
pub struct HistoryEntry {
    pub url: String,
    pub heading: String,
    pub summary: String,
    pub sentiment: String,
    pub score: f64,
    pub analyzed_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_analysis(url: &str, analysis: &AnalyzeResponse) -> Self {
        Self {
            url: url.to_string(),
            heading: analysis.heading.clone(),
            summary: analysis.summary.clone(),
            sentiment: analysis.sentiment.clone(),
            score: analysis.score,
            analyzed_at: Utc::now(),
        }
    }
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub articles: Vec<HistoryEntry>,
    pub source: &'static str,
    pub total: usize,
}
