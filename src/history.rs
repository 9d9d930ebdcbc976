use std::collections::VecDeque;
use std::sync::Mutex;

use crate::models::HistoryEntry;

// Newest entries beyond this are kept; older ones are dropped.
const HISTORY_CAP: usize = 100;

/// In-memory history of analyzed articles, newest first. The real database
/// behind the history view is an external service; this store is the
/// process-local fallback and does not survive restarts.
pub struct HistoryStore {
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, entry: HistoryEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_front(entry);
        entries.truncate(HISTORY_CAP);
    }

    pub fn recent(&self) -> Vec<HistoryEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalyzeResponse;

    fn entry(url: &str) -> HistoryEntry {
        HistoryEntry::from_analysis(
            url,
            &AnalyzeResponse {
                heading: "h".into(),
                summary: "s".into(),
                sentiment: "POSITIVE".into(),
                score: 0.9,
            },
        )
    }

    #[test]
    fn newest_entry_comes_first() {
        let store = HistoryStore::new();
        store.push(entry("https://a"));
        store.push(entry("https://b"));

        let recent = store.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].url, "https://b");
        assert_eq!(recent[1].url, "https://a");
    }

    #[test]
    fn history_is_capped() {
        let store = HistoryStore::new();
        for i in 0..(HISTORY_CAP + 10) {
            store.push(entry(&format!("https://example.com/{i}")));
        }
        let recent = store.recent();
        assert_eq!(recent.len(), HISTORY_CAP);
        // The oldest pushes fell off the back.
        assert_eq!(recent[0].url, format!("https://example.com/{}", HISTORY_CAP + 9));
    }
}
