//! Per-credential request counting for the lifetime of the process.

use std::collections::HashMap;

use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct UsageTracker {
    counts: Mutex<HashMap<String, u64>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request for `key` and return the new total.
    pub async fn record(&self, key: &str) -> u64 {
        let mut counts = self.counts.lock().await;
        let entry = counts.entry(key.to_string()).or_insert(0);
        *entry = entry.saturating_add(1);
        let total = *entry;
        drop(counts);
        tracing::info!(
            "Request from user {}. Total requests: {}",
            mask_key(key),
            total
        );
        total
    }

    pub async fn count(&self, key: &str) -> u64 {
        self.counts.lock().await.get(key).copied().unwrap_or(0)
    }
}

/// First four characters of a credential followed by an ellipsis.
pub fn mask_key(key: &str) -> String {
    let mut chars = key.chars();
    let prefix: String = chars.by_ref().take(4).collect();
    if chars.next().is_some() {
        format!("{prefix}…")
    } else {
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_record_increments_by_one() {
        let t = UsageTracker::new();
        assert_eq!(t.count("k").await, 0);
        assert_eq!(t.record("k").await, 1);
        assert_eq!(t.record("k").await, 2);
        assert_eq!(t.record("other").await, 1);
        assert_eq!(t.count("k").await, 2);
        assert_eq!(t.count("other").await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_records_are_exact() {
        let t = Arc::new(UsageTracker::new());
        let mut handles = Vec::new();
        for _ in 0..50 {
            let t = t.clone();
            handles.push(tokio::spawn(async move { t.record("shared").await }));
        }
        let mut seen = Vec::new();
        for h in handles {
            seen.push(h.await.unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=50).collect::<Vec<u64>>());
        assert_eq!(t.count("shared").await, 50);
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("secret-token"), "secr…");
        assert_eq!(mask_key("abc"), "abc");
        assert_eq!(mask_key("abcd"), "abcd");
        assert_eq!(mask_key(""), "");
    }
}
