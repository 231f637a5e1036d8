//! Single-slot, time-bounded cache for the rendered news digest.

use crate::clock::{Clock, SystemClock};
use crate::news::RenderedNews;
use chrono::{DateTime, Utc};
use mandi_core::AppResult;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Reply used when no digest can be produced.
pub const NO_NEWS_MESSAGE: &str =
    "📰 Sorry, no agriculture news is available right now. Please try again later.";

#[derive(Debug, Clone)]
struct CacheEntry {
    content: RenderedNews,
    captured_at: DateTime<Utc>,
}

/// Holds at most one rendered digest together with its capture time.
///
/// The slot is checked and replaced under a lock, but the fetch itself runs
/// unlocked: concurrent callers that both see a stale slot may both fetch,
/// and the last successful write wins.
pub struct NewsCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<CacheEntry>>,
}

impl NewsCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached digest while fresh, otherwise refresh it via `fetch`.
    ///
    /// The slot is not locked while `fetch` runs. Concurrent misses may each
    /// refresh, and the last one to finish wins.
    ///
    /// # Arguments
    /// * `fetch` - Produces a freshly rendered digest; only called on a miss
    ///
    /// # Returns
    /// The cached or refreshed rendering. A failed or empty fetch leaves the
    /// slot as it was and yields [`NO_NEWS_MESSAGE`] in both renderings.
    pub async fn get<F, Fut>(&self, fetch: F) -> RenderedNews
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<RenderedNews>>,
    {
        let now = self.clock.now();

        if let Some(entry) = self.slot.lock().await.as_ref() {
            if self.is_fresh(entry, now) {
                tracing::debug!("Serving cached news from {}", entry.captured_at);
                return entry.content.clone();
            }
        }

        match fetch().await {
            Ok(content) if !content.is_empty() => {
                let entry = CacheEntry {
                    content: content.clone(),
                    captured_at: self.clock.now(),
                };
                *self.slot.lock().await = Some(entry);
                tracing::info!("News cache refreshed");
                content
            }
            Ok(_) => {
                tracing::warn!("News fetch returned no content; cache left untouched");
                unavailable()
            }
            Err(e) => {
                tracing::warn!("News fetch failed: {}; cache left untouched", e);
                unavailable()
            }
        }
    }

    /// Capture time of the current slot, if any.
    pub async fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.slot.lock().await.as_ref().map(|e| e.captured_at)
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        // A capture time in the future (clock stepped back) counts as stale
        (now - entry.captured_at)
            .to_std()
            .map(|age| age < self.ttl)
            .unwrap_or(false)
    }
}

fn unavailable() -> RenderedNews {
    RenderedNews {
        rich: NO_NEWS_MESSAGE.to_string(),
        plain: NO_NEWS_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use mandi_core::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const HOUR: Duration = Duration::from_secs(3600);

    fn rendered(text: &str) -> RenderedNews {
        RenderedNews {
            rich: format!("<b>{}</b>", text),
            plain: text.to_string(),
        }
    }

    fn setup() -> (Arc<ManualClock>, NewsCache) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = NewsCache::with_clock(HOUR, clock.clone());
        (clock, cache)
    }

    #[tokio::test]
    async fn test_fetches_once_within_window() {
        let (clock, cache) = setup();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let fetch = || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(rendered("kharif"))
        };

        let first = cache.get(fetch).await;
        clock.advance_secs(3599);
        let second = cache.get(fetch).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(second.plain, "kharif");
    }

    #[tokio::test]
    async fn test_refetches_after_window() {
        let (clock, cache) = setup();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let fetch = || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Ok(rendered(&format!("digest {}", n)))
        };

        cache.get(fetch).await;
        clock.advance_secs(3600);
        let refreshed = cache.get(fetch).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(refreshed.plain, "digest 1");
        assert_eq!(cache.captured_at().await, Some(clock.now()));
    }

    #[tokio::test]
    async fn test_failure_does_not_populate_slot() {
        let (_clock, cache) = setup();

        let result = cache
            .get(|| async { Err(AppError::Fetch("offline".to_string())) })
            .await;

        assert_eq!(result.plain, NO_NEWS_MESSAGE);
        assert!(cache.captured_at().await.is_none());

        // The next call tries again
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        cache
            .get(|| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(rendered("back online"))
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_stale_entry() {
        let (clock, cache) = setup();
        cache.get(|| async { Ok(rendered("old")) }).await;
        let captured = cache.captured_at().await;

        clock.advance_secs(7200);
        let result = cache.get(|| async { Ok(RenderedNews::default()) }).await;

        assert_eq!(result.plain, NO_NEWS_MESSAGE);
        assert_eq!(cache.captured_at().await, captured);
    }

    #[tokio::test]
    async fn test_concurrent_stale_readers_leave_consistent_slot() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = Arc::new(NewsCache::with_clock(HOUR, clock.clone()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache
                        .get(|| async move { Ok(rendered(&format!("writer {}", i))) })
                        .await
                })
            })
            .collect();

        for handle in handles {
            let content = handle.await.unwrap();
            assert!(content.plain.starts_with("writer "));
            // Both renderings always come from the same write
            assert_eq!(content.rich, format!("<b>{}</b>", content.plain));
        }

        let cached = cache.get(|| async { Ok(rendered("unused")) }).await;
        assert_eq!(cached.rich, format!("<b>{}</b>", cached.plain));
        assert_ne!(cached.plain, "unused");
    }
}
