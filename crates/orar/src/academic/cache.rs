//! TTL-based caching for the academic year structure.

use super::types::{AcademicYearStructure, Language};
use crate::error::OrarError;
use crate::fetch::DocumentFetcher;
use dashmap::DashMap;
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Source of the current instant, replaceable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut offset) = self.offset.lock() {
            *offset += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().map(|o| *o).unwrap_or_default();
        self.start + offset
    }
}

/// A cached structure with the instant it was scraped.
#[derive(Clone)]
struct CachedStructure {
    value: AcademicYearStructure,
    fetched_at: Instant,
}

/// Process-wide cache of academic year structures, one per language line.
///
/// Entries are replaced whole: value and timestamp are swapped together.
/// Concurrent misses are coalesced so only one scrape runs at a time.
pub struct AcademicCalendarCache {
    entries: DashMap<Language, CachedStructure>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl AcademicCalendarCache {
    /// Creates a new cache with the specified TTL.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a cache with a 24-hour TTL.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(24 * 60 * 60))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Gets a cached structure if it exists and hasn't expired.
    pub fn get(&self, language: Language) -> Option<AcademicYearStructure> {
        let now = self.clock.now();
        self.entries.get(&language).and_then(|entry| {
            if now.duration_since(entry.fetched_at) < self.ttl {
                Some(entry.value.clone())
            } else {
                // Entry expired, remove it
                drop(entry);
                self.entries.remove(&language);
                None
            }
        })
    }

    /// Replaces the cached structures with a fresh scrape.
    ///
    /// Language lines missing from `structures` are dropped.
    pub fn store(&self, structures: Vec<AcademicYearStructure>) {
        let fetched_at = self.clock.now();
        let present: HashSet<Language> = structures.iter().map(|s| s.language).collect();
        self.entries.retain(|language, _| present.contains(language));
        for value in structures {
            self.entries.insert(value.language, CachedStructure { value, fetched_at });
        }
    }

    /// Runs `scrape` and stores its result.
    ///
    /// On failure the previous entries are left untouched.
    pub async fn refresh_with<F, Fut>(&self, scrape: F) -> Result<usize, OrarError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<AcademicYearStructure>, OrarError>>,
    {
        let structures = scrape().await?;
        let count = structures.len();
        self.store(structures);
        info!(structures = count, "Refreshed academic calendar cache");
        Ok(count)
    }

    /// Scrapes `url` and swaps in the result, whatever the age of the cached entries.
    pub async fn refresh(&self, fetcher: &DocumentFetcher, url: &str) -> Result<usize, OrarError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_with(|| super::scrape_academic_calendar(fetcher, url))
            .await
    }

    /// Returns the fresh structure for `language`, scraping on a miss.
    pub async fn get_or_refresh_with<F, Fut>(
        &self,
        language: Language,
        scrape: F,
    ) -> Result<AcademicYearStructure, OrarError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<AcademicYearStructure>, OrarError>>,
    {
        if let Some(cached) = self.get(language) {
            debug!(language = %language, "Returning cached academic calendar");
            return Ok(cached);
        }

        let _guard = self.refresh_lock.lock().await;

        // Double-check cache after acquiring lock
        if let Some(cached) = self.get(language) {
            debug!(language = %language, "Returning cached academic calendar (post-lock)");
            return Ok(cached);
        }

        if let Err(e) = self.refresh_with(scrape).await {
            warn!(language = %language, error = %e, "Academic calendar refresh failed");
            return Err(e);
        }

        self.get(language).ok_or_else(|| OrarError::CalendarScrape {
            message: format!("no structure table for the {} line", language),
        })
    }

    /// Returns the fresh structure for `language`, scraping `url` on a miss.
    pub async fn get_or_refresh(
        &self,
        language: Language,
        fetcher: &DocumentFetcher,
        url: &str,
    ) -> Result<AcademicYearStructure, OrarError> {
        self.get_or_refresh_with(language, || super::scrape_academic_calendar(fetcher, url))
            .await
    }

    /// Invalidates (removes) a cached entry.
    pub fn invalidate(&self, language: Language) {
        self.entries.remove(&language);
    }

    /// Clears all entries from the cache.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns true if the cache is empty (expired entries included).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AcademicCalendarCache {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::academic::fixtures::STRUCTURE_PAGE;
    use crate::academic::parse_academic_calendar;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn cache_with_clock() -> (AcademicCalendarCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (AcademicCalendarCache::with_clock(DAY, clock.clone()), clock)
    }

    async fn scrape_ok(calls: &AtomicUsize) -> Result<Vec<AcademicYearStructure>, OrarError> {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        parse_academic_calendar(STRUCTURE_PAGE, Utc::now())
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let (cache, clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        cache
            .get_or_refresh_with(Language::RoEn, || scrape_ok(&calls))
            .await
            .unwrap();
        assert!(cache.get(Language::HuDe).is_some());

        clock.advance(DAY - Duration::from_secs(1));
        assert!(cache.get(Language::RoEn).is_some());

        clock.advance(Duration::from_secs(1));
        assert!(cache.get(Language::RoEn).is_none());

        cache
            .get_or_refresh_with(Language::RoEn, || scrape_ok(&calls))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_scrape_once() {
        let (cache, _clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        let (a, b) = tokio::join!(
            cache.get_or_refresh_with(Language::RoEn, || scrape_ok(&calls)),
            cache.get_or_refresh_with(Language::HuDe, || scrape_ok(&calls)),
        );
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_value() {
        let (cache, _clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);
        cache
            .get_or_refresh_with(Language::RoEn, || scrape_ok(&calls))
            .await
            .unwrap();

        let err = cache
            .refresh_with(|| async {
                Err(OrarError::CalendarScrape {
                    message: "timed out".to_string(),
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OrarError::CalendarScrape { .. }));
        assert!(cache.get(Language::RoEn).is_some());
    }

    #[tokio::test]
    async fn test_refresh_drops_missing_language_lines() {
        let (cache, _clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);
        cache
            .get_or_refresh_with(Language::RoEn, || scrape_ok(&calls))
            .await
            .unwrap();
        assert!(cache.get(Language::HuDe).is_some());

        cache
            .refresh_with(|| async {
                let mut structures = parse_academic_calendar(STRUCTURE_PAGE, Utc::now()).unwrap();
                structures.retain(|s| s.language == Language::RoEn);
                Ok(structures)
            })
            .await
            .unwrap();
        assert!(cache.get(Language::RoEn).is_some());
        assert!(cache.get(Language::HuDe).is_none());
    }

    #[tokio::test]
    async fn test_miss_with_failing_scrape_is_error() {
        let cache = AcademicCalendarCache::with_default_ttl();
        let result = cache
            .get_or_refresh_with(Language::RoEn, || async {
                Err(OrarError::Network {
                    message: "dns".to_string(),
                })
            })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
