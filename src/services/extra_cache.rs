/// Supplementary content cache
///
/// Wraps a [`ContentProvider`] so that asking for the same quote or trivia fact
/// twice within the freshness window costs one provider call. Entries are keyed by
/// (title, year, kind), expire after a fixed TTL, and the map is bounded: every
/// write that pushes it past capacity first drops expired entries, then the oldest
/// inserted ones.
///
/// The cache does not coalesce concurrent misses for the same key; callers keep at
/// most one request in flight per movie. Failures are never cached.
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::ContentKind,
    services::{clock::Clock, providers::ContentProvider},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtraKey {
    title: String,
    year: String,
    kind: ContentKind,
}

impl ExtraKey {
    pub fn new(title: &str, year: &str, kind: ContentKind) -> Self {
        Self {
            title: title.to_string(),
            year: year.to_string(),
            kind,
        }
    }
}

impl Display for ExtraKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "extra:{}-{}-{}", self.title, self.year, self.kind)
    }
}

struct CacheEntry {
    value: String,
    inserted_at: DateTime<Utc>,
    /// Insertion order; a rewrite of the same key counts as a fresh insertion
    seq: u64,
}

#[derive(Default)]
struct Entries {
    map: HashMap<ExtraKey, CacheEntry>,
    next_seq: u64,
}

pub struct ExtraContentCache {
    provider: Arc<dyn ContentProvider>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    capacity: usize,
    entries: Mutex<Entries>,
}

impl ExtraContentCache {
    pub fn new(
        provider: Arc<dyn ContentProvider>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        capacity: usize,
    ) -> Self {
        Self {
            provider,
            clock,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            capacity,
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Returns the quote or trivia text for a movie, calling the provider only on a miss
    ///
    /// A provider failure surfaces as [`AppError::ContentUnavailable`] and leaves the
    /// cache untouched, so the next call retries.
    pub async fn fetch(&self, title: &str, year: &str, kind: ContentKind) -> AppResult<String> {
        let key = ExtraKey::new(title, year, kind);

        if let Some(value) = self.get_fresh(&key).await {
            tracing::debug!(key = %key, "Extra cache hit");
            return Ok(value);
        }

        tracing::debug!(key = %key, "Extra cache miss");

        let value = self
            .provider
            .fetch_content(title, year, kind)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    key = %key,
                    provider = self.provider.name(),
                    "Extra content fetch failed"
                );
                AppError::ContentUnavailable(e.to_string())
            })?;

        self.store(key, value.clone()).await;

        Ok(value)
    }

    /// Number of entries physically held, expired or not
    pub async fn len(&self) -> usize {
        self.entries.lock().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Age of an entry; an entry stamped in the future (clock stepped back) is
    /// treated as infinitely old
    fn age(entry: &CacheEntry, now: DateTime<Utc>) -> TimeDelta {
        let age = now.signed_duration_since(entry.inserted_at);
        if age < TimeDelta::zero() {
            TimeDelta::MAX
        } else {
            age
        }
    }

    /// Reads stop trusting an entry once the window has fully elapsed
    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        Self::age(entry, now) >= self.ttl
    }

    /// The capacity sweep only drops entries strictly older than the window
    fn is_past_ttl(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        Self::age(entry, now) > self.ttl
    }

    async fn get_fresh(&self, key: &ExtraKey) -> Option<String> {
        let now = self.clock.now();
        let entries = self.entries.lock().await;

        entries
            .map
            .get(key)
            .filter(|entry| !self.is_expired(entry, now))
            .map(|entry| entry.value.clone())
    }

    async fn store(&self, key: ExtraKey, value: String) {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        let seq = entries.next_seq;
        entries.next_seq += 1;
        entries.map.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
                seq,
            },
        );

        self.maintain(&mut entries, now);
    }

    /// Brings the map back under capacity: expired entries first, then oldest inserted
    fn maintain(&self, entries: &mut Entries, now: DateTime<Utc>) {
        if entries.map.len() <= self.capacity {
            return;
        }

        let before = entries.map.len();
        entries.map.retain(|_, entry| !self.is_past_ttl(entry, now));
        let expired = before - entries.map.len();

        let overflow = entries.map.len().saturating_sub(self.capacity);
        if overflow > 0 {
            let mut by_age: Vec<(u64, ExtraKey)> = entries
                .map
                .iter()
                .map(|(key, entry)| (entry.seq, key.clone()))
                .collect();
            by_age.sort_unstable_by_key(|(seq, _)| *seq);

            for (_, key) in by_age.into_iter().take(overflow) {
                entries.map.remove(&key);
            }
        }

        tracing::debug!(
            expired,
            evicted = overflow,
            remaining = entries.map.len(),
            "Extra cache trimmed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::ManualClock;
    use crate::services::providers::MockContentProvider;
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    const TTL: Duration = Duration::from_secs(300);

    fn cache_with(
        provider: MockContentProvider,
        clock: Arc<ManualClock>,
        capacity: usize,
    ) -> ExtraContentCache {
        ExtraContentCache::new(Arc::new(provider), clock, TTL, capacity)
    }

    fn echo_provider() -> MockContentProvider {
        let mut provider = MockContentProvider::new();
        provider
            .expect_fetch_content()
            .returning(|title, _, kind| Ok(format!("{} {}", kind, title)));
        provider.expect_name().return_const("mock");
        provider
    }

    #[test]
    fn test_extra_key_display() {
        let key = ExtraKey::new("Sholay", "1975", ContentKind::Trivia);
        assert_eq!(format!("{}", key), "extra:Sholay-1975-trivia");
    }

    #[tokio::test]
    async fn test_second_fetch_within_ttl_is_served_from_cache() {
        let mut provider = MockContentProvider::new();
        provider
            .expect_fetch_content()
            .with(eq("Sholay"), eq("1975"), eq(ContentKind::Quote))
            .times(1)
            .returning(|_, _, _| Ok("Kitne aadmi the?".to_string()));
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(provider, clock.clone(), 50);

        let first = assert_ok!(cache.fetch("Sholay", "1975", ContentKind::Quote).await);
        clock.advance(Duration::from_secs(299));
        let second = assert_ok!(cache.fetch("Sholay", "1975", ContentKind::Quote).await);

        assert_eq!(first, "Kitne aadmi the?");
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_trivia_refetched_after_expiry() {
        let mut provider = MockContentProvider::new();
        let mut seq = mockall::Sequence::new();
        provider
            .expect_fetch_content()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok("Fact X".to_string()));
        provider
            .expect_fetch_content()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok("Fact Y".to_string()));
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(provider, clock.clone(), 50);

        assert_eq!(
            cache.fetch("Sholay", "1975", ContentKind::Trivia).await.unwrap(),
            "Fact X"
        );
        assert_eq!(
            cache.fetch("Sholay", "1975", ContentKind::Trivia).await.unwrap(),
            "Fact X"
        );

        clock.advance(TTL);

        assert_eq!(
            cache.fetch("Sholay", "1975", ContentKind::Trivia).await.unwrap(),
            "Fact Y"
        );
    }

    #[tokio::test]
    async fn test_kinds_are_cached_independently() {
        let mut provider = MockContentProvider::new();
        provider
            .expect_fetch_content()
            .times(2)
            .returning(|_, _, kind| Ok(format!("{} text", kind)));
        let cache = cache_with(provider, Arc::new(ManualClock::default()), 50);

        let quote = cache.fetch("RRR", "2022", ContentKind::Quote).await.unwrap();
        let trivia = cache.fetch("RRR", "2022", ContentKind::Trivia).await.unwrap();
        let quote_again = cache.fetch("RRR", "2022", ContentKind::Quote).await.unwrap();

        assert_eq!(quote, "quote text");
        assert_eq!(trivia, "trivia text");
        assert_eq!(quote_again, quote);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let mut provider = MockContentProvider::new();
        let mut seq = mockall::Sequence::new();
        provider
            .expect_fetch_content()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Err(AppError::ExternalApi("timeout".to_string())));
        provider
            .expect_fetch_content()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok("Recovered".to_string()));
        provider.expect_name().return_const("mock");
        let cache = cache_with(provider, Arc::new(ManualClock::default()), 50);

        let err = assert_err!(cache.fetch("Queen", "2013", ContentKind::Trivia).await);
        assert!(matches!(err, AppError::ContentUnavailable(_)));
        assert!(cache.is_empty().await);

        let value = assert_ok!(cache.fetch("Queen", "2013", ContentKind::Trivia).await);
        assert_eq!(value, "Recovered");
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_inserted() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(echo_provider(), clock.clone(), 3);

        for title in ["A", "B", "C", "D", "E"] {
            cache.fetch(title, "2000", ContentKind::Quote).await.unwrap();
            clock.advance(Duration::from_secs(1));
            assert!(cache.len().await <= 3);
        }

        let entries = cache.entries.lock().await;
        let mut titles: Vec<&str> = entries.map.keys().map(|k| k.title.as_str()).collect();
        titles.sort_unstable();
        assert_eq!(titles, vec!["C", "D", "E"]);
    }

    #[tokio::test]
    async fn test_expired_entries_go_before_fresh_ones() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(echo_provider(), clock.clone(), 3);

        cache.fetch("Old", "1990", ContentKind::Quote).await.unwrap();
        cache.fetch("Older", "1980", ContentKind::Quote).await.unwrap();
        clock.advance(TTL + Duration::from_secs(1));
        cache.fetch("A", "2000", ContentKind::Quote).await.unwrap();
        cache.fetch("B", "2000", ContentKind::Quote).await.unwrap();

        // Both stale entries are swept, not just the one overflow slot
        let entries = cache.entries.lock().await;
        let mut titles: Vec<&str> = entries.map.keys().map(|k| k.title.as_str()).collect();
        titles.sort_unstable();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_sweep_keeps_entries_exactly_at_ttl() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(echo_provider(), clock.clone(), 3);

        cache.fetch("A", "2000", ContentKind::Quote).await.unwrap();
        cache.fetch("B", "2000", ContentKind::Quote).await.unwrap();
        clock.advance(TTL);
        cache.fetch("C", "2000", ContentKind::Quote).await.unwrap();
        cache.fetch("D", "2000", ContentKind::Quote).await.unwrap();

        let entries = cache.entries.lock().await;
        let mut titles: Vec<&str> = entries.map.keys().map(|k| k.title.as_str()).collect();
        titles.sort_unstable();
        assert_eq!(titles, vec!["B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_clock_stepping_back_forces_refetch() {
        let mut provider = MockContentProvider::new();
        provider
            .expect_fetch_content()
            .times(2)
            .returning(|_, _, _| Ok("Pushpa, I hate tears".to_string()));
        let clock = Arc::new(ManualClock::default());
        clock.advance(Duration::from_secs(3600));
        let cache = cache_with(provider, clock.clone(), 50);

        cache.fetch("Bawarchi", "1972", ContentKind::Quote).await.unwrap();
        clock.set(DateTime::<Utc>::UNIX_EPOCH);
        cache.fetch("Bawarchi", "1972", ContentKind::Quote).await.unwrap();

        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entries_linger_until_capacity_pressure() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(echo_provider(), clock.clone(), 5);

        cache.fetch("A", "2000", ContentKind::Quote).await.unwrap();
        clock.advance(TTL * 2);
        cache.fetch("B", "2000", ContentKind::Quote).await.unwrap();

        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_refreshed_entry_moves_to_back_of_eviction_order() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(echo_provider(), clock.clone(), 2);

        cache.fetch("A", "2000", ContentKind::Quote).await.unwrap();
        clock.advance(Duration::from_secs(10));
        cache.fetch("B", "2000", ContentKind::Quote).await.unwrap();
        clock.advance(TTL - Duration::from_secs(10));
        // A has expired and is rewritten, so B is now the oldest insertion
        cache.fetch("A", "2000", ContentKind::Quote).await.unwrap();
        clock.advance(Duration::from_secs(1));
        cache.fetch("C", "2000", ContentKind::Quote).await.unwrap();

        let entries = cache.entries.lock().await;
        let mut titles: Vec<&str> = entries.map.keys().map(|k| k.title.as_str()).collect();
        titles.sort_unstable();
        assert_eq!(titles, vec!["A", "C"]);
    }
}
