//! TTL and status logic on top of the persistent store
//!
//! `TtlCache` wraps a [`CouponStore`] with a fixed time-to-live and decides
//! whether the persisted entry is still fresh. It performs no caching of
//! its own; every call reads the store, so the file stays the single
//! source of truth across requests and process restarts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::store::{CacheEntry, CouponStore};

/// Default cache time-to-live in seconds (1 hour)
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Freshness classification of the persisted entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    /// No entry has ever been written (or it was cleared)
    NoCache,
    /// An entry exists and its age is below the TTL
    Valid,
    /// An entry exists but its age has reached the TTL
    Expired,
}

/// Read-only snapshot of the cache, computed at call time
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    /// Freshness classification
    pub state: CacheState,
    /// Seconds elapsed since the entry was stored, 0 when no entry exists
    pub age_seconds: i64,
    /// Seconds until the entry expires, 0 unless the entry is valid
    pub seconds_until_expiry: i64,
    /// Number of coupons in the entry
    pub coupon_count: usize,
    /// When the entry was stored
    pub last_updated: Option<DateTime<Utc>>,
}

impl CacheStatus {
    fn no_cache() -> Self {
        Self {
            state: CacheState::NoCache,
            age_seconds: 0,
            seconds_until_expiry: 0,
            coupon_count: 0,
            last_updated: None,
        }
    }
}

/// TTL wrapper around the persistent coupon store
#[derive(Debug, Clone)]
pub struct TtlCache {
    store: CouponStore,
    ttl_secs: u64,
}

impl TtlCache {
    /// Creates a cache over the given store with the default 1-hour TTL
    pub fn new(store: CouponStore) -> Self {
        Self::with_ttl(store, DEFAULT_TTL_SECS)
    }

    /// Creates a cache over the given store with a custom TTL in seconds
    pub fn with_ttl(store: CouponStore, ttl_secs: u64) -> Self {
        Self { store, ttl_secs }
    }

    /// Configured time-to-live in seconds
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Returns true iff a durable entry is present
    pub fn exists(&self) -> bool {
        self.store.exists()
    }

    /// Checks whether the persisted entry exists and has not expired
    ///
    /// An entry written at time T is valid for ages in `[0, ttl)` and
    /// invalid from `ttl` onwards. A missing entry, or one whose timestamp
    /// cannot be recovered, counts as invalid so that a refetch is
    /// preferred over serving possibly-corrupt data.
    pub fn is_valid(&self) -> bool {
        if !self.store.exists() {
            return false;
        }

        match self.store.read().stored_at {
            Some(stored_at) => self.age_of(stored_at) < self.ttl_secs as i64,
            None => false,
        }
    }

    /// Reads the persisted entry without any validity check
    ///
    /// The caller decides what to do with an expired or empty entry.
    pub fn get(&self) -> CacheEntry {
        self.store.read()
    }

    /// Persists a new entry, stamping it with the current time
    ///
    /// Any `stored_at` the caller pre-set is overwritten; inheriting a
    /// stale timestamp could make a freshly fetched entry appear already
    /// expired.
    pub fn update(&self, mut entry: CacheEntry) -> bool {
        entry.stored_at = Some(Utc::now());
        self.store.write(entry)
    }

    /// Removes the persisted entry
    pub fn clear(&self) -> bool {
        self.store.clear()
    }

    /// Computes a status snapshot from a fresh store read
    ///
    /// Racing a concurrent write is acceptable; the snapshot reflects
    /// whatever entry was on disk at read time.
    pub fn status(&self) -> CacheStatus {
        if !self.store.exists() {
            return CacheStatus::no_cache();
        }

        let entry = self.store.read();
        // An undecodable timestamp reads as the epoch, which reports the
        // entry as long expired rather than freshly valid.
        let stored_at = entry.stored_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let age_seconds = self.age_of(stored_at);
        let valid = age_seconds < self.ttl_secs as i64;

        CacheStatus {
            state: if valid {
                CacheState::Valid
            } else {
                CacheState::Expired
            },
            age_seconds,
            seconds_until_expiry: if valid {
                (self.ttl_secs as i64 - age_seconds).max(0)
            } else {
                0
            },
            coupon_count: entry.coupon_count(),
            last_updated: entry.stored_at,
        }
    }

    fn age_of(&self, stored_at: DateTime<Utc>) -> i64 {
        Utc::now().signed_duration_since(stored_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Coupon;
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_cache(ttl_secs: u64) -> (TtlCache, CouponStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CouponStore::with_path(temp_dir.path().join("coupons.json"));
        let cache = TtlCache::with_ttl(store.clone(), ttl_secs);
        (cache, store, temp_dir)
    }

    fn sample_coupons() -> Vec<Coupon> {
        vec![Coupon::new("ABC5", "2025-01-01T00:00:00")]
    }

    /// Writes an entry whose stored_at lies `age_secs` in the past,
    /// bypassing the update() stamping
    fn write_aged_entry(store: &CouponStore, age_secs: i64) {
        let entry = CacheEntry {
            coupons: Some(sample_coupons()),
            stored_at: Some(Utc::now() - Duration::seconds(age_secs)),
        };
        assert!(store.write(entry));
    }

    #[test]
    fn test_is_valid_false_when_store_empty() {
        let (cache, _store, _temp_dir) = create_test_cache(3600);
        assert!(!cache.is_valid());
    }

    #[test]
    fn test_is_valid_true_for_fresh_entry() {
        let (cache, _store, _temp_dir) = create_test_cache(3600);
        assert!(cache.update(CacheEntry::new(sample_coupons())));
        assert!(cache.is_valid());
    }

    #[test]
    fn test_is_valid_false_at_ttl_boundary() {
        let (cache, store, _temp_dir) = create_test_cache(3600);
        write_aged_entry(&store, 3600);
        assert!(!cache.is_valid(), "Entry aged exactly ttl should be invalid");
    }

    #[test]
    fn test_is_valid_false_past_ttl() {
        let (cache, store, _temp_dir) = create_test_cache(60);
        write_aged_entry(&store, 61);
        assert!(!cache.is_valid());
    }

    #[test]
    fn test_is_valid_true_just_under_ttl() {
        let (cache, store, _temp_dir) = create_test_cache(3600);
        write_aged_entry(&store, 3500);
        assert!(cache.is_valid());
    }

    #[test]
    fn test_is_valid_false_for_corrupt_entry() {
        let (cache, store, _temp_dir) = create_test_cache(3600);
        std::fs::write(store.path(), "garbage").expect("Should write garbage");
        assert!(!cache.is_valid(), "Undecodable entry should be invalid");
    }

    #[test]
    fn test_get_is_idempotent() {
        let (cache, _store, _temp_dir) = create_test_cache(3600);
        assert!(cache.update(CacheEntry::new(sample_coupons())));

        let first = cache.get();
        let second = cache.get();

        assert_eq!(first, second, "Repeated reads should return identical data");
    }

    #[test]
    fn test_update_stamps_fresh_time_over_caller_supplied() {
        let (cache, _store, _temp_dir) = create_test_cache(3600);
        let stale = CacheEntry {
            coupons: Some(sample_coupons()),
            stored_at: Some(Utc::now() - Duration::seconds(7200)),
        };

        assert!(cache.update(stale));

        assert!(
            cache.is_valid(),
            "Update should overwrite the stale timestamp with the current time"
        );
        let stored_at = cache.get().stored_at.expect("stored_at should be set");
        let age = Utc::now().signed_duration_since(stored_at).num_seconds();
        assert!(age < 5, "stored_at should be freshly stamped, got age {age}");
    }

    #[test]
    fn test_clear_invalidates_cache() {
        let (cache, _store, _temp_dir) = create_test_cache(3600);
        assert!(cache.update(CacheEntry::new(sample_coupons())));

        assert!(cache.clear());

        assert!(!cache.exists());
        assert!(!cache.is_valid());
    }

    #[test]
    fn test_status_no_cache() {
        let (cache, _store, _temp_dir) = create_test_cache(3600);

        let status = cache.status();

        assert_eq!(status.state, CacheState::NoCache);
        assert_eq!(status.age_seconds, 0);
        assert_eq!(status.seconds_until_expiry, 0);
        assert_eq!(status.coupon_count, 0);
        assert!(status.last_updated.is_none());
    }

    #[test]
    fn test_status_arithmetic_for_valid_entry() {
        let (cache, store, _temp_dir) = create_test_cache(3600);
        write_aged_entry(&store, 100);

        let status = cache.status();

        assert_eq!(status.state, CacheState::Valid);
        assert!(
            (100..=102).contains(&status.age_seconds),
            "Expected age around 100, got {}",
            status.age_seconds
        );
        assert!(
            (3498..=3500).contains(&status.seconds_until_expiry),
            "Expected expiry countdown around 3500, got {}",
            status.seconds_until_expiry
        );
        assert_eq!(status.coupon_count, 1);
        assert!(status.last_updated.is_some());
    }

    #[test]
    fn test_status_expired_entry_reports_zero_until_expiry() {
        let (cache, store, _temp_dir) = create_test_cache(60);
        write_aged_entry(&store, 600);

        let status = cache.status();

        assert_eq!(status.state, CacheState::Expired);
        assert!(status.age_seconds >= 600);
        assert_eq!(status.seconds_until_expiry, 0);
    }

    #[test]
    fn test_status_state_serializes_snake_case() {
        let (cache, _store, _temp_dir) = create_test_cache(3600);
        let json = serde_json::to_string(&cache.status()).expect("Should serialize");
        assert!(json.contains("\"state\":\"no_cache\""));
    }
}
