//! Coupon retrieval orchestration
//!
//! `CouponService` decides, per call, whether to serve cached coupons,
//! fetch fresh ones from the upstream feed, or fall back to stale data
//! when the feed is unreachable. It owns the upstream-fetch boundary as
//! the [`CouponSource`] trait so the feed client stays swappable in tests.

use std::future::Future;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStatus, TtlCache};
use crate::data::Coupon;

/// Errors surfaced by a coupon fetch
///
/// These are the only errors the service propagates to callers; the cache
/// layers below signal failure through booleans and empty values instead.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The upstream feed could not be reached or answered with an error
    #[error("Failed to fetch coupon data: {0}")]
    Unavailable(String),

    /// A response arrived but its body could not be parsed
    #[error("Failed to parse coupon data: {0}")]
    Parse(String),
}

/// Boundary to the upstream coupon feed
///
/// Implementations perform the network call and structural extraction and
/// return coupons in arrival order. The service treats this as opaque.
pub trait CouponSource {
    /// Fetches the current coupon set from upstream
    fn fetch(&self) -> impl Future<Output = Result<Vec<Coupon>, FetchError>> + Send;
}

/// Cache-backed coupon retrieval service
///
/// Each `get_coupons` call runs synchronously to completion, bounded by
/// the source's transport timeout; refresh is purely pull-triggered by
/// caller traffic. Concurrent refreshes of an expired cache are collapsed
/// into a single upstream request (see `fetch_fresh`).
#[derive(Debug)]
pub struct CouponService<S> {
    source: S,
    cache: TtlCache,
    refresh_lock: Mutex<()>,
}

impl<S: CouponSource> CouponService<S> {
    /// Creates a service over the given source and cache
    pub fn new(source: S, cache: TtlCache) -> Self {
        Self {
            source,
            cache,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Returns the current coupon set, from cache or upstream
    ///
    /// # Arguments
    /// * `force_refresh` - Bypass the cache and always attempt an
    ///   upstream fetch
    ///
    /// # Behavior
    /// - A valid cache is served directly unless `force_refresh` is set.
    /// - A cache entry that lost its coupon list triggers a refetch
    ///   rather than being returned.
    /// - On upstream failure without `force_refresh`, any earlier coupon
    ///   set still on disk is served, however stale.
    /// - On upstream failure with `force_refresh`, the error surfaces:
    ///   the caller explicitly asked for fresh codes, so no fallback.
    pub async fn get_coupons(&self, force_refresh: bool) -> Result<Vec<Coupon>, FetchError> {
        if !force_refresh && self.cache.is_valid() {
            if let Some(coupons) = self.cache.get().coupons {
                debug!("Serving {} coupons from cache", coupons.len());
                return Ok(coupons);
            }
            warn!("Cache entry is missing its coupon list, refetching");
        }

        self.fetch_fresh(force_refresh).await
    }

    /// Fetches from upstream, updating the cache on success and falling
    /// back to stale data on non-forced failure
    async fn fetch_fresh(&self, forced: bool) -> Result<Vec<Coupon>, FetchError> {
        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock
        if !forced && self.cache.is_valid() {
            if let Some(coupons) = self.cache.get().coupons {
                debug!("Cache was refreshed while waiting, serving it");
                return Ok(coupons);
            }
        }

        match self.source.fetch().await {
            Ok(coupons) => {
                if !self.cache.update(CacheEntry::new(coupons.clone())) {
                    warn!("Failed to persist freshly fetched coupons");
                }
                Ok(coupons)
            }
            Err(err) => {
                if !forced && self.cache.exists() {
                    if let Some(coupons) = self.cache.get().coupons {
                        warn!("Using cached data as fallback after fetch error: {}", err);
                        return Ok(coupons);
                    }
                }
                Err(err)
            }
        }
    }

    /// Reports the cache state without triggering any fetch
    pub fn cache_status(&self) -> CacheStatus {
        self.cache.status()
    }

    /// Removes the cached coupon set
    pub fn clear_cache(&self) -> bool {
        self.cache.clear()
    }
}
