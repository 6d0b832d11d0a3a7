//! File-backed persistent store for the coupon cache
//!
//! Provides a `CouponStore` that persists the last successfully fetched
//! coupon set as a single JSON file. The store is deliberately fail-soft:
//! read failures yield an empty entry and write failures yield `false`,
//! with the underlying error logged rather than propagated. Freshness
//! logic lives one layer up in [`TtlCache`](crate::cache::TtlCache).

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::data::Coupon;

/// File name used for the cache inside the XDG cache directory
const CACHE_FILE_NAME: &str = "coupons.json";

/// The persisted unit: a coupon set plus the time it was stored
///
/// `coupons` is `None` when the persisted blob is missing its coupon list
/// (a corrupt or partially written entry); callers treat that the same as
/// having no usable data. `stored_at` is stamped at write time when the
/// caller leaves it unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached coupon set, in upstream arrival order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupons: Option<Vec<Coupon>>,
    /// When the entry was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Creates an entry holding the given coupons, with `stored_at` left
    /// for the write path to stamp
    pub fn new(coupons: Vec<Coupon>) -> Self {
        Self {
            coupons: Some(coupons),
            stored_at: None,
        }
    }

    /// Number of coupons in the entry, zero when the list is absent
    pub fn coupon_count(&self) -> usize {
        self.coupons.as_ref().map_or(0, Vec::len)
    }
}

/// Durable single-entry store for the coupon cache
///
/// Stores the entry as pretty-printed JSON at a fixed path, by default
/// inside the XDG-compliant cache directory (`~/.cache/couponfeed/` on
/// Linux). All operations touch the filesystem directly; there is no
/// in-memory copy.
#[derive(Debug, Clone)]
pub struct CouponStore {
    /// Path of the JSON file holding the entry
    path: PathBuf,
}

impl CouponStore {
    /// Creates a store at the default XDG cache location
    ///
    /// Returns `None` if the cache directory cannot be determined
    /// (e.g. no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "couponfeed")?;
        let path = project_dirs.cache_dir().join(CACHE_FILE_NAME);
        Some(Self { path })
    }

    /// Creates a store backed by a specific file
    ///
    /// Useful for testing or when a custom cache location is needed.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true iff a durable entry is present
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the persisted entry
    ///
    /// # Returns
    /// The decoded entry, or an empty entry when no file exists or when
    /// the file cannot be read or decoded. Failures are logged, never
    /// raised.
    pub fn read(&self) -> CacheEntry {
        if !self.exists() {
            return CacheEntry::default();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) => {
                error!("Failed to read cache file {}: {}", self.path.display(), err);
                return CacheEntry::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(err) => {
                error!(
                    "Failed to decode cache file {}: {}",
                    self.path.display(),
                    err
                );
                CacheEntry::default()
            }
        }
    }

    /// Serializes and durably persists the entry, creating any missing
    /// containing directory
    ///
    /// Stamps `stored_at` with the current time if the caller left it
    /// unset.
    ///
    /// # Returns
    /// * `true` if the entry was written
    /// * `false` on I/O failure (logged, never raised)
    pub fn write(&self, mut entry: CacheEntry) -> bool {
        if entry.stored_at.is_none() {
            entry.stored_at = Some(Utc::now());
        }

        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                error!(
                    "Failed to create cache directory {}: {}",
                    parent.display(),
                    err
                );
                return false;
            }
        }

        let json = match serde_json::to_string_pretty(&entry) {
            Ok(json) => json,
            Err(err) => {
                error!("Failed to serialize cache entry: {}", err);
                return false;
            }
        };

        match fs::write(&self.path, json) {
            Ok(()) => {
                debug!("Cache updated at {}", self.path.display());
                true
            }
            Err(err) => {
                error!(
                    "Failed to write cache file {}: {}",
                    self.path.display(),
                    err
                );
                false
            }
        }
    }

    /// Removes the persisted entry
    ///
    /// Returns true if nothing existed or the file was removed, false on
    /// I/O failure.
    pub fn clear(&self) -> bool {
        if !self.exists() {
            return true;
        }

        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Cache cleared");
                true
            }
            Err(err) => {
                error!(
                    "Failed to remove cache file {}: {}",
                    self.path.display(),
                    err
                );
                false
            }
        }
    }
}
