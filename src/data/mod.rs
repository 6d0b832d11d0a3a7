//! Core data models for couponfeed
//!
//! This module contains the data types used throughout the application
//! for representing voucher codes fetched from the upstream feed.

pub mod coupons;

pub use coupons::CouponsClient;

use serde::{Deserialize, Serialize};

/// A single promotional voucher code
///
/// Coupons are kept in the order the upstream feed lists them; the feed may
/// repeat a code and duplicates are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// The voucher code itself, or a placeholder when the feed entry
    /// carried no usable code
    pub code: String,
    /// Expiry information: an ISO-8601-like timestamp, optionally annotated
    /// with the remaining time (e.g. "2025-01-01T00:00:00 (2 days)"), or a
    /// free-text fallback when the feed gave no expiry
    pub valid_until: String,
}

impl Coupon {
    /// Creates a new coupon from a code and validity string
    pub fn new(code: impl Into<String>, valid_until: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            valid_until: valid_until.into(),
        }
    }
}
