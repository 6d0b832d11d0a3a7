//! Voucher feed client for GG.deals
//!
//! This module fetches the current voucher set from the GG.deals feed and
//! shapes each record into our [`Coupon`] type. Records with no usable
//! code get a placeholder, missing expiry information falls back to
//! "Unknown", and an expiry timestamp is annotated with the remaining
//! time when the feed provides one.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::Coupon;
use crate::service::{CouponSource, FetchError};

/// Default URL of the voucher feed (5% Steam vouchers)
const DEFAULT_FEED_URL: &str = "https://gg.deals/api/vouchers/?maxDiscount=5&minDiscount=5&store=60";

/// Transport timeout for a single feed request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser-style User-Agent; the feed rejects default client agents
const FEED_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Placeholder for a record whose code could not be extracted
const PLACEHOLDER_CODE: &str = "N/A";

/// Fallback validity text for a record without expiry information
const UNKNOWN_VALIDITY: &str = "Unknown";

/// Top-level shape of the feed response
#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    vouchers: Vec<VoucherRecord>,
}

/// A single voucher record as the feed reports it
#[derive(Debug, Deserialize)]
struct VoucherRecord {
    /// The voucher code, absent when the feed could not expose it
    code: Option<String>,
    /// Expiry timestamp, ISO-8601-like
    valid_until: Option<String>,
    /// Human-readable remaining time (e.g. "2 days")
    time_left: Option<String>,
}

impl VoucherRecord {
    /// Shapes a feed record into a coupon, filling placeholders for
    /// anything the feed left out
    fn into_coupon(self) -> Coupon {
        let code = self
            .code
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_CODE.to_string());

        let valid_until = match (self.valid_until, self.time_left) {
            (Some(timestamp), Some(time_left)) if !time_left.is_empty() => {
                format!("{} ({})", timestamp, time_left)
            }
            (Some(timestamp), _) => timestamp,
            (None, _) => UNKNOWN_VALIDITY.to_string(),
        };

        Coupon { code, valid_until }
    }
}

/// Client for fetching vouchers from the GG.deals feed
#[derive(Debug, Clone)]
pub struct CouponsClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Feed URL (allows override for testing or other stores)
    feed_url: String,
}

impl CouponsClient {
    /// Creates a client pointed at the default voucher feed
    pub fn new() -> Self {
        Self::with_feed_url(DEFAULT_FEED_URL.to_string())
    }

    /// Creates a client pointed at a custom feed URL
    pub fn with_feed_url(feed_url: String) -> Self {
        Self {
            http_client: Client::new(),
            feed_url,
        }
    }

    /// Fetches and shapes the current voucher set
    async fn fetch_feed(&self) -> Result<Vec<Coupon>, FetchError> {
        debug!("Fetching vouchers from {}", self.feed_url);

        let response = self
            .http_client
            .get(&self.feed_url)
            .header(USER_AGENT, FEED_USER_AGENT)
            .header(ACCEPT, "application/json")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let feed: FeedResponse = response.json().await?;

        let coupons: Vec<Coupon> = feed
            .vouchers
            .into_iter()
            .map(VoucherRecord::into_coupon)
            .collect();

        debug!("Successfully fetched {} coupons", coupons.len());
        Ok(coupons)
    }
}

impl CouponSource for CouponsClient {
    fn fetch(&self) -> impl Future<Output = Result<Vec<Coupon>, FetchError>> + Send {
        self.fetch_feed()
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Unavailable(err.to_string())
        }
    }
}
