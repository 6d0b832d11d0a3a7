//! Couponfeed - fetch, cache, and serve game store voucher codes
//!
//! A small CLI that keeps a file-backed, TTL-bounded cache of voucher
//! codes fetched from the GG.deals feed and prints them as plain text
//! or JSON.

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use couponfeed::cache::{CouponStore, TtlCache};
use couponfeed::cli::{Cli, Command};
use couponfeed::data::{Coupon, CouponsClient};
use couponfeed::service::CouponService;

/// Width of the separator line between coupons in plain-text output
const SEPARATOR_WIDTH: usize = 30;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("couponfeed=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = match &cli.cache_file {
        Some(path) => CouponStore::with_path(path.clone()),
        None => CouponStore::new()
            .ok_or("could not determine a cache directory; pass --cache-file")?,
    };
    let cache = TtlCache::with_ttl(store, cli.ttl);
    let source = match &cli.feed_url {
        Some(url) => CouponsClient::with_feed_url(url.clone()),
        None => CouponsClient::new(),
    };
    let service = CouponService::new(source, cache);

    match cli.command_or_default() {
        Command::Codes { refresh, json } => {
            let coupons = service.get_coupons(refresh).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&coupons)?);
            } else {
                print!("{}", format_coupons_text(&coupons));
            }
        }
        Command::Latest => {
            let coupons = service.get_coupons(false).await?;
            let first = coupons.first().ok_or("no coupons available")?;
            println!("{}", first.code);
        }
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&service.cache_status())?);
        }
        Command::Clear => {
            if !service.clear_cache() {
                return Err("failed to clear the coupon cache".into());
            }
            println!("Cache cleared");
        }
    }

    Ok(())
}

/// Formats coupons as plain text, one code and validity line per coupon,
/// separated by a dashed line when more than one is listed
fn format_coupons_text(coupons: &[Coupon]) -> String {
    let mut out = String::new();
    for coupon in coupons {
        out.push_str(&coupon.code);
        out.push('\n');
        out.push_str(&coupon.valid_until);
        out.push('\n');
        if coupons.len() > 1 {
            out.push_str(&"-".repeat(SEPARATOR_WIDTH));
            out.push('\n');
        }
    }
    out
}
