//! Synthetic stand-ins for live data, plus the long-lived availability switch.
//!
//! [`FallbackDataProvider`] never fails: every generator returns a record with
//! the same shape as the live response, symbols preserved in request order and
//! numbers randomized around a plausible anchor. Well-known symbols keep
//! their real names and rough price levels.

mod availability;
mod catalog;
mod providers;

pub use availability::{ApiAvailability, AvailabilityStatus};

use std::fmt;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ticker::{AssetKind, Ticker};

pub struct FallbackDataProvider {
    rng: Mutex<StdRng>,
}

impl fmt::Debug for FallbackDataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackDataProvider").finish_non_exhaustive()
    }
}

impl Default for FallbackDataProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackDataProvider {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible output for tests and demos.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// Anchor price jittered by up to 3%; unknown symbols get 50..1050.
    fn price_for(&self, symbol: &str) -> f64 {
        let anchor = catalog::lookup(symbol).map(|l| l.price);
        self.with_rng(|rng| match anchor {
            Some(p) => p * (1.0 + rng.random_range(-0.03..0.03)),
            None => rng.random_range(50.0..1050.0),
        })
    }

    /// Daily move in percent, within ±5%.
    fn percent_move(&self) -> f64 {
        self.with_rng(|rng| rng.random_range(-5.0..5.0))
    }

    pub fn ticker(&self, symbol: &str) -> Ticker {
        let listing = catalog::lookup(symbol);
        let (name, kind) = match listing {
            Some(l) => (l.name.to_string(), l.kind),
            None => (format!("{symbol} Inc."), AssetKind::Stock),
        };
        let price = self.price_for(symbol);
        let change_percent = self.percent_move();

        let mut t = Ticker::new(symbol, name, kind);
        t.exchange = listing.map(|l| l.exchange.to_string());
        t.sector = listing.and_then(|l| l.sector).map(str::to_string);
        t.price = price;
        t.change_percent = change_percent;
        t.change = price * change_percent / 100.0;
        self.with_rng(|rng| {
            t.volume = f64::from(rng.random_range(100_000u32..10_000_000));
            t.sentiment_score = rng.random_range(-100.0..100.0);
            t.bullish_count = rng.random_range(0..1000);
            t.bearish_count = rng.random_range(0..1000);
            t.neutral_count = rng.random_range(0..1000);
            t.trending_score = rng.random_range(0.0..10.0);
            t.post_volume_24h = rng.random_range(0..1000);
            t.sentiment_change_24h = rng.random_range(-25.0..25.0);
        });
        t.total_posts = t.bullish_count + t.bearish_count + t.neutral_count;
        t.last_updated = Utc::now();
        t
    }

    /// One ticker per symbol, in order.
    pub fn tickers(&self, symbols: &[&str]) -> Vec<Ticker> {
        symbols.iter().map(|s| self.ticker(s)).collect()
    }
}
