//! Generators shaped like each provider's live payloads.

use std::collections::HashMap;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;

use super::FallbackDataProvider;
use super::catalog::{self, Listing};
use crate::coinmarketcap::{
    CryptoMap, CryptoQuote, Cryptocurrency, Envelope, GlobalMetrics, GlobalMetricsResponse,
    GlobalQuote, Listings, MapEntry, Metadata, MetadataMap, Quotes, Status,
};
use crate::finnhub::{Candles, Quote as FinnhubQuote, SymbolLookup, SymbolMatch};
use crate::newsapi::{Article, NewsResponse, Source};
use crate::ticker::AssetKind;
use crate::twelvedata::{
    Bar, FiftyTwoWeek, Interval, MarketState, Quote as TwelveDataQuote, SeriesMeta,
    SymbolMatch as TwelveDataMatch, SymbolSearch, TimeSeries,
};
use crate::yfinance::{NewsResponse as YFinanceNews, RawArticle};

const MAX_ITEMS: u32 = 50;
const DEFAULT_CANDLES: i64 = 30;
const MAX_CANDLES: i64 = 500;
const NEWS_SOURCES: &[&str] = &["Market Wire", "Finance Daily", "The Street Journal", "Capital Desk"];
const DEFAULT_MARKETS: &[(&str, &str, &str)] = &[
    ("NYSE", "XNYS", "United States"),
    ("NASDAQ", "XNGS", "United States"),
    ("LSE", "XLON", "United Kingdom"),
    ("XETR", "XETR", "Germany"),
];

fn resolution_seconds(resolution: &str) -> i64 {
    match resolution {
        "1" => 60,
        "5" => 300,
        "15" => 900,
        "30" => 1800,
        "60" => 3600,
        "W" => 7 * 86_400,
        "M" => 30 * 86_400,
        _ => 86_400,
    }
}

fn ok_status() -> Status {
    Status {
        timestamp: Some(Utc::now()),
        ..Status::default()
    }
}

fn envelope<T>(data: T) -> Envelope<T> {
    Envelope {
        status: ok_status(),
        data,
    }
}

impl FallbackDataProvider {
    /* ---------------- Finnhub ---------------- */

    pub fn finnhub_quote(&self, symbol: &str) -> FinnhubQuote {
        let current = self.price_for(symbol);
        let percent = self.percent_move();
        let previous_close = current / (1.0 + percent / 100.0);
        FinnhubQuote {
            symbol: symbol.to_string(),
            current,
            change: Some(current - previous_close),
            percent_change: Some(percent),
            high: current * 1.02,
            low: current * 0.98,
            open: current * 0.995,
            previous_close,
            timestamp: Utc::now().timestamp(),
        }
    }

    /// A random walk ending near the symbol's anchor price.
    pub fn finnhub_candles(
        &self,
        symbol: &str,
        resolution: &str,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Candles {
        let step = resolution_seconds(resolution);
        let end = to.unwrap_or_else(|| Utc::now().timestamp());
        let count = match from {
            Some(start) if start < end => {
                (end.saturating_sub(start) / step + 1).clamp(1, MAX_CANDLES)
            }
            _ => DEFAULT_CANDLES,
        };
        let bars = self.walk(symbol, usize::try_from(count).unwrap_or(1));

        let mut candles = Candles {
            status: "ok".to_string(),
            ..Candles::default()
        };
        for (i, bar) in (0_i64..).zip(bars) {
            candles.timestamps.push(end.saturating_sub((count - 1 - i) * step));
            candles.open.push(bar.open);
            candles.high.push(bar.high);
            candles.low.push(bar.low);
            candles.close.push(bar.close);
            candles.volume.push(bar.volume);
        }
        candles
    }

    pub fn finnhub_lookup(&self, query: &str) -> SymbolLookup {
        let mut result: Vec<SymbolMatch> = catalog::search(query)
            .filter(|l| l.kind == AssetKind::Stock)
            .map(|l| SymbolMatch {
                description: l.name.to_uppercase(),
                display_symbol: l.symbol.to_string(),
                symbol: l.symbol.to_string(),
                kind: "Common Stock".to_string(),
            })
            .collect();
        if result.is_empty() && !query.trim().is_empty() {
            let symbol = query.trim().to_uppercase();
            result.push(SymbolMatch {
                description: format!("{symbol} INC."),
                display_symbol: symbol.clone(),
                symbol,
                kind: "Common Stock".to_string(),
            });
        }
        SymbolLookup {
            count: u32::try_from(result.len()).unwrap_or(u32::MAX),
            result,
        }
    }

    /* ---------------- CoinMarketCap ---------------- */

    fn crypto_quote(&self, price: f64) -> CryptoQuote {
        self.with_rng(|rng| {
            let supply = rng.random_range(1.0e7..1.0e9);
            let market_cap = price * supply;
            CryptoQuote {
                price,
                volume_24h: market_cap * rng.random_range(0.01..0.1),
                volume_change_24h: rng.random_range(-20.0..20.0),
                percent_change_1h: rng.random_range(-1.0..1.0),
                percent_change_24h: rng.random_range(-5.0..5.0),
                percent_change_7d: rng.random_range(-15.0..15.0),
                percent_change_30d: Some(rng.random_range(-30.0..30.0)),
                market_cap,
                market_cap_dominance: None,
                fully_diluted_market_cap: Some(market_cap * rng.random_range(1.0..1.5)),
                last_updated: Some(Utc::now()),
            }
        })
    }

    fn cryptocurrency(
        &self,
        id: i64,
        symbol: &str,
        name: &str,
        rank: Option<u32>,
        convert: &str,
    ) -> Cryptocurrency {
        let price = self.price_for(symbol);
        let quote = self.crypto_quote(price);
        let circulating = if price > 0.0 {
            quote.market_cap / price
        } else {
            0.0
        };
        Cryptocurrency {
            id,
            name: name.to_string(),
            symbol: symbol.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            num_market_pairs: None,
            date_added: None,
            tags: Vec::new(),
            max_supply: None,
            circulating_supply: Some(circulating),
            total_supply: Some(circulating),
            cmc_rank: rank,
            last_updated: Some(Utc::now()),
            quote: HashMap::from([(convert.to_string(), quote)]),
        }
    }

    fn listing_crypto(&self, l: &Listing, rank: u32, convert: &str) -> Cryptocurrency {
        self.cryptocurrency(l.cmc_id.unwrap_or_default(), l.symbol, l.name, Some(rank), convert)
    }

    /// Catalog coins ranked from `start` (1-based), at most `limit` rows.
    pub fn cmc_listings(&self, start: u32, limit: u32, convert: &str) -> Listings {
        let skip = usize::try_from(start.saturating_sub(1)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit.min(MAX_ITEMS)).unwrap_or(0);
        let data = (1_u32..)
            .zip(catalog::coins())
            .skip(skip)
            .take(take)
            .map(|(rank, l)| self.listing_crypto(l, rank, convert))
            .collect();
        envelope(data)
    }

    pub fn cmc_quotes_by_symbol(&self, symbols: &[&str], convert: &str) -> Quotes {
        let data = (1_i64..)
            .zip(symbols.iter().copied())
            .map(|(i, symbol)| {
                let coin = match catalog::lookup(symbol) {
                    Some(l) => self.cryptocurrency(
                        l.cmc_id.unwrap_or(100_000 + i),
                        l.symbol,
                        l.name,
                        None,
                        convert,
                    ),
                    None => self.cryptocurrency(100_000 + i, symbol, symbol, None, convert),
                };
                (symbol.to_string(), coin)
            })
            .collect();
        envelope(data)
    }

    pub fn cmc_quotes_by_id(&self, ids: &[i64], convert: &str) -> Quotes {
        let data = ids
            .iter()
            .map(|&id| {
                let coin = match catalog::lookup_cmc_id(id) {
                    Some(l) => self.cryptocurrency(id, l.symbol, l.name, None, convert),
                    None => {
                        self.cryptocurrency(id, &format!("C{id}"), &format!("Coin {id}"), None, convert)
                    }
                };
                (id.to_string(), coin)
            })
            .collect();
        envelope(data)
    }

    pub fn cmc_metadata(&self, symbols: &[&str], ids: &[i64]) -> MetadataMap {
        let meta = |key: String, id: i64, symbol: &str, name: &str| {
            let slug = name.to_lowercase().replace(' ', "-");
            (
                key,
                Metadata {
                    id,
                    name: name.to_string(),
                    symbol: symbol.to_string(),
                    category: Some("coin".to_string()),
                    description: Some(format!("{name} ({symbol}) is a cryptocurrency.")),
                    slug,
                    logo: None,
                    tags: Vec::new(),
                    urls: HashMap::new(),
                    date_added: None,
                    date_launched: None,
                },
            )
        };
        let by_symbol = (1_i64..).zip(symbols.iter().copied()).map(|(i, s)| {
            match catalog::lookup(s) {
                Some(l) => meta(s.to_string(), l.cmc_id.unwrap_or(100_000 + i), l.symbol, l.name),
                None => meta(s.to_string(), 100_000 + i, s, s),
            }
        });
        let by_id = ids.iter().map(|&id| match catalog::lookup_cmc_id(id) {
            Some(l) => meta(id.to_string(), id, l.symbol, l.name),
            None => meta(id.to_string(), id, &format!("C{id}"), &format!("Coin {id}")),
        });
        envelope(by_symbol.chain(by_id).collect())
    }

    pub fn cmc_map(&self, query: &str) -> CryptoMap {
        let data = (1_u32..)
            .zip(catalog::coins())
            .filter(|(_, l)| l.symbol.eq_ignore_ascii_case(query) || query.is_empty())
            .map(|(rank, l)| MapEntry {
                id: l.cmc_id.unwrap_or_default(),
                name: l.name.to_string(),
                symbol: l.symbol.to_string(),
                slug: l.name.to_lowercase().replace(' ', "-"),
                rank: Some(rank),
                is_active: Some(1),
                first_historical_data: None,
                last_historical_data: None,
            })
            .collect();
        envelope(data)
    }

    pub fn cmc_global_metrics(&self, convert: &str) -> GlobalMetricsResponse {
        let metrics = self.with_rng(|rng| {
            let total_market_cap = rng.random_range(2.0e12..2.8e12);
            let btc_dominance = rng.random_range(48.0..56.0);
            GlobalMetrics {
                active_cryptocurrencies: rng.random_range(9_000..10_000),
                total_cryptocurrencies: rng.random_range(28_000..32_000),
                active_market_pairs: rng.random_range(80_000..90_000),
                active_exchanges: rng.random_range(700..800),
                total_exchanges: rng.random_range(9_000..10_000),
                btc_dominance,
                eth_dominance: rng.random_range(14.0..19.0),
                btc_dominance_24h_percentage_change: Some(rng.random_range(-1.0..1.0)),
                defi_market_cap: Some(total_market_cap * rng.random_range(0.03..0.05)),
                stablecoin_market_cap: Some(total_market_cap * rng.random_range(0.06..0.08)),
                quote: HashMap::from([(
                    convert.to_string(),
                    GlobalQuote {
                        total_market_cap,
                        total_volume_24h: total_market_cap * rng.random_range(0.03..0.06),
                        altcoin_market_cap: Some(total_market_cap * (1.0 - btc_dominance / 100.0)),
                        altcoin_volume_24h: None,
                        total_market_cap_yesterday_percentage_change: Some(
                            rng.random_range(-4.0..4.0),
                        ),
                        total_volume_24h_yesterday_percentage_change: Some(
                            rng.random_range(-20.0..20.0),
                        ),
                        last_updated: Some(Utc::now()),
                    },
                )]),
                last_updated: Some(Utc::now()),
            }
        });
        envelope(metrics)
    }

    /* ---------------- Twelve Data ---------------- */

    pub fn twelvedata_quote(&self, symbol: &str) -> TwelveDataQuote {
        let listing = catalog::lookup(symbol);
        let close = self.price_for(symbol);
        let percent_change = self.percent_move();
        let previous_close = close / (1.0 + percent_change / 100.0);
        let now = Utc::now();
        let (volume, average_volume, low52, high52) = self.with_rng(|rng| {
            (
                f64::from(rng.random_range(100_000u32..10_000_000)),
                f64::from(rng.random_range(100_000u32..10_000_000)),
                close * rng.random_range(0.6..0.9),
                close * rng.random_range(1.05..1.4),
            )
        });
        TwelveDataQuote {
            symbol: symbol.to_string(),
            name: listing.map_or_else(|| format!("{symbol} Inc."), |l| l.name.to_string()),
            exchange: listing.map_or("NASDAQ", |l| l.exchange).to_string(),
            mic_code: None,
            currency: "USD".to_string(),
            datetime: now.format("%Y-%m-%d").to_string(),
            timestamp: now.timestamp(),
            open: previous_close * 1.002,
            high: close.max(previous_close) * 1.01,
            low: close.min(previous_close) * 0.99,
            close,
            volume,
            previous_close,
            change: close - previous_close,
            percent_change,
            average_volume: Some(average_volume),
            is_market_open: false,
            fifty_two_week: Some(FiftyTwoWeek {
                low: low52,
                high: high52,
                low_change: Some(close - low52),
                high_change: Some(close - high52),
                low_change_percent: Some((close - low52) / low52 * 100.0),
                high_change_percent: Some((close - high52) / high52 * 100.0),
                range: format!("{low52:.2} - {high52:.2}"),
            }),
        }
    }

    /// Newest bar first, like the live endpoint.
    pub fn twelvedata_time_series(
        &self,
        symbol: &str,
        interval: Interval,
        output_size: u32,
    ) -> TimeSeries {
        let count = output_size.clamp(1, 5000);
        let step = interval.seconds();
        let now = Utc::now();
        let intraday = step < 86_400;
        let bars = self.walk(symbol, usize::try_from(count).unwrap_or(1));
        let values = (0_i64..)
            .zip(bars.into_iter().rev())
            .map(|(back, bar)| {
                let at = now - ChronoDuration::seconds(back * step);
                let datetime = if intraday {
                    at.format("%Y-%m-%d %H:%M:%S").to_string()
                } else {
                    at.format("%Y-%m-%d").to_string()
                };
                Bar { datetime, ..bar }
            })
            .collect();
        let listing = catalog::lookup(symbol);
        TimeSeries {
            meta: SeriesMeta {
                symbol: symbol.to_string(),
                interval: interval.as_str().to_string(),
                currency: "USD".to_string(),
                exchange_timezone: "America/New_York".to_string(),
                exchange: listing.map_or("NASDAQ", |l| l.exchange).to_string(),
                mic_code: None,
                kind: "Common Stock".to_string(),
            },
            values,
            status: "ok".to_string(),
        }
    }

    /// Markets are reported closed.
    pub fn twelvedata_market_state(&self, markets: &[&str]) -> Vec<MarketState> {
        DEFAULT_MARKETS
            .iter()
            .filter(|(name, code, _)| {
                markets.is_empty()
                    || markets
                        .iter()
                        .any(|m| m.eq_ignore_ascii_case(name) || m.eq_ignore_ascii_case(code))
            })
            .map(|(name, code, country)| MarketState {
                name: (*name).to_string(),
                code: (*code).to_string(),
                country: (*country).to_string(),
                is_market_open: false,
                time_after_open: "00:00:00".to_string(),
                time_to_open: "00:00:00".to_string(),
                time_to_close: "00:00:00".to_string(),
            })
            .collect()
    }

    pub fn twelvedata_symbol_search(&self, query: &str) -> SymbolSearch {
        let data = catalog::search(query)
            .filter(|l| l.kind == AssetKind::Stock)
            .map(|l| TwelveDataMatch {
                symbol: l.symbol.to_string(),
                instrument_name: l.name.to_string(),
                exchange: l.exchange.to_string(),
                mic_code: None,
                exchange_timezone: "America/New_York".to_string(),
                instrument_type: "Common Stock".to_string(),
                country: "United States".to_string(),
                currency: "USD".to_string(),
            })
            .collect();
        SymbolSearch {
            data,
            status: "ok".to_string(),
        }
    }

    /* ---------------- News ---------------- */

    fn headline(&self, i: usize, topic: &str) -> (String, &'static str) {
        let stocks: Vec<&Listing> = catalog::CATALOG
            .iter()
            .filter(|l| l.kind == AssetKind::Stock)
            .collect();
        let company = stocks[i % stocks.len()];
        let source = NEWS_SOURCES[i % NEWS_SOURCES.len()];
        let headline = match i % 3 {
            0 => format!("{} shares move as investors weigh {topic} outlook", company.name),
            1 => format!("Analysts revisit {topic} forecasts after {} update", company.name),
            _ => format!("{} draws attention amid {topic} headlines", company.name),
        };
        (headline, source)
    }

    /// NewsAPI-shaped articles about `topic`, newest first.
    pub fn news_response(&self, topic: &str, count: u32) -> NewsResponse {
        let now = Utc::now();
        let articles: Vec<Article> = (0..count.clamp(1, MAX_ITEMS) as usize)
            .map(|i| {
                let (title, source) = self.headline(i, topic);
                Article {
                    source: Source {
                        id: None,
                        name: source.to_string(),
                    },
                    author: None,
                    description: Some(format!("Coverage of {topic} from {source}.")),
                    url: format!("https://news.example.com/{}/{i}", slugify(topic)),
                    url_to_image: None,
                    published_at: hours_ago(now, i),
                    content: None,
                    title,
                }
            })
            .collect();
        NewsResponse {
            status: "ok".to_string(),
            total_results: u32::try_from(articles.len()).unwrap_or(u32::MAX),
            articles,
        }
    }

    pub fn yfinance_news(&self, count: u32) -> YFinanceNews {
        let stocks: Vec<&Listing> = catalog::CATALOG
            .iter()
            .filter(|l| l.kind == AssetKind::Stock)
            .collect();
        let articles: Vec<RawArticle> = (0..count.clamp(1, MAX_ITEMS) as usize)
            .map(|i| {
                let (headline, source) = self.headline(i, "market");
                RawArticle {
                    id: format!("fallback_{i}"),
                    headline,
                    url: format!("https://news.example.com/markets/{i}"),
                    time: format!("{} hours ago", i + 1),
                    source: source.to_string(),
                    sentiment_score: self.with_rng(|rng| rng.random_range(-1.0..=1.0)),
                    symbol: Some(stocks[i % stocks.len()].symbol.to_string()),
                }
            })
            .collect();
        YFinanceNews {
            status: "success".to_string(),
            source: "fallback".to_string(),
            total: u32::try_from(articles.len()).unwrap_or(u32::MAX),
            articles,
            error: None,
        }
    }

    /* ---------------- shared ---------------- */

    /// `count` OHLCV bars, oldest first, drifting toward the anchor price.
    fn walk(&self, symbol: &str, count: usize) -> Vec<Bar> {
        let last = self.price_for(symbol);
        self.with_rng(|rng| {
            let mut closes = Vec::with_capacity(count);
            let mut price = last;
            for _ in 0..count {
                closes.push(price);
                price = (price * (1.0 + rng.random_range(-0.02..0.02))).max(0.0001);
            }
            closes.reverse();
            closes
                .into_iter()
                .map(|close| {
                    let open = close * (1.0 + rng.random_range(-0.01..0.01));
                    Bar {
                        datetime: String::new(),
                        open,
                        high: open.max(close) * (1.0 + rng.random_range(0.0..0.01)),
                        low: open.min(close) * (1.0 - rng.random_range(0.0..0.01)),
                        close,
                        volume: f64::from(rng.random_range(10_000u32..5_000_000)),
                    }
                })
                .collect()
        })
    }
}

fn hours_ago(now: DateTime<Utc>, hours: usize) -> DateTime<Utc> {
    now - ChronoDuration::hours(i64::try_from(hours).unwrap_or(0))
}

fn slugify(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect()
}
