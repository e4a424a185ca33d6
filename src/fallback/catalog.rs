//! Well-known symbols with stable names and price anchors.

use crate::ticker::AssetKind;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Listing {
    pub(crate) symbol: &'static str,
    pub(crate) name: &'static str,
    pub(crate) kind: AssetKind,
    pub(crate) exchange: &'static str,
    pub(crate) sector: Option<&'static str>,
    pub(crate) price: f64,
    /// CoinMarketCap id for crypto assets.
    pub(crate) cmc_id: Option<i64>,
}

const fn stock(
    symbol: &'static str,
    name: &'static str,
    exchange: &'static str,
    sector: &'static str,
    price: f64,
) -> Listing {
    Listing {
        symbol,
        name,
        kind: AssetKind::Stock,
        exchange,
        sector: Some(sector),
        price,
        cmc_id: None,
    }
}

const fn coin(symbol: &'static str, name: &'static str, price: f64, cmc_id: i64) -> Listing {
    Listing {
        symbol,
        name,
        kind: AssetKind::Crypto,
        exchange: "CMC",
        sector: None,
        price,
        cmc_id: Some(cmc_id),
    }
}

pub(crate) const CATALOG: &[Listing] = &[
    stock("AAPL", "Apple Inc.", "NASDAQ", "Technology", 190.0),
    stock("MSFT", "Microsoft Corporation", "NASDAQ", "Technology", 410.0),
    stock("GOOGL", "Alphabet Inc.", "NASDAQ", "Communication Services", 150.0),
    stock("AMZN", "Amazon.com Inc.", "NASDAQ", "Consumer Cyclical", 180.0),
    stock("TSLA", "Tesla Inc.", "NASDAQ", "Consumer Cyclical", 240.0),
    stock("NVDA", "NVIDIA Corporation", "NASDAQ", "Technology", 880.0),
    stock("META", "Meta Platforms Inc.", "NASDAQ", "Communication Services", 490.0),
    stock("NFLX", "Netflix Inc.", "NASDAQ", "Communication Services", 610.0),
    stock("AMD", "Advanced Micro Devices Inc.", "NASDAQ", "Technology", 160.0),
    stock("JPM", "JPMorgan Chase & Co.", "NYSE", "Financial Services", 195.0),
    coin("BTC", "Bitcoin", 65_000.0, 1),
    coin("ETH", "Ethereum", 3_400.0, 1027),
    coin("USDT", "Tether", 1.0, 825),
    coin("BNB", "BNB", 580.0, 1839),
    coin("SOL", "Solana", 150.0, 5426),
    coin("XRP", "XRP", 0.55, 52),
    coin("DOGE", "Dogecoin", 0.15, 74),
    coin("ADA", "Cardano", 0.45, 2010),
];

pub(crate) fn lookup(symbol: &str) -> Option<&'static Listing> {
    CATALOG
        .iter()
        .find(|l| l.symbol.eq_ignore_ascii_case(symbol))
}

pub(crate) fn lookup_cmc_id(id: i64) -> Option<&'static Listing> {
    CATALOG.iter().find(|l| l.cmc_id == Some(id))
}

pub(crate) fn coins() -> impl Iterator<Item = &'static Listing> {
    CATALOG.iter().filter(|l| l.kind == AssetKind::Crypto)
}

/// Catalog entries whose symbol or name contains `query`.
pub(crate) fn search(query: &str) -> impl Iterator<Item = &'static Listing> + '_ {
    let needle = query.to_ascii_lowercase();
    CATALOG.iter().filter(move |l| {
        l.symbol.to_ascii_lowercase().contains(&needle)
            || l.name.to_ascii_lowercase().contains(&needle)
    })
}
