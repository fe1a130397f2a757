use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::CoreError;
use crate::models::quote::Quote;
use crate::models::symbol::Symbol;
use super::traits::{QuoteSource, SymbolCatalog};

/// Starting price for symbols with no seeded price.
const INITIAL_PRICE: f64 = 100.0;

/// Half of the synthetic bid/ask spread, as a fraction of the last price.
const HALF_SPREAD: f64 = 0.0005;

/// Maximum relative move per tick.
const MAX_STEP: f64 = 0.01;

/// Lowest price the random walk may reach.
const PRICE_FLOOR: f64 = 0.01;

/// Offline quote source producing a random walk per symbol.
///
/// Every fetch moves the last price by up to ±1% and quotes a small
/// symmetric spread around it. All callers observe the same sequence of
/// prices for a symbol.
pub struct SimulatedQuoteSource {
    last_prices: Mutex<HashMap<String, f64>>,
}

impl SimulatedQuoteSource {
    pub fn new() -> Self {
        Self {
            last_prices: Mutex::new(HashMap::new()),
        }
    }

    /// Start selected symbols from known prices instead of `INITIAL_PRICE`.
    pub fn with_prices<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let map = prices
            .into_iter()
            .map(|(symbol, price)| (symbol.into().to_uppercase(), price))
            .collect();
        Self {
            last_prices: Mutex::new(map),
        }
    }

    /// Next price of the walk, never below `PRICE_FLOOR`.
    fn next_price(current: f64) -> f64 {
        let change: f64 = rand::rng().random_range(-MAX_STEP..MAX_STEP);
        (current * (1.0 + change)).max(PRICE_FLOOR)
    }
}

impl Default for SimulatedQuoteSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for SimulatedQuoteSource {
    fn name(&self) -> &str {
        "Simulation"
    }

    async fn fetch(&self, symbol: &str) -> Result<Quote, CoreError> {
        let key = symbol.trim().to_uppercase();
        if key.is_empty() {
            return Err(CoreError::QuoteNotAvailable(symbol.to_string()));
        }

        let last = {
            let mut prices = self
                .last_prices
                .lock()
                .map_err(|e| CoreError::Api {
                    provider: "Simulation".into(),
                    message: format!("Price table poisoned: {e}"),
                })?;
            let entry = prices.entry(key).or_insert(INITIAL_PRICE);
            *entry = Self::next_price(*entry);
            *entry
        };

        Ok(Quote::new(
            last,
            last * (1.0 + HALF_SPREAD),
            last * (1.0 - HALF_SPREAD),
        ))
    }
}

/// Built-in ticker list used when no live catalog is configured.
const STATIC_SYMBOLS: &[(&str, &str)] = &[
    ("AAL", "American Airlines Group Inc."),
    ("AAP", "Advance Auto Parts Inc."),
    ("AAPL", "Apple Inc."),
    ("AMD", "Advanced Micro Devices Inc."),
    ("AMZN", "Amazon.com Inc."),
    ("GOOGL", "Alphabet Inc."),
    ("INTC", "Intel Corporation"),
    ("META", "Meta Platforms Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("NFLX", "Netflix Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("QQQ", "Invesco QQQ Trust"),
    ("SPY", "SPDR S&P 500 ETF Trust"),
    ("TSLA", "Tesla Inc."),
];

/// Offline symbol catalog over a fixed list of tickers.
///
/// A query matches a ticker by prefix or a description by substring,
/// case-insensitively. An exact ticker match sorts first.
pub struct StaticSymbolCatalog {
    entries: Vec<(String, String)>,
}

impl StaticSymbolCatalog {
    pub fn new() -> Self {
        Self::with_entries(
            STATIC_SYMBOLS
                .iter()
                .map(|(ticker, desc)| (ticker.to_string(), desc.to_string())),
        )
    }

    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(ticker, desc)| (ticker.to_uppercase(), desc))
                .collect(),
        }
    }
}

impl Default for StaticSymbolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SymbolCatalog for StaticSymbolCatalog {
    fn name(&self) -> &str {
        "Static catalog"
    }

    async fn search(&self, query: &str) -> Result<Vec<Symbol>, CoreError> {
        let upper = query.trim().to_uppercase();
        if upper.is_empty() {
            return Ok(Vec::new());
        }

        let mut matches: Vec<&(String, String)> = self
            .entries
            .iter()
            .filter(|(ticker, desc)| {
                ticker.starts_with(&upper) || desc.to_uppercase().contains(&upper)
            })
            .collect();
        matches.sort_by(|a, b| (a.0 != upper, &a.0).cmp(&(b.0 != upper, &b.0)));

        Ok(matches
            .into_iter()
            .map(|(ticker, desc)| Symbol::unassigned(ticker.as_str()).with_description(desc.as_str()))
            .collect())
    }
}
