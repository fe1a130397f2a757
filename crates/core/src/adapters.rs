//! Thin wrappers that put every collaborator behind the core's contracts.
//!
//! Each adapter maps whatever a collaborator returns into the error
//! taxonomy of [`ErrorKind`]: store failures become persistence errors,
//! catalog and quote failures become network or not-found errors. Inputs
//! are normalised here so controllers never talk to a raw collaborator.

use std::collections::HashSet;
use std::sync::Arc;

use crate::errors::{CoreError, ErrorKind};
use crate::models::quote::Quote;
use crate::models::symbol::Symbol;
use crate::models::watchlist::Watchlist;
use crate::providers::traits::{QuoteSource, SymbolCatalog, WatchlistFeed, WatchlistStore};

/// Wraps the persistence collaborator.
#[derive(Clone)]
pub struct StoreAdapter {
    store: Arc<dyn WatchlistStore>,
}

impl StoreAdapter {
    pub fn new(store: Arc<dyn WatchlistStore>) -> Self {
        Self { store }
    }

    pub fn name(&self) -> &str {
        self.store.name()
    }

    pub async fn add(&self, watchlist: &Watchlist) -> Result<Watchlist, CoreError> {
        self.store.add(watchlist).await.map_err(as_persistence)
    }

    pub async fn update(&self, previous_name: &str, watchlist: &Watchlist) -> Result<(), CoreError> {
        self.store
            .update(previous_name, watchlist)
            .await
            .map_err(as_persistence)
    }

    pub async fn remove(&self, watchlist: &Watchlist) -> Result<(), CoreError> {
        self.store.remove(watchlist).await.map_err(as_persistence)
    }

    /// Live feed of all stored watchlists.
    pub fn feed(&self) -> Result<WatchlistFeed, CoreError> {
        self.store.stream_all().map_err(as_persistence)
    }
}

/// Wraps the symbol search collaborator.
#[derive(Clone)]
pub struct CatalogAdapter {
    catalog: Arc<dyn SymbolCatalog>,
}

impl CatalogAdapter {
    pub fn new(catalog: Arc<dyn SymbolCatalog>) -> Self {
        Self { catalog }
    }

    pub fn name(&self) -> &str {
        self.catalog.name()
    }

    /// Search for `query`. An empty query or an empty result is `NoMatches`;
    /// duplicate tickers in the response are collapsed to the first one.
    pub async fn search(&self, query: &str) -> Result<Vec<Symbol>, CoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CoreError::NoMatches(String::new()));
        }

        let symbols = self.catalog.search(query).await.map_err(as_network)?;

        let mut seen = HashSet::new();
        let symbols: Vec<Symbol> = symbols
            .into_iter()
            .filter(|s| !s.name.is_empty() && seen.insert(s.name.clone()))
            .collect();

        if symbols.is_empty() {
            return Err(CoreError::NoMatches(query.to_string()));
        }
        Ok(symbols)
    }
}

/// Wraps the quote collaborator.
#[derive(Clone)]
pub struct QuoteAdapter {
    source: Arc<dyn QuoteSource>,
}

impl QuoteAdapter {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self { source }
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    /// Fetch one quote. Prices must be finite and non-negative.
    pub async fn fetch(&self, symbol: &str) -> Result<Quote, CoreError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(CoreError::QuoteNotAvailable(String::new()));
        }

        let quote = self.source.fetch(symbol).await.map_err(as_network)?;
        if !quote.is_valid() {
            return Err(CoreError::Api {
                provider: self.source.name().to_string(),
                message: format!(
                    "Invalid quote returned for {symbol}: last {} ask {} bid {} (must be finite and non-negative)",
                    quote.last_price, quote.ask_price, quote.bid_price
                ),
            });
        }
        Ok(quote)
    }
}

fn as_persistence(e: CoreError) -> CoreError {
    match e.kind() {
        ErrorKind::Persistence => e,
        _ => CoreError::Persistence(e.to_string()),
    }
}

fn as_network(e: CoreError) -> CoreError {
    match e.kind() {
        ErrorKind::Network | ErrorKind::NotFound => e,
        _ => CoreError::Network(e.to_string()),
    }
}
