use async_trait::async_trait;
use tokio::sync::watch;

use crate::errors::CoreError;
use crate::models::quote::Quote;
use crate::models::symbol::Symbol;
use crate::models::watchlist::Watchlist;

/// Live view of every stored watchlist.
///
/// The receiver holds the current set as soon as it is created and is
/// notified on every subsequent change. It ends when the store is dropped.
pub type WatchlistFeed = watch::Receiver<Vec<Watchlist>>;

/// Durable storage of watchlists, keyed by name.
///
/// Implementations must reject a second watchlist with an existing name and
/// must never actually drop the default watchlist.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// Human-readable name of this store (for logs/errors).
    fn name(&self) -> &str;

    /// Persist a new watchlist. Returns it with its store-assigned id.
    async fn add(&self, watchlist: &Watchlist) -> Result<Watchlist, CoreError>;

    /// Rename/replace the watchlist currently stored under `previous_name`.
    async fn update(&self, previous_name: &str, watchlist: &Watchlist) -> Result<(), CoreError>;

    /// Remove a watchlist by name.
    async fn remove(&self, watchlist: &Watchlist) -> Result<(), CoreError>;

    /// Subscribe to the set of all watchlists.
    fn stream_all(&self) -> Result<WatchlistFeed, CoreError>;
}

/// Remote symbol search.
#[async_trait]
pub trait SymbolCatalog: Send + Sync {
    fn name(&self) -> &str;

    /// Symbols matching a partial or full ticker query.
    async fn search(&self, query: &str) -> Result<Vec<Symbol>, CoreError>;
}

/// Point-in-time quote lookup.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &str;

    /// Current last/ask/bid for `symbol`.
    async fn fetch(&self, symbol: &str) -> Result<Quote, CoreError>;
}
