use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::watchlist::Watchlist;
use crate::providers::traits::{WatchlistFeed, WatchlistStore};
use super::table::WatchlistTable;

/// Volatile watchlist store. Starts with only the default watchlist.
pub struct MemoryWatchlistStore {
    table: Mutex<WatchlistTable>,
    feed: watch::Sender<Vec<Watchlist>>,
}

impl MemoryWatchlistStore {
    pub fn new() -> Self {
        Self::from_table(WatchlistTable::new())
    }

    /// A store pre-populated with the given names (after the default).
    pub fn with_watchlists<I, S>(names: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = WatchlistTable::new();
        for name in names {
            table.insert(&Watchlist::new(name))?;
        }
        Ok(Self::from_table(table))
    }

    fn from_table(table: WatchlistTable) -> Self {
        let (feed, _) = watch::channel(table.snapshot());
        Self {
            table: Mutex::new(table),
            feed,
        }
    }

    /// Current rows, outside of any subscription.
    pub fn snapshot(&self) -> Result<Vec<Watchlist>, CoreError> {
        Ok(self.lock()?.snapshot())
    }

    fn lock(&self) -> Result<MutexGuard<'_, WatchlistTable>, CoreError> {
        self.table
            .lock()
            .map_err(|e| CoreError::Persistence(format!("Store lock poisoned: {e}")))
    }

    /// Apply a mutation and publish the new snapshot while still holding the
    /// lock, so subscribers see changes in the order they were made.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut WatchlistTable) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut table = self.lock()?;
        let out = op(&mut *table)?;
        self.feed.send_replace(table.snapshot());
        Ok(out)
    }
}

impl Default for MemoryWatchlistStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WatchlistStore for MemoryWatchlistStore {
    fn name(&self) -> &str {
        "Memory"
    }

    async fn add(&self, watchlist: &Watchlist) -> Result<Watchlist, CoreError> {
        let stored = self.mutate(|table| table.insert(watchlist))?;
        debug!(name = %stored.name, id = stored.id, "watchlist stored");
        Ok(stored)
    }

    async fn update(&self, previous_name: &str, watchlist: &Watchlist) -> Result<(), CoreError> {
        self.mutate(|table| table.rename(previous_name, watchlist))
    }

    async fn remove(&self, watchlist: &Watchlist) -> Result<(), CoreError> {
        let removed = self.mutate(|table| table.remove(watchlist))?;
        if !removed {
            debug!(name = %watchlist.name, "default watchlist kept");
        }
        Ok(())
    }

    fn stream_all(&self) -> Result<WatchlistFeed, CoreError> {
        Ok(self.feed.subscribe())
    }
}
