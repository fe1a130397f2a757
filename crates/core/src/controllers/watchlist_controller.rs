use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::adapters::StoreAdapter;
use crate::errors::CoreError;
use crate::models::notice::ErrorOrigin;
use crate::models::symbol::Symbol;
use crate::models::watchlist::Watchlist;
use crate::providers::traits::{WatchlistFeed, WatchlistStore};
use crate::session::SessionContext;

/// Owns watchlist CRUD, the current watchlist and the selected symbols.
///
/// In-memory state changes are applied and published before the store call
/// they accompany, and are not rolled back if the store then fails. Store
/// failures are published on the error stream and also returned.
pub struct WatchlistController {
    store: StoreAdapter,
    ctx: Arc<SessionContext>,
    feed_task: Mutex<Option<JoinHandle<()>>>,
}

impl WatchlistController {
    /// Create the controller and subscribe to the store's watchlist feed.
    pub fn new(store: Arc<dyn WatchlistStore>, ctx: Arc<SessionContext>) -> Self {
        let store = StoreAdapter::new(store);
        let feed_task = match store.feed() {
            Ok(feed) => Some(ctx.spawn(Self::forward_feed(feed, Arc::clone(&ctx)))),
            Err(e) => {
                warn!(store = store.name(), error = %e, "cannot subscribe to watchlists");
                ctx.publish_error(ErrorOrigin::Watchlist, &e);
                None
            }
        };

        Self {
            store,
            ctx,
            feed_task: Mutex::new(feed_task),
        }
    }

    /// Republish every store snapshot until shutdown or until the store goes away.
    async fn forward_feed(mut feed: WatchlistFeed, ctx: Arc<SessionContext>) {
        let shutdown = ctx.shutdown_signal();
        let first = feed.borrow_and_update().clone();
        ctx.publish_watchlists(first);

        loop {
            let alive = tokio::select! {
                biased;
                _ = shutdown.cancelled() => false,
                res = feed.changed() => res.is_ok(),
            };
            if !alive {
                break;
            }
            let snapshot = feed.borrow_and_update().clone();
            debug!(count = snapshot.len(), "watchlists changed");
            ctx.publish_watchlists(snapshot);
        }
        debug!("watchlist feed closed");
    }

    /// Persist `watchlist`, then make it current.
    pub async fn add_watchlist(&self, watchlist: Watchlist) -> Result<Watchlist, CoreError> {
        match self.store.add(&watchlist).await {
            Ok(stored) => {
                info!(name = %stored.name, "watchlist added");
                self.ctx.publish_current_watchlist(stored.clone());
                Ok(stored)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Rename `previous_name` to `watchlist.name`.
    ///
    /// Selected symbols are moved to the new name before the new current
    /// watchlist is published, so no observer sees the new name next to
    /// stale assignments.
    pub async fn update_watchlist(
        &self,
        previous_name: &str,
        watchlist: Watchlist,
    ) -> Result<(), CoreError> {
        let new_name = watchlist.name.clone();
        self.ctx.modify_selected_symbols(|symbols| {
            let mut renamed = false;
            for symbol in symbols.iter_mut().filter(|s| s.belongs_to(previous_name)) {
                symbol.watchlist.name = new_name.clone();
                renamed = true;
            }
            renamed
        });
        self.ctx.publish_current_watchlist(watchlist.clone());

        match self.store.update(previous_name, &watchlist).await {
            Ok(()) => {
                info!(from = previous_name, to = %watchlist.name, "watchlist renamed");
                Ok(())
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Delete `watchlist`. If it is current, the default becomes current first.
    pub async fn delete_watchlist(&self, watchlist: Watchlist) -> Result<(), CoreError> {
        if self.ctx.reset_current_watchlist_if(&watchlist) {
            debug!(name = %watchlist.name, "current watchlist reset to default");
        }

        let result = self.store.remove(&watchlist).await;

        // The default watchlist is never removed, so its symbols stay selected.
        if !watchlist.is_default_watchlist() {
            self.ctx.modify_selected_symbols(|symbols| {
                let before = symbols.len();
                symbols.retain(|s| !s.belongs_to(&watchlist.name));
                symbols.len() != before
            });
        }

        match result {
            Ok(()) => {
                info!(name = %watchlist.name, "watchlist deleted");
                Ok(())
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Make an existing watchlist current without touching the store.
    ///
    /// The default watchlist is always selectable; any other must be in the
    /// last published set of watchlists.
    pub fn select_watchlist(&self, watchlist: Watchlist) -> Result<(), CoreError> {
        let known = watchlist.is_default_watchlist()
            || self.ctx.watchlists().iter().any(|w| *w == watchlist);
        if !known {
            return Err(self.report(CoreError::WatchlistNotFound(watchlist.name)));
        }

        let selected = if watchlist.is_default_watchlist() {
            Watchlist::default_watchlist()
        } else {
            watchlist
        };
        self.ctx.publish_current_watchlist(selected);
        Ok(())
    }

    /// Add `symbol` to the selection, or move it to its new watchlist if
    /// the same ticker is already selected. Returns whether anything changed.
    pub fn select_symbol(&self, symbol: Symbol) -> bool {
        if symbol.name.is_empty() {
            warn!("ignoring selection of an empty ticker");
            return false;
        }
        self.ctx.modify_selected_symbols(|symbols| {
            match symbols.iter_mut().find(|s| s.name == symbol.name) {
                Some(existing) if *existing == symbol => false,
                Some(existing) => {
                    *existing = symbol;
                    true
                }
                None => {
                    symbols.push(symbol);
                    true
                }
            }
        })
    }

    /// Remove the ticker `name` from the selection.
    pub fn deselect_symbol(&self, name: &str) -> bool {
        let name = name.trim().to_uppercase();
        self.ctx.modify_selected_symbols(|symbols| {
            let before = symbols.len();
            symbols.retain(|s| s.name != name);
            symbols.len() != before
        })
    }

    pub fn clear_selection(&self) {
        self.ctx.modify_selected_symbols(|symbols| {
            let changed = !symbols.is_empty();
            symbols.clear();
            changed
        });
    }

    /// Cancel the feed subscription.
    pub(crate) fn stop_feed(&self) {
        let task = match self.feed_task.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = task {
            task.abort();
        }
    }

    fn report(&self, e: CoreError) -> CoreError {
        warn!(store = self.store.name(), error = %e, "watchlist operation failed");
        self.ctx.publish_error(ErrorOrigin::Watchlist, &e);
        e
    }
}
