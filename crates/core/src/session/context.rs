use std::future::Future;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::notice::{ErrorNotice, ErrorOrigin};
use crate::models::quote::QuoteUpdate;
use crate::models::settings::MAX_EVENT_BUFFER;
use crate::models::symbol::Symbol;
use crate::models::watchlist::Watchlist;
use super::subscription::{EventSubscription, ShutdownSignal, StateSubscription};

/// State of one session, owned by the facade and shared with controllers.
///
/// Writers are `pub(crate)`: the current watchlist and the selected symbols
/// are written only by the watchlist controller, search results only by the
/// search controller, quotes only by the poller. Everything else reads
/// snapshots. Publishing after shutdown is a no-op.
pub struct SessionContext {
    runtime: Handle,
    current_watchlist: watch::Sender<Watchlist>,
    watchlists: watch::Sender<Vec<Watchlist>>,
    selected_symbols: watch::Sender<Vec<Symbol>>,
    search_results: watch::Sender<Vec<Symbol>>,
    quotes: broadcast::Sender<QuoteUpdate>,
    errors: broadcast::Sender<ErrorNotice>,
    shutdown: watch::Sender<bool>,
}

impl SessionContext {
    /// Create a context bound to the Tokio runtime of the caller.
    pub fn new(event_buffer: usize) -> Result<Self, CoreError> {
        let runtime = Handle::try_current().map_err(|_| {
            CoreError::Config("a session must be created inside a Tokio runtime".into())
        })?;
        if event_buffer == 0 || event_buffer > MAX_EVENT_BUFFER {
            return Err(CoreError::Config(format!(
                "event_buffer must be between 1 and {MAX_EVENT_BUFFER}, got {event_buffer}"
            )));
        }

        Ok(Self {
            runtime,
            current_watchlist: watch::channel(Watchlist::default_watchlist()).0,
            watchlists: watch::channel(Vec::new()).0,
            selected_symbols: watch::channel(Vec::new()).0,
            search_results: watch::channel(Vec::new()).0,
            quotes: broadcast::channel(event_buffer).0,
            errors: broadcast::channel(event_buffer).0,
            shutdown: watch::channel(false).0,
        })
    }

    // ── Snapshots ───────────────────────────────────────────────────

    pub fn current_watchlist(&self) -> Watchlist {
        self.current_watchlist.borrow().clone()
    }

    pub fn watchlists(&self) -> Vec<Watchlist> {
        self.watchlists.borrow().clone()
    }

    pub fn selected_symbols(&self) -> Vec<Symbol> {
        self.selected_symbols.borrow().clone()
    }

    pub fn search_results(&self) -> Vec<Symbol> {
        self.search_results.borrow().clone()
    }

    // ── Subscriptions ───────────────────────────────────────────────

    pub fn subscribe_current_watchlist(&self) -> StateSubscription<Watchlist> {
        StateSubscription::new(self.current_watchlist.subscribe(), self.shutdown_signal())
    }

    pub fn subscribe_watchlists(&self) -> StateSubscription<Vec<Watchlist>> {
        StateSubscription::new(self.watchlists.subscribe(), self.shutdown_signal())
    }

    pub fn subscribe_selected_symbols(&self) -> StateSubscription<Vec<Symbol>> {
        StateSubscription::new(self.selected_symbols.subscribe(), self.shutdown_signal())
    }

    pub fn subscribe_search_results(&self) -> StateSubscription<Vec<Symbol>> {
        StateSubscription::new(self.search_results.subscribe(), self.shutdown_signal())
    }

    pub fn subscribe_quotes(&self) -> EventSubscription<QuoteUpdate> {
        EventSubscription::new(self.quotes.subscribe(), self.shutdown_signal())
    }

    pub fn subscribe_errors(&self) -> EventSubscription<ErrorNotice> {
        EventSubscription::new(self.errors.subscribe(), self.shutdown_signal())
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        ShutdownSignal::new(self.shutdown.subscribe())
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Raise the shutdown flag. Returns `false` if it was already raised.
    pub(crate) fn trigger_shutdown(&self) -> bool {
        self.shutdown.send_if_modified(|down| !std::mem::replace(down, true))
    }

    /// Spawn a background task on the session's runtime.
    pub(crate) fn spawn<F>(&self, fut: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.runtime.spawn(fut)
    }

    // ── Publishers ──────────────────────────────────────────────────

    pub(crate) fn publish_current_watchlist(&self, watchlist: Watchlist) {
        if self.is_shut_down() {
            return;
        }
        debug!(name = %watchlist.name, "current watchlist");
        self.current_watchlist.send_replace(watchlist);
    }

    /// Replace the current watchlist with the default if it is `watchlist`.
    /// Returns whether a reset happened.
    pub(crate) fn reset_current_watchlist_if(&self, watchlist: &Watchlist) -> bool {
        if self.is_shut_down() {
            return false;
        }
        self.current_watchlist.send_if_modified(|current| {
            if current == watchlist {
                *current = Watchlist::default_watchlist();
                true
            } else {
                false
            }
        })
    }

    pub(crate) fn publish_watchlists(&self, watchlists: Vec<Watchlist>) {
        if self.is_shut_down() {
            return;
        }
        self.watchlists.send_replace(watchlists);
    }

    /// Mutate the selected symbols in place. `edit` returns whether anything
    /// changed; observers are only notified when it did.
    pub(crate) fn modify_selected_symbols(&self, edit: impl FnOnce(&mut Vec<Symbol>) -> bool) -> bool {
        if self.is_shut_down() {
            return false;
        }
        self.selected_symbols.send_if_modified(edit)
    }

    pub(crate) fn publish_search_results(&self, symbols: Vec<Symbol>) {
        if self.is_shut_down() {
            return;
        }
        self.search_results.send_replace(symbols);
    }

    pub(crate) fn publish_quote(&self, update: QuoteUpdate) {
        if self.is_shut_down() {
            return;
        }
        // No subscribers is not an error; quotes are not retained.
        let _ = self.quotes.send(update);
    }

    pub(crate) fn publish_error(&self, origin: ErrorOrigin, error: &CoreError) {
        if self.is_shut_down() {
            return;
        }
        let _ = self.errors.send(ErrorNotice::new(origin, error));
    }
}
