pub mod adapters;
pub mod controllers;
pub mod errors;
pub mod models;
pub mod providers;
pub mod session;
pub mod storage;

use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use controllers::{
    quote_poller::{PollerState, QuotePoller},
    search_controller::SearchController,
    watchlist_controller::WatchlistController,
};
use errors::CoreError;
use models::{
    notice::ErrorNotice,
    quote::QuoteUpdate,
    settings::Settings,
    symbol::Symbol,
    watchlist::Watchlist,
};
use providers::{
    registry::Collaborators,
    traits::{QuoteSource, SymbolCatalog, WatchlistStore},
};
use session::{CommandHandle, EventSubscription, SessionContext, StateSubscription};
use storage::{file::JsonFileWatchlistStore, memory::MemoryWatchlistStore};

/// Main entry point for the watchlist core library.
///
/// A session is the only surface a presentation layer talks to. Commands
/// return immediately; their effects arrive on the observable streams.
/// Asynchronous commands hand back a [`CommandHandle`] that can be awaited
/// for the outcome, but never has to be.
///
/// Must be created inside a Tokio runtime. Dropping the session shuts it down.
#[must_use]
pub struct WatchlistSession {
    settings: Settings,
    context: Arc<SessionContext>,
    watchlists: Arc<WatchlistController>,
    search: Arc<SearchController>,
    poller: QuotePoller,
}

impl std::fmt::Debug for WatchlistSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchlistSession")
            .field("current_watchlist", &self.context.current_watchlist().name)
            .field("selected_symbols", &self.context.selected_symbols().len())
            .field("poller", &self.poller.state())
            .field("shut_down", &self.context.is_shut_down())
            .finish()
    }
}

impl WatchlistSession {
    /// Build a session from explicit collaborators.
    pub fn new(
        store: Arc<dyn WatchlistStore>,
        catalog: Arc<dyn SymbolCatalog>,
        quotes: Arc<dyn QuoteSource>,
        settings: Settings,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let context = Arc::new(SessionContext::new(settings.event_buffer)?);

        let watchlists = Arc::new(WatchlistController::new(store, Arc::clone(&context)));
        let search = Arc::new(SearchController::new(
            catalog,
            Arc::clone(&context),
            settings.fence_stale_searches,
        ));
        let poller = QuotePoller::new(quotes, Arc::clone(&context), settings.poll_interval());

        info!(
            poll_interval_ms = settings.poll_interval_ms,
            quote_source = ?settings.quote_source,
            catalog = ?settings.catalog,
            "session started"
        );

        Ok(Self {
            settings,
            context,
            watchlists,
            search,
            poller,
        })
    }

    /// Build a session with the collaborators named in `settings`.
    ///
    /// Watchlists are kept in `settings.store_path` when set, in memory otherwise.
    pub async fn from_settings(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        let collaborators = Collaborators::from_settings(&settings)?;
        let store: Arc<dyn WatchlistStore> = match &settings.store_path {
            Some(path) => Arc::new(JsonFileWatchlistStore::open(path.clone()).await?),
            None => Arc::new(MemoryWatchlistStore::new()),
        };
        Self::new(store, collaborators.catalog, collaborators.quotes, settings)
    }

    /// A fully offline session with default settings.
    pub fn simulated() -> Result<Self, CoreError> {
        let collaborators = Collaborators::simulated();
        Self::new(
            Arc::new(MemoryWatchlistStore::new()),
            collaborators.catalog,
            collaborators.quotes,
            Settings::default(),
        )
    }

    // ── Watchlist Commands ──────────────────────────────────────────

    /// Persist a new watchlist and make it current.
    pub fn add_watchlist(&self, watchlist: Watchlist) -> CommandHandle<Watchlist> {
        let controller = Arc::clone(&self.watchlists);
        self.run(async move { controller.add_watchlist(watchlist).await })
    }

    /// Rename the watchlist called `previous_name` and make it current.
    pub fn update_watchlist(
        &self,
        previous_name: impl Into<String>,
        watchlist: Watchlist,
    ) -> CommandHandle<()> {
        let controller = Arc::clone(&self.watchlists);
        let previous_name = previous_name.into();
        self.run(async move { controller.update_watchlist(&previous_name, watchlist).await })
    }

    /// Delete a watchlist; the default becomes current if it was active.
    pub fn delete_watchlist(&self, watchlist: Watchlist) -> CommandHandle<()> {
        let controller = Arc::clone(&self.watchlists);
        self.run(async move { controller.delete_watchlist(watchlist).await })
    }

    /// Make an already stored watchlist current.
    pub fn select_watchlist(&self, watchlist: Watchlist) -> Result<(), CoreError> {
        self.watchlists.select_watchlist(watchlist)
    }

    // ── Symbol Selection ────────────────────────────────────────────

    /// Select a symbol (or move an already selected ticker to a new watchlist).
    pub fn select_symbol(&self, symbol: Symbol) -> bool {
        self.watchlists.select_symbol(symbol)
    }

    pub fn deselect_symbol(&self, name: &str) -> bool {
        self.watchlists.deselect_symbol(name)
    }

    pub fn clear_selected_symbols(&self) {
        self.watchlists.clear_selection();
    }

    // ── Search ──────────────────────────────────────────────────────

    /// Search the catalog; results replace `search_results` on success.
    ///
    /// The query's generation is fixed here, in issue order, before the
    /// command is spawned.
    pub fn search(&self, query: impl Into<String>) -> CommandHandle<Vec<Symbol>> {
        let controller = Arc::clone(&self.search);
        let query = query.into();
        let ticket = controller.begin();
        self.run(async move { controller.run(ticket, &query).await })
    }

    pub fn clear_search_results(&self) {
        self.search.clear_results();
    }

    // ── Quotes ──────────────────────────────────────────────────────

    /// Poll `symbol` until stopped, replacing any symbol already polled.
    pub fn start_quote_polling(&self, symbol: &str) {
        self.poller.start(symbol);
    }

    pub fn stop_quote_polling(&self) {
        self.poller.stop();
    }

    #[must_use]
    pub fn poller_state(&self) -> PollerState {
        self.poller.state()
    }

    // ── Snapshots ───────────────────────────────────────────────────

    #[must_use]
    pub fn current_watchlist(&self) -> Watchlist {
        self.context.current_watchlist()
    }

    #[must_use]
    pub fn watchlists(&self) -> Vec<Watchlist> {
        self.context.watchlists()
    }

    #[must_use]
    pub fn selected_symbols(&self) -> Vec<Symbol> {
        self.context.selected_symbols()
    }

    #[must_use]
    pub fn search_results(&self) -> Vec<Symbol> {
        self.context.search_results()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Subscriptions ───────────────────────────────────────────────

    pub fn subscribe_current_watchlist(&self) -> StateSubscription<Watchlist> {
        self.context.subscribe_current_watchlist()
    }

    pub fn subscribe_watchlists(&self) -> StateSubscription<Vec<Watchlist>> {
        self.context.subscribe_watchlists()
    }

    pub fn subscribe_selected_symbols(&self) -> StateSubscription<Vec<Symbol>> {
        self.context.subscribe_selected_symbols()
    }

    pub fn subscribe_search_results(&self) -> StateSubscription<Vec<Symbol>> {
        self.context.subscribe_search_results()
    }

    pub fn subscribe_quotes(&self) -> EventSubscription<QuoteUpdate> {
        self.context.subscribe_quotes()
    }

    pub fn subscribe_errors(&self) -> EventSubscription<ErrorNotice> {
        self.context.subscribe_errors()
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Cancel polling, the watchlist feed and in-flight commands, and close
    /// every subscription. Idempotent.
    pub fn shutdown(&self) {
        if !self.context.trigger_shutdown() {
            return;
        }
        self.poller.stop();
        self.watchlists.stop_feed();
        info!("session shut down");
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.context.is_shut_down()
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Spawn a command that is abandoned on shutdown.
    fn run<T, F>(&self, command: F) -> CommandHandle<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        if self.context.is_shut_down() {
            warn!("command issued after shutdown, ignored");
            return CommandHandle::Rejected;
        }
        let shutdown = self.context.shutdown_signal();
        CommandHandle::Running(self.context.spawn(async move {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => Err(CoreError::SessionClosed),
                result = command => result,
            }
        }))
    }
}

impl Drop for WatchlistSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
