// ═══════════════════════════════════════════════════════════════════
// Controller Tests — adapters, watchlist/search controllers, quote poller
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use watchlist_core::adapters::{CatalogAdapter, QuoteAdapter, StoreAdapter};
use watchlist_core::controllers::quote_poller::{PollerState, QuotePoller};
use watchlist_core::controllers::search_controller::SearchController;
use watchlist_core::controllers::watchlist_controller::WatchlistController;
use watchlist_core::errors::{CoreError, ErrorKind};
use watchlist_core::models::notice::ErrorOrigin;
use watchlist_core::models::quote::Quote;
use watchlist_core::models::symbol::Symbol;
use watchlist_core::models::watchlist::Watchlist;
use watchlist_core::providers::traits::{QuoteSource, SymbolCatalog, WatchlistFeed, WatchlistStore};
use watchlist_core::session::SessionContext;
use watchlist_core::storage::memory::MemoryWatchlistStore;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Collaborators
// ═══════════════════════════════════════════════════════════════════

fn context() -> Arc<SessionContext> {
    Arc::new(SessionContext::new(16).unwrap())
}

/// A store whose writes always fail with the given error.
struct BrokenStore {
    feed: watch::Sender<Vec<Watchlist>>,
    error: CoreError,
}

impl BrokenStore {
    fn new(error: CoreError) -> Self {
        Self {
            feed: watch::channel(vec![Watchlist::default_watchlist()]).0,
            error,
        }
    }
}

#[async_trait]
impl WatchlistStore for BrokenStore {
    fn name(&self) -> &str {
        "Broken"
    }

    async fn add(&self, _watchlist: &Watchlist) -> Result<Watchlist, CoreError> {
        Err(self.error.clone())
    }

    async fn update(&self, _previous: &str, _watchlist: &Watchlist) -> Result<(), CoreError> {
        Err(self.error.clone())
    }

    async fn remove(&self, _watchlist: &Watchlist) -> Result<(), CoreError> {
        Err(self.error.clone())
    }

    fn stream_all(&self) -> Result<WatchlistFeed, CoreError> {
        Ok(self.feed.subscribe())
    }
}

/// A store that cannot be subscribed to.
struct FeedlessStore;

#[async_trait]
impl WatchlistStore for FeedlessStore {
    fn name(&self) -> &str {
        "Feedless"
    }

    async fn add(&self, watchlist: &Watchlist) -> Result<Watchlist, CoreError> {
        Ok(watchlist.clone())
    }

    async fn update(&self, _previous: &str, _watchlist: &Watchlist) -> Result<(), CoreError> {
        Ok(())
    }

    async fn remove(&self, _watchlist: &Watchlist) -> Result<(), CoreError> {
        Ok(())
    }

    fn stream_all(&self) -> Result<WatchlistFeed, CoreError> {
        Err(CoreError::Persistence("database closed".into()))
    }
}

/// A catalog answering from a fixed table, optionally after a delay.
/// Unknown queries return no symbols.
#[derive(Default)]
struct ScriptedCatalog {
    answers: HashMap<String, (Duration, Result<Vec<Symbol>, CoreError>)>,
}

impl ScriptedCatalog {
    fn answer(mut self, query: &str, result: Result<Vec<Symbol>, CoreError>) -> Self {
        self.answers
            .insert(query.to_string(), (Duration::ZERO, result));
        self
    }

    fn slow_answer(
        mut self,
        query: &str,
        delay: Duration,
        result: Result<Vec<Symbol>, CoreError>,
    ) -> Self {
        self.answers.insert(query.to_string(), (delay, result));
        self
    }
}

#[async_trait]
impl SymbolCatalog for ScriptedCatalog {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn search(&self, query: &str) -> Result<Vec<Symbol>, CoreError> {
        match self.answers.get(query) {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                result.clone()
            }
            None => Ok(Vec::new()),
        }
    }
}

/// A quote source replaying a script, then quoting 100.0 forever.
#[derive(Default)]
struct ScriptedQuotes {
    script: Mutex<VecDeque<Result<Quote, CoreError>>>,
    calls: AtomicUsize,
}

impl ScriptedQuotes {
    fn with_script(script: Vec<Result<Quote, CoreError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for ScriptedQuotes {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn fetch(&self, _symbol: &str) -> Result<Quote, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Quote::from_last(100.0)))
    }
}

fn sym(name: &str, watchlist: &str) -> Symbol {
    if watchlist.is_empty() {
        Symbol::unassigned(name)
    } else {
        Symbol::new(name, Watchlist::new(watchlist))
    }
}

// ═══════════════════════════════════════════════════════════════════
// Adapters
// ═══════════════════════════════════════════════════════════════════

mod adapters {
    use super::*;

    #[tokio::test]
    async fn store_errors_become_persistence() {
        let adapter = StoreAdapter::new(Arc::new(BrokenStore::new(CoreError::Network(
            "connection reset".into(),
        ))));
        let err = adapter.add(&Watchlist::new("Tech")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn store_persistence_errors_pass_through() {
        let adapter = StoreAdapter::new(Arc::new(BrokenStore::new(
            CoreError::DuplicateWatchlist("Tech".into()),
        )));
        let err = adapter.add(&Watchlist::new("Tech")).await.unwrap_err();
        assert_eq!(err, CoreError::DuplicateWatchlist("Tech".into()));
    }

    #[tokio::test]
    async fn catalog_blank_query_is_no_matches() {
        let adapter = CatalogAdapter::new(Arc::new(ScriptedCatalog::default()));
        let err = adapter.search("  ").await.unwrap_err();
        assert_eq!(err, CoreError::NoMatches(String::new()));
    }

    #[tokio::test]
    async fn catalog_empty_result_is_no_matches() {
        let adapter = CatalogAdapter::new(Arc::new(ScriptedCatalog::default()));
        let err = adapter.search("ZZZZ").await.unwrap_err();
        assert_eq!(err, CoreError::NoMatches("ZZZZ".into()));
    }

    #[tokio::test]
    async fn catalog_duplicates_collapsed() {
        let catalog = ScriptedCatalog::default().answer(
            "AAP",
            Ok(vec![
                sym("AAP", ""),
                sym("AAPL", ""),
                Symbol::unassigned("aap").with_description("dup"),
            ]),
        );
        let adapter = CatalogAdapter::new(Arc::new(catalog));
        let found = adapter.search("AAP").await.unwrap();
        let names: Vec<&str> = found.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["AAP", "AAPL"]);
        assert!(found[0].description.is_none());
    }

    #[tokio::test]
    async fn catalog_other_errors_become_network() {
        let catalog =
            ScriptedCatalog::default().answer("AAPL", Err(CoreError::Persistence("cache".into())));
        let adapter = CatalogAdapter::new(Arc::new(catalog));
        let err = adapter.search("AAPL").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn quote_invalid_prices_rejected() {
        let source = ScriptedQuotes::with_script(vec![Ok(Quote::new(f64::NAN, 1.0, 1.0))]);
        let adapter = QuoteAdapter::new(Arc::new(source));
        let err = adapter.fetch("AAPL").await.unwrap_err();
        assert!(matches!(err, CoreError::Api { ref provider, .. } if provider == "Scripted"));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn quote_blank_symbol_not_fetched() {
        let source = Arc::new(ScriptedQuotes::default());
        let adapter = QuoteAdapter::new(source.clone());
        let err = adapter.fetch(" ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(source.calls(), 0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// WatchlistController
// ═══════════════════════════════════════════════════════════════════

mod watchlist_controller {
    use super::*;

    async fn controller_with(names: &[&str]) -> (WatchlistController, Arc<SessionContext>) {
        let ctx = context();
        let store = MemoryWatchlistStore::with_watchlists(names.iter().copied()).unwrap();
        let controller = WatchlistController::new(Arc::new(store), Arc::clone(&ctx));
        let expected = names.len() + 1;
        ctx.subscribe_watchlists()
            .wait_for(|all| all.len() == expected)
            .await
            .unwrap();
        (controller, ctx)
    }

    #[tokio::test]
    async fn forwards_store_feed() {
        let (controller, ctx) = controller_with(&["Tech"]).await;
        let mut all = ctx.subscribe_watchlists();

        controller.add_watchlist(Watchlist::new("Energy")).await.unwrap();
        let snapshot = all.wait_for(|w| w.len() == 3).await.unwrap();
        assert_eq!(snapshot[2].name, "Energy");
    }

    #[tokio::test]
    async fn add_makes_current() {
        let (controller, ctx) = controller_with(&[]).await;
        let stored = controller.add_watchlist(Watchlist::new("Tech")).await.unwrap();
        assert_eq!(stored.id, 2);
        assert_eq!(ctx.current_watchlist(), Watchlist::new("Tech"));
        assert_eq!(ctx.current_watchlist().id, 2);
    }

    #[tokio::test]
    async fn add_duplicate_reports_and_keeps_current() {
        let (controller, ctx) = controller_with(&["Tech"]).await;
        let mut errors = ctx.subscribe_errors();

        let err = controller.add_watchlist(Watchlist::new("Tech")).await.unwrap_err();
        assert_eq!(err, CoreError::DuplicateWatchlist("Tech".into()));
        assert!(ctx.current_watchlist().is_default_watchlist());

        let notice = errors.next().await.unwrap();
        assert_eq!(notice.origin, ErrorOrigin::Watchlist);
        assert_eq!(notice.kind, ErrorKind::Persistence);
    }

    #[tokio::test]
    async fn delete_current_resets_to_default() {
        let (controller, ctx) = controller_with(&[]).await;
        controller.add_watchlist(Watchlist::new("Tech")).await.unwrap();
        controller.select_symbol(sym("AAPL", "Tech"));
        controller.select_symbol(sym("MSFT", ""));

        controller.delete_watchlist(Watchlist::new("Tech")).await.unwrap();

        assert!(ctx.current_watchlist().is_default_watchlist());
        let selected = ctx.selected_symbols();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "MSFT");
    }

    #[tokio::test]
    async fn delete_other_keeps_current() {
        let (controller, ctx) = controller_with(&["Energy"]).await;
        controller.add_watchlist(Watchlist::new("Tech")).await.unwrap();

        controller.delete_watchlist(Watchlist::new("Energy")).await.unwrap();
        assert_eq!(ctx.current_watchlist().name, "Tech");
    }

    #[tokio::test]
    async fn delete_default_is_noop() {
        let (controller, ctx) = controller_with(&[]).await;
        controller.select_symbol(sym("AAPL", ""));

        controller.delete_watchlist(Watchlist::default_watchlist()).await.unwrap();

        assert!(ctx.current_watchlist().is_default_watchlist());
        let selected = ctx.selected_symbols();
        assert_eq!(selected.len(), 1);
        assert!(selected[0].watchlist.is_default_watchlist());
    }

    #[tokio::test]
    async fn delete_store_failure_still_updates_memory() {
        let ctx = context();
        let controller = WatchlistController::new(
            Arc::new(BrokenStore::new(CoreError::Persistence("disk full".into()))),
            Arc::clone(&ctx),
        );
        let mut errors = ctx.subscribe_errors();
        controller.select_symbol(sym("AAPL", "Tech"));

        let err = controller.delete_watchlist(Watchlist::new("Tech")).await.unwrap_err();
        assert_eq!(err, CoreError::Persistence("disk full".into()));
        assert!(ctx.selected_symbols().is_empty());
        assert_eq!(errors.next().await.unwrap().message, "Persistence error: disk full");
    }

    #[tokio::test]
    async fn update_renames_current_and_selection() {
        let (controller, ctx) = controller_with(&[]).await;
        controller.add_watchlist(Watchlist::new("Tech")).await.unwrap();
        controller.select_symbol(sym("AAPL", "Tech"));
        controller.select_symbol(sym("XOM", "Energy"));

        controller
            .update_watchlist("Tech", Watchlist::new("Technology"))
            .await
            .unwrap();

        assert_eq!(ctx.current_watchlist().name, "Technology");
        let selected = ctx.selected_symbols();
        assert!(selected[0].belongs_to("Technology"));
        assert!(selected[1].belongs_to("Energy"));

        let all = ctx
            .subscribe_watchlists()
            .wait_for(|w| w.iter().any(|w| w.name == "Technology"))
            .await
            .unwrap();
        assert!(!all.iter().any(|w| w.name == "Tech"));
    }

    #[tokio::test]
    async fn update_store_failure_keeps_memory_changes() {
        let ctx = context();
        let controller = WatchlistController::new(
            Arc::new(BrokenStore::new(CoreError::Persistence("read only".into()))),
            Arc::clone(&ctx),
        );
        controller.select_symbol(sym("AAPL", "Tech"));

        let result = controller
            .update_watchlist("Tech", Watchlist::new("Technology"))
            .await;
        assert!(result.is_err());
        assert_eq!(ctx.current_watchlist().name, "Technology");
        assert!(ctx.selected_symbols()[0].belongs_to("Technology"));
    }

    #[tokio::test]
    async fn feed_failure_is_published() {
        let ctx = context();
        let mut errors = ctx.subscribe_errors();
        let _controller = WatchlistController::new(Arc::new(FeedlessStore), Arc::clone(&ctx));

        let notice = errors.try_next().unwrap();
        assert_eq!(notice.kind, ErrorKind::Persistence);
        assert!(notice.message.contains("database closed"));
    }

    #[tokio::test]
    async fn select_symbol_moves_existing_ticker() {
        let (controller, ctx) = controller_with(&[]).await;
        assert!(controller.select_symbol(sym("AAPL", "Tech")));
        assert!(!controller.select_symbol(sym("AAPL", "Tech")));
        assert!(controller.select_symbol(sym("aapl", "Growth")));

        let selected = ctx.selected_symbols();
        assert_eq!(selected.len(), 1);
        assert!(selected[0].belongs_to("Growth"));
    }

    #[tokio::test]
    async fn select_empty_ticker_ignored() {
        let (controller, ctx) = controller_with(&[]).await;
        assert!(!controller.select_symbol(sym("  ", "Tech")));
        assert!(ctx.selected_symbols().is_empty());
    }

    #[tokio::test]
    async fn deselect_and_clear() {
        let (controller, ctx) = controller_with(&[]).await;
        controller.select_symbol(sym("AAPL", ""));
        controller.select_symbol(sym("MSFT", ""));

        assert!(controller.deselect_symbol("aapl"));
        assert!(!controller.deselect_symbol("AAPL"));
        assert_eq!(ctx.selected_symbols().len(), 1);

        controller.clear_selection();
        assert!(ctx.selected_symbols().is_empty());
    }

    #[tokio::test]
    async fn select_known_watchlist() {
        let (controller, ctx) = controller_with(&["Tech", "Energy"]).await;
        controller.select_watchlist(Watchlist::new("Energy")).unwrap();
        assert_eq!(ctx.current_watchlist().name, "Energy");

        controller
            .select_watchlist(Watchlist::new("All Symbols"))
            .unwrap();
        assert!(ctx.current_watchlist().is_default);
    }

    #[tokio::test]
    async fn select_unknown_watchlist_rejected() {
        let (controller, ctx) = controller_with(&["Tech"]).await;
        let err = controller
            .select_watchlist(Watchlist::new("Energy"))
            .unwrap_err();
        assert_eq!(err, CoreError::WatchlistNotFound("Energy".into()));
        assert!(ctx.current_watchlist().is_default_watchlist());
    }
}

// ═══════════════════════════════════════════════════════════════════
// SearchController
// ═══════════════════════════════════════════════════════════════════

mod search_controller {
    use super::*;

    #[tokio::test]
    async fn success_replaces_results() {
        let ctx = context();
        let catalog = ScriptedCatalog::default().answer("AAPL", Ok(vec![sym("AAPL", "")]));
        let controller = SearchController::new(Arc::new(catalog), Arc::clone(&ctx), true);

        let found = controller.search("AAPL").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(ctx.search_results(), found);
    }

    #[tokio::test]
    async fn failure_keeps_previous_results() {
        let ctx = context();
        let catalog = ScriptedCatalog::default()
            .answer("AAPL", Ok(vec![sym("AAPL", "")]))
            .answer("AAP", Err(CoreError::Network("timeout".into())));
        let controller = SearchController::new(Arc::new(catalog), Arc::clone(&ctx), true);
        let mut errors = ctx.subscribe_errors();

        controller.search("AAPL").await.unwrap();
        let err = controller.search("AAP").await.unwrap_err();
        assert_eq!(err, CoreError::Network("timeout".into()));
        assert_eq!(ctx.search_results()[0].name, "AAPL");

        let notice = errors.next().await.unwrap();
        assert_eq!(notice.origin, ErrorOrigin::Search);
        assert_eq!(notice.kind, ErrorKind::Network);
    }

    #[tokio::test]
    async fn no_matches_published() {
        let ctx = context();
        let controller =
            SearchController::new(Arc::new(ScriptedCatalog::default()), Arc::clone(&ctx), true);
        let mut errors = ctx.subscribe_errors();

        assert!(controller.search("ZZZZ").await.is_err());
        assert_eq!(errors.next().await.unwrap().kind, ErrorKind::NotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn fenced_drops_superseded_response() {
        let ctx = context();
        let catalog = ScriptedCatalog::default()
            .slow_answer("A", Duration::from_millis(500), Ok(vec![sym("AAL", "")]))
            .answer("AAPL", Ok(vec![sym("AAPL", "")]));
        let controller = SearchController::new(Arc::new(catalog), Arc::clone(&ctx), true);

        let (slow, fast) = tokio::join!(controller.search("A"), controller.search("AAPL"));
        assert!(slow.is_ok());
        assert!(fast.is_ok());
        assert_eq!(ctx.search_results()[0].name, "AAPL");
    }

    #[tokio::test(start_paused = true)]
    async fn unfenced_last_response_wins() {
        let ctx = context();
        let catalog = ScriptedCatalog::default()
            .slow_answer("A", Duration::from_millis(500), Ok(vec![sym("AAL", "")]))
            .answer("AAPL", Ok(vec![sym("AAPL", "")]));
        let controller = SearchController::new(Arc::new(catalog), Arc::clone(&ctx), false);

        let _ = tokio::join!(controller.search("A"), controller.search("AAPL"));
        assert_eq!(ctx.search_results()[0].name, "AAL");
    }

    #[tokio::test]
    async fn ticket_taken_at_issue_decides_winner() {
        let ctx = context();
        let catalog = ScriptedCatalog::default()
            .answer("AAL", Ok(vec![sym("AAL", "")]))
            .answer("AAPL", Ok(vec![sym("AAPL", "")]));
        let controller = SearchController::new(Arc::new(catalog), Arc::clone(&ctx), true);

        let older = controller.begin();
        let newer = controller.begin();

        // The newer query completes first; the older one must not overwrite it.
        controller.run(newer, "AAPL").await.unwrap();
        controller.run(older, "AAL").await.unwrap();
        assert_eq!(ctx.search_results()[0].name, "AAPL");
    }

    #[tokio::test]
    async fn clear_supersedes_issued_but_not_started() {
        let ctx = context();
        let catalog = ScriptedCatalog::default().answer("AAPL", Ok(vec![sym("AAPL", "")]));
        let controller = SearchController::new(Arc::new(catalog), Arc::clone(&ctx), true);

        let ticket = controller.begin();
        controller.clear_results();
        controller.run(ticket, "AAPL").await.unwrap();
        assert!(ctx.search_results().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_supersedes_in_flight() {
        let ctx = context();
        let catalog = ScriptedCatalog::default().slow_answer(
            "AAPL",
            Duration::from_millis(500),
            Ok(vec![sym("AAPL", "")]),
        );
        let controller = SearchController::new(Arc::new(catalog), Arc::clone(&ctx), true);

        let clear = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            controller.clear_results();
        };
        let (result, ()) = tokio::join!(controller.search("AAPL"), clear);
        assert!(result.is_ok());
        assert!(ctx.search_results().is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// QuotePoller
// ═══════════════════════════════════════════════════════════════════

mod quote_poller {
    use super::*;

    const PERIOD: Duration = Duration::from_secs(5);

    #[tokio::test(start_paused = true)]
    async fn first_fetch_immediate_then_every_interval() {
        let ctx = context();
        let source = Arc::new(ScriptedQuotes::default());
        let poller = QuotePoller::new(source.clone(), Arc::clone(&ctx), PERIOD);
        let mut quotes = ctx.subscribe_quotes();

        let started = tokio::time::Instant::now();
        poller.start("aapl");
        assert_eq!(
            poller.state(),
            PollerState::Polling {
                symbol: "AAPL".into()
            }
        );

        let first = quotes.next().await.unwrap();
        assert_eq!(first.symbol, "AAPL");
        assert!(started.elapsed() < PERIOD);

        quotes.next().await.unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= PERIOD && elapsed < PERIOD * 2, "{elapsed:?}");
        assert_eq!(source.calls(), 2);

        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn failure_reported_and_polling_continues() {
        let ctx = context();
        let source = Arc::new(ScriptedQuotes::with_script(vec![Err(CoreError::Network(
            "timeout".into(),
        ))]));
        let poller = QuotePoller::new(source, Arc::clone(&ctx), PERIOD);
        let mut quotes = ctx.subscribe_quotes();
        let mut errors = ctx.subscribe_errors();

        poller.start("AAPL");

        let notice = errors.next().await.unwrap();
        assert_eq!(notice.origin, ErrorOrigin::Quote);
        assert_eq!(notice.kind, ErrorKind::Network);

        let update = quotes.next().await.unwrap();
        assert_eq!(update.quote.last_price, 100.0);
        assert!(matches!(poller.state(), PollerState::Polling { .. }));

        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_silences_stream() {
        let ctx = context();
        let poller = QuotePoller::new(Arc::new(ScriptedQuotes::default()), Arc::clone(&ctx), PERIOD);
        let mut quotes = ctx.subscribe_quotes();

        poller.start("AAPL");
        quotes.next().await.unwrap();
        poller.stop();
        poller.stop();

        assert_eq!(poller.state(), PollerState::Idle);
        let after = tokio::time::timeout(PERIOD * 3, quotes.next()).await;
        assert!(after.is_err(), "quote published after stop");
    }

    #[tokio::test(start_paused = true)]
    async fn restart_switches_symbol() {
        let ctx = context();
        let poller = QuotePoller::new(Arc::new(ScriptedQuotes::default()), Arc::clone(&ctx), PERIOD);
        let mut quotes = ctx.subscribe_quotes();

        poller.start("AAPL");
        assert_eq!(quotes.next().await.unwrap().symbol, "AAPL");

        poller.start("MSFT");
        for _ in 0..3 {
            assert_eq!(quotes.next().await.unwrap().symbol, "MSFT");
        }
        poller.stop();
    }

    #[tokio::test]
    async fn empty_symbol_rejected() {
        let ctx = context();
        let poller = QuotePoller::new(Arc::new(ScriptedQuotes::default()), Arc::clone(&ctx), PERIOD);
        let mut errors = ctx.subscribe_errors();

        poller.start("   ");
        assert_eq!(poller.state(), PollerState::Idle);
        assert_eq!(errors.try_next().unwrap().kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn invalid_quote_reported() {
        let ctx = context();
        let source = ScriptedQuotes::with_script(vec![Ok(Quote::new(-1.0, 1.0, 1.0))]);
        let poller = QuotePoller::new(Arc::new(source), Arc::clone(&ctx), PERIOD);
        let mut errors = ctx.subscribe_errors();

        poller.start("AAPL");
        let notice = errors.next().await.unwrap();
        assert!(notice.message.contains("Invalid quote"));
        poller.stop();
    }
}
