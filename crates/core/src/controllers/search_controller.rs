use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::adapters::CatalogAdapter;
use crate::errors::CoreError;
use crate::models::notice::ErrorOrigin;
use crate::models::symbol::Symbol;
use crate::providers::traits::SymbolCatalog;
use crate::session::SessionContext;

/// Dispatches symbol searches and publishes their results.
///
/// Searches are never cancelled. With fencing on, each query takes a
/// generation number when it is issued and only the newest generation may
/// publish; responses to superseded queries are dropped. With fencing off,
/// whichever response completes last wins.
///
/// The generation check and the publish happen under one lock, so a
/// response that passes the check cannot land after a newer one.
pub struct SearchController {
    catalog: CatalogAdapter,
    ctx: Arc<SessionContext>,
    generation: Mutex<u64>,
    fenced: bool,
}

impl SearchController {
    pub fn new(catalog: Arc<dyn SymbolCatalog>, ctx: Arc<SessionContext>, fenced: bool) -> Self {
        Self {
            catalog: CatalogAdapter::new(catalog),
            ctx,
            generation: Mutex::new(0),
            fenced,
        }
    }

    /// Issue a new query generation, superseding every earlier one.
    ///
    /// Call this at the point the query is issued, before any task is
    /// spawned for it, and hand the ticket to [`Self::run`].
    pub fn begin(&self) -> u64 {
        let mut generation = self.lock();
        *generation += 1;
        *generation
    }

    /// Run `query` against the catalog.
    ///
    /// On success the published results are replaced; on failure the error
    /// is published and the previous results stay. The outcome is returned
    /// either way, including for superseded queries.
    pub async fn search(&self, query: &str) -> Result<Vec<Symbol>, CoreError> {
        let ticket = self.begin();
        self.run(ticket, query).await
    }

    /// Run `query` under a ticket obtained from [`Self::begin`].
    pub async fn run(&self, ticket: u64, query: &str) -> Result<Vec<Symbol>, CoreError> {
        let result = self.catalog.search(query).await;

        let generation = self.lock();
        if self.fenced && *generation != ticket {
            debug!(query, ticket, latest = *generation, "dropping superseded search response");
            return result;
        }

        match &result {
            Ok(symbols) => {
                info!(query, count = symbols.len(), "search results");
                self.ctx.publish_search_results(symbols.clone());
            }
            Err(e) => {
                warn!(catalog = self.catalog.name(), query, error = %e, "search failed");
                self.ctx.publish_error(ErrorOrigin::Search, e);
            }
        }
        drop(generation);
        result
    }

    /// Empty the published results and supersede every query issued so far.
    pub fn clear_results(&self) {
        let mut generation = self.lock();
        *generation += 1;
        self.ctx.publish_search_results(Vec::new());
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
