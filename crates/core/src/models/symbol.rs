use serde::{Deserialize, Serialize};

use super::watchlist::Watchlist;

/// A tradable instrument and the watchlist it is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Ticker, uppercased (e.g., "AAPL").
    pub name: String,

    /// Owning watchlist. A symbol belongs to exactly one at a time.
    pub watchlist: Watchlist,

    /// Human-readable instrument name from the catalog, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, watchlist: Watchlist) -> Self {
        Self {
            name: name.into().trim().to_uppercase(),
            watchlist,
            description: None,
        }
    }

    /// A symbol assigned to the default watchlist, as returned by catalogs.
    pub fn unassigned(name: impl Into<String>) -> Self {
        Self::new(name, Watchlist::default_watchlist())
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether this symbol is assigned to the watchlist called `watchlist_name`.
    pub fn belongs_to(&self, watchlist_name: &str) -> bool {
        self.watchlist.name == watchlist_name
    }
}
