use serde::{Deserialize, Serialize};

/// Name of the well-known default watchlist.
pub const DEFAULT_WATCHLIST_NAME: &str = "All Symbols";

/// A named, user-defined grouping of symbols.
///
/// **Equality and hashing** are based solely on `name`, which is the
/// primary key of a watchlist. Two values with the same name but different
/// `id`s (e.g. one built by the UI, one read back from the store) refer to
/// the same watchlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watchlist {
    /// Unique display name, trimmed.
    pub name: String,

    /// `true` only for the well-known "All Symbols" watchlist.
    #[serde(default)]
    pub is_default: bool,

    /// Store-assigned identifier; `0` until persisted.
    #[serde(default)]
    pub id: i64,
}

impl PartialEq for Watchlist {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Watchlist {}

impl std::hash::Hash for Watchlist {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Watchlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Watchlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            is_default: false,
            id: 0,
        }
    }

    /// The fallback watchlist that always exists, persisted or not.
    pub fn default_watchlist() -> Self {
        Self {
            name: DEFAULT_WATCHLIST_NAME.to_string(),
            is_default: true,
            id: 0,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// True for the default watchlist, whether flagged or matched by name.
    pub fn is_default_watchlist(&self) -> bool {
        self.is_default || self.name == DEFAULT_WATCHLIST_NAME
    }
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::default_watchlist()
    }
}
