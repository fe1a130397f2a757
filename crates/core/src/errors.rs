use serde::Serialize;
use thiserror::Error;

/// Unified error type for the entire watchlist-core library.
/// Every fallible operation returns `Result<T, CoreError>`.
///
/// Errors are `Clone` so the same failure can be logged, published on the
/// session's error stream and returned to a caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    // ── Persistence ─────────────────────────────────────────────────
    #[error("Watchlist already exists: {0}")]
    DuplicateWatchlist(String),

    #[error("Watchlist not found: {0}")]
    WatchlistNotFound(String),

    #[error("Invalid watchlist: {0}")]
    InvalidWatchlist(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Invalid store file: {0}")]
    InvalidStoreFile(String),

    #[error("Unsupported store file version: {0}")]
    UnsupportedVersion(u16),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Lookup ──────────────────────────────────────────────────────
    #[error("No symbols match query: {0}")]
    NoMatches(String),

    #[error("Quote not available for {0}")]
    QuoteNotAvailable(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Missing API key for provider: {0}")]
    MissingApiKey(String),

    // ── Lifecycle ───────────────────────────────────────────────────
    #[error("Session has been shut down")]
    SessionClosed,
}

/// Coarse classification of a [`CoreError`], used by observers that only
/// care about what failed rather than the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The store rejected a read or write.
    Persistence,
    /// A catalog or quote fetch failed: timeout, transport, malformed response.
    Network,
    /// A query or symbol produced no result.
    NotFound,
    /// Settings or credentials are unusable.
    Configuration,
    /// The session was already shut down.
    Lifecycle,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Persistence => write!(f, "persistence"),
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Lifecycle => write!(f, "lifecycle"),
        }
    }
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::DuplicateWatchlist(_)
            | CoreError::WatchlistNotFound(_)
            | CoreError::InvalidWatchlist(_)
            | CoreError::Persistence(_)
            | CoreError::FileIO(_)
            | CoreError::InvalidStoreFile(_)
            | CoreError::UnsupportedVersion(_) => ErrorKind::Persistence,

            CoreError::Api { .. } | CoreError::Network(_) | CoreError::Deserialization(_) => {
                ErrorKind::Network
            }

            CoreError::NoMatches(_) | CoreError::QuoteNotAvailable(_) => ErrorKind::NotFound,

            CoreError::Config(_) | CoreError::MissingApiKey(_) => ErrorKind::Configuration,

            CoreError::SessionClosed => ErrorKind::Lifecycle,
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; the query string holds the API token.
        CoreError::Network(redact_query(&e.to_string()))
    }
}

/// Strip everything after the first `?` of a message that may contain a URL.
pub(crate) fn redact_query(msg: &str) -> String {
    match msg.find('?') {
        Some(idx) => format!("{}?<query redacted>", &msg[..idx]),
        None => msg.to_string(),
    }
}
