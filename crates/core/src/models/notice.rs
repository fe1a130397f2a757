use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::{CoreError, ErrorKind};

/// Which part of the session reported a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorOrigin {
    Watchlist,
    Search,
    Quote,
}

impl std::fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorOrigin::Watchlist => write!(f, "watchlist"),
            ErrorOrigin::Search => write!(f, "search"),
            ErrorOrigin::Quote => write!(f, "quote"),
        }
    }
}

/// One item on the unified error stream.
///
/// Carries a human-readable `message` for toasts plus the classified `kind`
/// so observers can react without parsing text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorNotice {
    pub origin: ErrorOrigin,
    pub kind: ErrorKind,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

impl ErrorNotice {
    pub fn new(origin: ErrorOrigin, error: &CoreError) -> Self {
        Self {
            origin,
            kind: error.kind(),
            message: error.to_string(),
            occurred_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for ErrorNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.origin, self.message)
    }
}
