use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::CoreError;

/// Default quote poll period.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// Default capacity of the quote and error event streams.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Largest accepted event stream capacity. Buffers are allocated up front.
pub const MAX_EVENT_BUFFER: usize = 1 << 16;

/// Which quote collaborator a session talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSourceKind {
    /// Random-walk prices generated locally, no network.
    #[default]
    Simulated,
    /// IEX Cloud quote endpoint, requires the `iex` API key.
    Iex,
    /// Yahoo Finance latest close, no API key.
    Yahoo,
}

/// Which symbol catalog a session searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    /// Built-in ticker list, no network.
    #[default]
    Static,
    /// Yahoo Finance ticker search.
    Yahoo,
}

/// Session configuration. Every field has a default, so an empty JSON
/// object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Quote poll period in milliseconds. Constant for the session's lifetime.
    pub poll_interval_ms: u64,

    pub quote_source: QuoteSourceKind,

    pub catalog: CatalogKind,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "iex"). Values: the API key string.
    pub api_keys: HashMap<String, String>,

    /// Capacity of the quote and error event streams.
    pub event_buffer: usize,

    /// Drop search responses that arrive after a newer query was issued.
    pub fence_stale_searches: bool,

    /// Where to persist watchlists. In-memory store when unset.
    pub store_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            quote_source: QuoteSourceKind::default(),
            catalog: CatalogKind::default(),
            api_keys: HashMap::new(),
            event_buffer: DEFAULT_EVENT_BUFFER,
            fence_stale_searches: true,
            store_path: None,
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn api_key(&self, provider: &str) -> Option<&str> {
        self.api_keys.get(provider).map(String::as_str)
    }

    /// Parse settings from JSON and validate them.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)
            .map_err(|e| CoreError::Config(format!("Failed to parse settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file on disk.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CoreError::Config(format!(
                "Failed to read settings file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Reject settings a session cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.poll_interval_ms == 0 {
            return Err(CoreError::Config(
                "poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.event_buffer == 0 || self.event_buffer > MAX_EVENT_BUFFER {
            return Err(CoreError::Config(format!(
                "event_buffer must be between 1 and {MAX_EVENT_BUFFER}, got {}",
                self.event_buffer
            )));
        }
        if self.quote_source == QuoteSourceKind::Iex
            && self.api_key("iex").map_or(true, str::is_empty)
        {
            return Err(CoreError::MissingApiKey("iex".into()));
        }
        Ok(())
    }
}
