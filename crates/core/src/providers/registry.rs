use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::settings::{CatalogKind, QuoteSourceKind, Settings};

use super::iex::IexQuoteSource;
use super::simulation::{SimulatedQuoteSource, StaticSymbolCatalog};
use super::traits::{QuoteSource, SymbolCatalog};
use super::yahoo_finance::{YahooQuoteSource, YahooSymbolCatalog};

/// The network-facing collaborators a session is built from.
///
/// Selection is a plain match over the configured kinds, so every
/// deployment target (live or simulated) is known at compile time.
pub struct Collaborators {
    pub catalog: Arc<dyn SymbolCatalog>,
    pub quotes: Arc<dyn QuoteSource>,
}

impl Collaborators {
    /// Build the catalog and quote source named by `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, CoreError> {
        let quotes: Arc<dyn QuoteSource> = match settings.quote_source {
            QuoteSourceKind::Simulated => Arc::new(SimulatedQuoteSource::new()),
            QuoteSourceKind::Iex => {
                let key = settings
                    .api_key("iex")
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| CoreError::MissingApiKey("iex".into()))?;
                Arc::new(IexQuoteSource::new(key.to_string()))
            }
            QuoteSourceKind::Yahoo => Arc::new(YahooQuoteSource::new()?),
        };

        let catalog: Arc<dyn SymbolCatalog> = match settings.catalog {
            CatalogKind::Static => Arc::new(StaticSymbolCatalog::new()),
            CatalogKind::Yahoo => Arc::new(YahooSymbolCatalog::new()?),
        };

        Ok(Self { catalog, quotes })
    }

    /// Fully offline collaborators: static catalog and simulated quotes.
    pub fn simulated() -> Self {
        Self {
            catalog: Arc::new(StaticSymbolCatalog::new()),
            quotes: Arc::new(SimulatedQuoteSource::new()),
        }
    }
}
