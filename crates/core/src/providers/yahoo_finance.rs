use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::quote::Quote;
use crate::models::symbol::Symbol;
use super::traits::{QuoteSource, SymbolCatalog};

const PROVIDER: &str = "Yahoo Finance";

fn connector() -> Result<yahoo_finance_api::YahooConnector, CoreError> {
    yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("Failed to create connector: {e}"),
    })
}

/// Yahoo Finance quote source.
///
/// - **Free**: No API key required.
/// - **Data**: latest close from the daily chart endpoint.
///
/// The chart endpoint carries no order book, so bid and ask mirror the last
/// price. Prefer IEX when a spread matters.
pub struct YahooQuoteSource {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooQuoteSource {
    pub fn new() -> Result<Self, CoreError> {
        Ok(Self {
            connector: connector()?,
        })
    }
}

#[async_trait]
impl QuoteSource for YahooQuoteSource {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch(&self, symbol: &str) -> Result<Quote, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch latest quote for {symbol}: {e}"),
            })?;

        let quote = resp
            .last_quote()
            .map_err(|_| CoreError::QuoteNotAvailable(symbol.to_uppercase()))?;

        Ok(Quote::from_last(quote.close))
    }
}

/// Yahoo Finance ticker search.
pub struct YahooSymbolCatalog {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooSymbolCatalog {
    pub fn new() -> Result<Self, CoreError> {
        Ok(Self {
            connector: connector()?,
        })
    }
}

#[async_trait]
impl SymbolCatalog for YahooSymbolCatalog {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn search(&self, query: &str) -> Result<Vec<Symbol>, CoreError> {
        let resp = self
            .connector
            .search_ticker(query)
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to search for {query}: {e}"),
            })?;

        Ok(resp
            .quotes
            .into_iter()
            .map(|item| {
                let symbol = Symbol::unassigned(item.symbol);
                if item.short_name.is_empty() {
                    symbol
                } else {
                    symbol.with_description(item.short_name)
                }
            })
            .collect())
    }
}
