use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::quote::Quote;
use super::traits::QuoteSource;

const BASE_URL: &str = "https://cloud.iexapis.com/stable";

/// IEX Cloud quote provider.
///
/// - **Requires**: API token (set via settings as "iex").
/// - **Endpoint**: `/stock/{symbol}/quote`.
/// - **Data**: last sale plus top-of-book bid/ask on IEX.
///
/// IEX only reports a book while the symbol trades on its own venue; when
/// `iexBidPrice`/`iexAskPrice` are missing or zero the last price is used
/// for both sides.
pub struct IexQuoteSource {
    client: Client,
    api_key: String,
    base_url: String,
}

impl IexQuoteSource {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Point the provider at another deployment (sandbox, local mock).
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Map a raw `/quote` response body to a [`Quote`].
    pub fn quote_from_json(symbol: &str, body: &str) -> Result<Quote, CoreError> {
        let resp: IexQuoteResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: "IEX Cloud".into(),
            message: format!("Failed to parse quote for {symbol}: {e}"),
        })?;
        resp.into_quote(symbol)
    }
}

// ── IEX API response types ──────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IexQuoteResponse {
    latest_price: Option<f64>,
    iex_ask_price: Option<f64>,
    iex_bid_price: Option<f64>,
}

impl IexQuoteResponse {
    fn into_quote(self, symbol: &str) -> Result<Quote, CoreError> {
        let last = self
            .latest_price
            .ok_or_else(|| CoreError::QuoteNotAvailable(symbol.to_uppercase()))?;
        let book = |side: Option<f64>| side.filter(|p| *p > 0.0).unwrap_or(last);
        Ok(Quote::new(
            last,
            book(self.iex_ask_price),
            book(self.iex_bid_price),
        ))
    }
}

#[async_trait]
impl QuoteSource for IexQuoteSource {
    fn name(&self) -> &str {
        "IEX Cloud"
    }

    async fn fetch(&self, symbol: &str) -> Result<Quote, CoreError> {
        let symbol = symbol.trim().to_uppercase();
        let url = format!("{}/stock/{}/quote", self.base_url, symbol);

        let resp = self
            .client
            .get(&url)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Err(CoreError::QuoteNotAvailable(symbol)),
            status if !status.is_success() => {
                return Err(CoreError::Api {
                    provider: "IEX Cloud".into(),
                    message: format!("HTTP {status} for {symbol}"),
                });
            }
            _ => {}
        }

        let body = resp.text().await?;
        Self::quote_from_json(&symbol, &body)
    }
}
