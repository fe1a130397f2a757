use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time price snapshot for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub last_price: f64,
    pub ask_price: f64,
    pub bid_price: f64,
}

impl Quote {
    pub fn new(last_price: f64, ask_price: f64, bid_price: f64) -> Self {
        Self {
            last_price,
            ask_price,
            bid_price,
        }
    }

    /// A quote with no book: bid and ask both equal the last price.
    pub fn from_last(last_price: f64) -> Self {
        Self::new(last_price, last_price, last_price)
    }

    pub fn spread(&self) -> f64 {
        self.ask_price - self.bid_price
    }

    pub fn mid(&self) -> f64 {
        (self.ask_price + self.bid_price) / 2.0
    }

    /// All three prices must be finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.last_price, self.ask_price, self.bid_price]
            .iter()
            .all(|p| p.is_finite() && *p >= 0.0)
    }
}

/// A quote as published on the session's quote stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteUpdate {
    pub symbol: String,
    pub quote: Quote,
    pub received_at: DateTime<Utc>,
}

impl QuoteUpdate {
    pub fn new(symbol: impl Into<String>, quote: Quote) -> Self {
        Self {
            symbol: symbol.into(),
            quote,
            received_at: Utc::now(),
        }
    }
}
