//! sd-md
//!
//! Market data gateway for the stock desk services.
//!
//! This crate owns the gateway abstraction, the daily-bar and quote types, and
//! the concrete Yahoo Finance chart client. It does **not** cache anything and
//! never retries; callers decide what to do with a [`GatewayError`].

pub mod normalizer;
pub mod provider;
pub mod yahoo;

pub use normalizer::normalize_history;
pub use provider::{GatewayError, MarketDataGateway};
pub use yahoo::YahooGateway;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One historical trading-day record.
///
/// Serialized with the field names clients of the HTTP surface expect
/// (`date`, `open`, ..., `adjClose`, `volume`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    /// Session timestamp (UTC).
    pub date: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adj_close: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

/// Date range for a history request.
///
/// `start` is inclusive. `end` is inclusive when present; `None` means
/// "up to the most recent session".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl HistoryRange {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Open-ended range starting at `start`.
    pub fn since(start: NaiveDate) -> Self {
        Self { start, end: None }
    }
}

/// Point-in-time quote for a symbol.
///
/// The handful of fields the desk relies on are typed; everything else the
/// provider sends is kept verbatim in `extra` and flattened back out on
/// serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSnapshot {
    pub symbol: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub exchange_name: Option<String>,
    #[serde(default)]
    pub regular_market_price: Option<f64>,
    /// Epoch seconds of the last regular-session trade.
    #[serde(default)]
    pub regular_market_time: Option<i64>,
    #[serde(default)]
    pub previous_close: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
