//! Request and response types for the sd-daemon HTTP endpoints.
//!
//! These types are `Serialize + Deserialize` so they can be JSON-encoded
//! by Axum and decoded by tests. No business logic lives here.

use sd_md::{Bar, QuoteSnapshot};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// /health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Whether `/top-stocks` has populated the catalog cache yet.
    pub catalog_loaded: bool,
}

// ---------------------------------------------------------------------------
// Errors (every non-2xx)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// /stock/:symbol
// ---------------------------------------------------------------------------

/// Quote plus daily history since the configured start date, in provider order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockResponse {
    pub quote: QuoteSnapshot,
    pub history: Vec<Bar>,
}

// ---------------------------------------------------------------------------
// /whatif/:symbol
// ---------------------------------------------------------------------------

/// Raw query string for `/whatif/:symbol`.
///
/// Kept as strings so bad input turns into a JSON 400 instead of Axum's
/// plain-text rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhatIfQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub amount: Option<String>,
}
