//! sd-whatif
//!
//! Hypothetical buy-and-hold return over a historical window:
//!
//! ```text
//! shares      = amount / start_price
//! final_value = shares * end_price
//! profit      = final_value - amount
//! ```
//!
//! `start_price` / `end_price` are the closes of the first / last bar after
//! the series is sorted ascending by date. The sorted series is returned with
//! the result. Nothing is cached.

use std::fmt;

use chrono::NaiveDate;
use sd_md::{normalize_history, Bar, GatewayError, HistoryRange, MarketDataGateway};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// Request / result
// ---------------------------------------------------------------------------

/// Inputs for one what-if calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct WhatIfRequest {
    pub symbol: String,
    pub start: NaiveDate,
    /// Inclusive; `None` runs to the latest session.
    pub end: Option<NaiveDate>,
    /// Currency units invested at the first close.
    pub amount: f64,
}

impl WhatIfRequest {
    /// Reject inputs that would make the projection meaningless.
    ///
    /// - symbol must be non-blank
    /// - amount must be finite and strictly positive
    /// - start must not be after end (when end is given)
    pub fn validate(&self) -> Result<(), WhatIfError> {
        if self.symbol.trim().is_empty() {
            return Err(WhatIfError::InvalidInput("symbol must not be empty".into()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(WhatIfError::InvalidInput(format!(
                "amount must be a positive number, got {}",
                self.amount
            )));
        }
        if let Some(end) = self.end {
            if self.start > end {
                return Err(WhatIfError::InvalidInput(format!(
                    "start {} is after end {}",
                    self.start, end
                )));
            }
        }
        Ok(())
    }

    pub fn range(&self) -> HistoryRange {
        HistoryRange::new(self.start, self.end)
    }
}

/// Outcome of a what-if calculation, with the ascending series it used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfResult {
    pub invested: f64,
    pub start_price: f64,
    pub end_price: f64,
    pub shares: f64,
    pub final_value: f64,
    pub profit: f64,
    pub history: Vec<Bar>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum WhatIfError {
    /// The request failed validation; no upstream call was made.
    InvalidInput(String),
    /// The gateway failed; message passed through.
    Upstream(GatewayError),
    /// The gateway returned no bars for the window.
    NoData,
    /// The first close in the window is exactly zero.
    DivisionByZero,
    /// The projection left the range of finite `f64` values.
    Overflow,
}

impl fmt::Display for WhatIfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhatIfError::InvalidInput(msg) => write!(f, "{msg}"),
            WhatIfError::Upstream(e) => write!(f, "{}", e.message()),
            WhatIfError::NoData => write!(f, "No data available"),
            WhatIfError::DivisionByZero => {
                write!(f, "start price is zero; cannot compute shares")
            }
            WhatIfError::Overflow => {
                write!(f, "projected values are out of range for the invested amount")
            }
        }
    }
}

impl std::error::Error for WhatIfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WhatIfError::Upstream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GatewayError> for WhatIfError {
    fn from(e: GatewayError) -> Self {
        WhatIfError::Upstream(e)
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Validate `req`, fetch its history, and project the return.
pub async fn compute_what_if(
    gateway: &dyn MarketDataGateway,
    req: &WhatIfRequest,
) -> Result<WhatIfResult, WhatIfError> {
    req.validate()?;

    let series = gateway.history(req.symbol.trim(), &req.range()).await?;
    debug!(
        symbol = %req.symbol,
        gateway = gateway.name(),
        bars = series.len(),
        "what-if history fetched"
    );

    project_return(req.amount, series)
}

/// Pure projection over an unordered series.
pub fn project_return(amount: f64, series: Vec<Bar>) -> Result<WhatIfResult, WhatIfError> {
    if series.is_empty() {
        return Err(WhatIfError::NoData);
    }

    let history = normalize_history(series);
    let (start_price, end_price) = match (history.first(), history.last()) {
        (Some(first), Some(last)) => (first.close, last.close),
        _ => return Err(WhatIfError::NoData),
    };

    if start_price == 0.0 {
        return Err(WhatIfError::DivisionByZero);
    }

    let shares = amount / start_price;
    let final_value = shares * end_price;
    let profit = final_value - amount;

    if ![shares, final_value, profit].iter().all(|v| v.is_finite()) {
        return Err(WhatIfError::Overflow);
    }

    Ok(WhatIfResult {
        invested: amount,
        start_price,
        end_price,
        shares,
        final_value,
        profit,
        history,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
