//! Gateway boundary for quotes and daily history.
//!
//! This module defines **only** the gateway trait and its error type.
//! No concrete provider, no HTTP, no normalization belongs here.

use std::fmt;

use crate::{Bar, HistoryRange, QuoteSnapshot};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a [`MarketDataGateway`] implementation may return.
///
/// Every variant is an upstream failure. The provider's own wording is kept
/// intact so it can be surfaced to clients without interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Network or transport failure.
    Transport(String),
    /// The upstream API rejected the request (unknown symbol, rate limit, ...).
    Api {
        status: Option<u16>,
        message: String,
    },
    /// A response payload could not be decoded.
    Decode(String),
}

impl GatewayError {
    /// The upstream message, verbatim.
    pub fn message(&self) -> &str {
        match self {
            GatewayError::Transport(msg) => msg,
            GatewayError::Api { message, .. } => message,
            GatewayError::Decode(msg) => msg,
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport(msg) => write!(f, "transport error: {msg}"),
            GatewayError::Api {
                status: Some(s),
                message,
            } => write!(f, "provider api error status={s}: {message}"),
            GatewayError::Api {
                status: None,
                message,
            } => write!(f, "provider api error: {message}"),
            GatewayError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for GatewayError {}

// ---------------------------------------------------------------------------
// Gateway trait
// ---------------------------------------------------------------------------

/// Upstream market-data contract.
///
/// Implementations must be object-safe so the daemon can hold an
/// `Arc<dyn MarketDataGateway>`, and `Send + Sync` so one instance can serve
/// concurrent requests. All state is per call.
#[async_trait::async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// Human-readable name identifying this gateway (e.g. `"yahoo"`).
    fn name(&self) -> &'static str;

    /// Current quote for `symbol`.
    async fn quote(&self, symbol: &str) -> Result<QuoteSnapshot, GatewayError>;

    /// Daily bars for `symbol` over `range`.
    ///
    /// Bars are returned in whatever order the provider sent them; callers
    /// that need ascending dates run [`crate::normalize_history`].
    async fn history(&self, symbol: &str, range: &HistoryRange) -> Result<Vec<Bar>, GatewayError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
