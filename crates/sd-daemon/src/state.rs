//! Shared runtime state for sd-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The only mutable piece
//! is the catalog cache, which guards its own populate-once transition; the
//! gateway is stateless per request.

use std::sync::Arc;

use chrono::NaiveDate;
use sd_catalog::CatalogCache;
use sd_md::{MarketDataGateway, YahooGateway};
use serde::{Deserialize, Serialize};

use crate::config::DaemonConfig;

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    /// Static build metadata.
    pub build: BuildInfo,
    /// Symbol catalog, loaded on first `/top-stocks`.
    pub catalog: CatalogCache,
    /// Upstream quotes and history.
    pub gateway: Arc<dyn MarketDataGateway>,
    /// Start boundary for `/stock/:symbol` history.
    pub stock_history_start: NaiveDate,
}

impl AppState {
    pub fn new(
        catalog: CatalogCache,
        gateway: Arc<dyn MarketDataGateway>,
        stock_history_start: NaiveDate,
    ) -> Self {
        Self {
            build: BuildInfo {
                service: "sd-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            catalog,
            gateway,
            stock_history_start,
        }
    }

    /// Production wiring: Yahoo gateway and the configured catalog path.
    pub fn from_config(cfg: &DaemonConfig) -> Self {
        Self::new(
            CatalogCache::new(cfg.catalog_path.clone()),
            Arc::new(YahooGateway::new_with_base_url(cfg.yahoo_base_url.clone())),
            cfg.stock_history_start,
        )
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Monotonically increasing uptime since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}
