//! Axum router and all HTTP handlers for sd-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. Every failure is answered with an [`ErrorResponse`]
//! body; see [`ApiError`] for the status mapping.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use sd_md::HistoryRange;
use sd_whatif::{compute_what_if, WhatIfError, WhatIfRequest};
use tracing::{info, warn};

use crate::{
    api_types::{ErrorResponse, HealthResponse, StockResponse, WhatIfQuery},
    state::{uptime_secs, AppState},
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing, request ids) are **not** applied here;
/// `main.rs` attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/top-stocks", get(top_stocks))
        .route("/stock/:symbol", get(stock))
        .route("/whatif/:symbol", get(whatif))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// A failed request: status plus the message placed in `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// `NoData` → 404, `InvalidInput` → 400, everything else → 500.
impl From<WhatIfError> for ApiError {
    fn from(e: WhatIfError) -> Self {
        let status = match &e {
            WhatIfError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            WhatIfError::NoData => StatusCode::NOT_FOUND,
            WhatIfError::Upstream(_) | WhatIfError::DivisionByZero | WhatIfError::Overflow => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(r: PathRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service.to_string(),
            version: st.build.version.to_string(),
            uptime_secs: uptime_secs(),
            catalog_loaded: st.catalog.state() == sd_catalog::CacheState::Populated,
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /top-stocks
// ---------------------------------------------------------------------------

pub(crate) async fn top_stocks(State(st): State<Arc<AppState>>) -> Response {
    match st.catalog.get().await {
        Ok(catalog) => (StatusCode::OK, Json(catalog.as_ref())).into_response(),
        // The cache already logged the cause; clients get a fixed message.
        Err(_) => ApiError::internal("Failed to load top stocks").into_response(),
    }
}

// ---------------------------------------------------------------------------
// GET /stock/:symbol
// ---------------------------------------------------------------------------

pub(crate) async fn stock(
    State(st): State<Arc<AppState>>,
    symbol: Result<Path<String>, PathRejection>,
) -> Result<Json<StockResponse>, ApiError> {
    let Path(symbol) = symbol?;
    let range = HistoryRange::since(st.stock_history_start);

    let (quote, history) = tokio::try_join!(
        st.gateway.quote(&symbol),
        st.gateway.history(&symbol, &range)
    )
    .map_err(|e| {
        warn!(%symbol, error = %e, "stock lookup failed upstream");
        ApiError::internal(e.message())
    })?;

    Ok(Json(StockResponse { quote, history }))
}

// ---------------------------------------------------------------------------
// GET /whatif/:symbol?start=&end=&amount=
// ---------------------------------------------------------------------------

pub(crate) async fn whatif(
    State(st): State<Arc<AppState>>,
    symbol: Result<Path<String>, PathRejection>,
    query: Result<Query<WhatIfQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Path(symbol) = symbol?;
    let Query(q) = query?;
    let req = parse_whatif_query(symbol, &q)?;

    match compute_what_if(st.gateway.as_ref(), &req).await {
        Ok(result) => {
            info!(
                symbol = %req.symbol,
                bars = result.history.len(),
                profit = result.profit,
                "whatif"
            );
            Ok((StatusCode::OK, Json(result)).into_response())
        }
        Err(e) => {
            if !matches!(e, WhatIfError::NoData | WhatIfError::InvalidInput(_)) {
                warn!(symbol = %req.symbol, error = %e, "whatif failed");
            }
            Err(e.into())
        }
    }
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request(format!("{field} must be YYYY-MM-DD, got '{raw}'")))
}

fn parse_whatif_query(symbol: String, q: &WhatIfQuery) -> Result<WhatIfRequest, ApiError> {
    let start = non_blank(&q.start)
        .ok_or_else(|| ApiError::bad_request("start is required"))
        .and_then(|s| parse_date("start", s))?;

    let end = non_blank(&q.end)
        .map(|s| parse_date("end", s))
        .transpose()?;

    let amount_s = non_blank(&q.amount).ok_or_else(|| ApiError::bad_request("amount is required"))?;
    let amount = amount_s
        .parse::<f64>()
        .map_err(|_| ApiError::bad_request(format!("amount must be a number, got '{amount_s}'")))?;

    Ok(WhatIfRequest {
        symbol,
        start,
        end,
        amount,
    })
}
