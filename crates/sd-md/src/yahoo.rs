//! Yahoo Finance chart client.
//!
//! Both gateway operations go through the v8 chart endpoint, which needs no
//! cookie/crumb handshake:
//!
//! | Operation | Query                                            | Source            |
//! |-----------|--------------------------------------------------|-------------------|
//! | `history` | `period1`, `period2` (epoch secs), `interval=1d` | `timestamp` + `indicators` |
//! | `quote`   | `range=1d`, `interval=1d`                        | `meta` block      |

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::provider::{GatewayError, MarketDataGateway};
use crate::{Bar, HistoryRange, QuoteSnapshot};

/// Public Yahoo Finance API host.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = concat!("sd-md/", env!("CARGO_PKG_VERSION"));

/// Yahoo-backed market data gateway.
#[derive(Debug, Clone)]
pub struct YahooGateway {
    http: reqwest::Client,
    base_url: String,
}

impl Default for YahooGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooGateway {
    pub fn new() -> Self {
        Self::new_with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn new_with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chart_url(&self, symbol: &str) -> Result<reqwest::Url, GatewayError> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            GatewayError::Transport(format!("invalid base url '{}': {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::Transport(format!("base url cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }

    async fn fetch_chart(
        &self,
        symbol: &str,
        query: &[(&str, String)],
    ) -> Result<Option<YahooChartResult>, GatewayError> {
        let url = self.chart_url(symbol)?;
        debug!(%url, ?query, "yahoo chart request");

        let resp = self
            .http
            .get(url)
            .query(query)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let parsed: Result<YahooChartResponse, _> = serde_json::from_str(&body);

        if !status.is_success() {
            // Yahoo usually explains itself in the chart.error block even on 4xx.
            let message = parsed
                .ok()
                .and_then(|p| p.chart.error)
                .map(|e| e.message())
                .unwrap_or_else(|| non_empty_or(body.trim(), status.as_str()));
            return Err(GatewayError::Api {
                status: Some(status.as_u16()),
                message,
            });
        }

        let parsed =
            parsed.map_err(|e| GatewayError::Decode(format!("yahoo chart json: {e}")))?;

        if let Some(err) = parsed.chart.error {
            return Err(GatewayError::Api {
                status: None,
                message: err.message(),
            });
        }

        Ok(parsed.chart.result.and_then(|r| r.into_iter().next()))
    }
}

#[async_trait::async_trait]
impl MarketDataGateway for YahooGateway {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn quote(&self, symbol: &str) -> Result<QuoteSnapshot, GatewayError> {
        let query = [("range", "1d".to_string()), ("interval", "1d".to_string())];
        let result = self.fetch_chart(symbol, &query).await?.ok_or_else(|| {
            GatewayError::Api {
                status: None,
                message: format!("no quote data for {symbol}"),
            }
        })?;
        quote_from_meta(symbol, result.meta)
    }

    async fn history(&self, symbol: &str, range: &HistoryRange) -> Result<Vec<Bar>, GatewayError> {
        let (period1, period2) = range_to_periods(range, Utc::now());
        let query = [
            ("period1", period1.to_string()),
            ("period2", period2.to_string()),
            ("interval", "1d".to_string()),
            ("events", "div,splits".to_string()),
        ];

        match self.fetch_chart(symbol, &query).await? {
            Some(result) => bars_from_chart(result),
            None => Ok(Vec::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn non_empty_or(s: &str, fallback: &str) -> String {
    if s.is_empty() {
        fallback.to_string()
    } else {
        s.to_string()
    }
}

fn midnight_utc(d: NaiveDate) -> i64 {
    d.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Map a calendar range to Yahoo's `[period1, period2)` epoch window.
///
/// The end date is inclusive, so `period2` is midnight of the following day.
fn range_to_periods(range: &HistoryRange, now: DateTime<Utc>) -> (i64, i64) {
    let period1 = midnight_utc(range.start);
    let period2 = match range.end.and_then(|e| e.succ_opt()) {
        Some(next) => midnight_utc(next),
        None => now.timestamp(),
    };
    (period1, period2)
}

fn bars_from_chart(result: YahooChartResult) -> Result<Vec<Bar>, GatewayError> {
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let at = |v: &Vec<Option<f64>>, i: usize| v.get(i).copied().flatten();

    let mut out = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.into_iter().enumerate() {
        // Yahoo pads holidays and halted sessions with nulls.
        let Some(close) = at(&quote.close, i) else {
            continue;
        };
        let date = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| GatewayError::Decode(format!("yahoo timestamp out of range: {ts}")))?;

        out.push(Bar {
            date,
            open: at(&quote.open, i),
            high: at(&quote.high, i),
            low: at(&quote.low, i),
            close,
            adj_close: at(&adjclose, i),
            volume: quote.volume.get(i).copied().flatten(),
        });
    }
    Ok(out)
}

fn quote_from_meta(symbol: &str, mut meta: Map<String, Value>) -> Result<QuoteSnapshot, GatewayError> {
    if !meta.contains_key("symbol") {
        meta.insert("symbol".to_string(), Value::String(symbol.to_string()));
    }
    if !meta.contains_key("previousClose") {
        if let Some(prev) = meta.get("chartPreviousClose").cloned() {
            meta.insert("previousClose".to_string(), prev);
        }
    }
    serde_json::from_value(Value::Object(meta))
        .map_err(|e| GatewayError::Decode(format!("yahoo quote meta: {e}")))
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooChartError {
    fn message(&self) -> String {
        self.description
            .clone()
            .or_else(|| self.code.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Map<String, Value>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: YahooChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
    #[serde(default)]
    adjclose: Vec<YahooChartAdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

// -----------------
// Tests (no network)
// -----------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use httpmock::prelude::*;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn default_gateway_targets_public_host() {
        assert_eq!(YahooGateway::new().base_url(), DEFAULT_BASE_URL);
        assert_eq!(YahooGateway::default().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn periods_make_end_date_inclusive() {
        let range = HistoryRange::new(d(2024, 1, 2), Some(d(2024, 1, 3)));
        let (p1, p2) = range_to_periods(&range, Utc::now());
        assert_eq!(p1, 1_704_153_600);
        assert_eq!(p2, 1_704_326_400);
    }

    #[test]
    fn open_ended_range_runs_to_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let (p1, p2) = range_to_periods(&HistoryRange::since(d(2024, 1, 1)), now);
        assert_eq!(p1, 1_704_067_200);
        assert_eq!(p2, now.timestamp());
    }

    #[tokio::test]
    async fn history_parses_bars_and_skips_null_closes() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v8/finance/chart/AAPL")
                    .query_param("period1", "1704153600")
                    .query_param("period2", "1704326400")
                    .query_param("interval", "1d");
                then.status(200).json_body(json!({
                    "chart": {
                        "result": [{
                            "meta": { "symbol": "AAPL", "currency": "USD" },
                            "timestamp": [1704292200, 1704205800, 1704378600],
                            "indicators": {
                                "quote": [{
                                    "open": [101.0, 91.0, null],
                                    "high": [102.0, 92.0, null],
                                    "low": [99.0, 89.0, null],
                                    "close": [100.0, 90.0, null],
                                    "volume": [1000, 2000, null]
                                }],
                                "adjclose": [{ "adjclose": [99.5, 89.5, null] }]
                            }
                        }],
                        "error": null
                    }
                }));
            })
            .await;

        let gw = YahooGateway::new_with_base_url(server.base_url());
        let range = HistoryRange::new(d(2024, 1, 2), Some(d(2024, 1, 3)));
        let bars = gw.history("AAPL", &range).await.unwrap();

        mock.assert_async().await;
        assert_eq!(bars.len(), 2);
        // provider order is preserved; sorting is the caller's job
        assert_eq!(bars[0].close, 100.0);
        assert_eq!(bars[1].close, 90.0);
        assert_eq!(bars[1].adj_close, Some(89.5));
        assert_eq!(bars[1].volume, Some(2000));
        assert_eq!(bars[0].date.timestamp(), 1_704_292_200);
    }

    #[tokio::test]
    async fn history_without_timestamps_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v8/finance/chart/MSFT");
                then.status(200).json_body(json!({
                    "chart": {
                        "result": [{ "meta": { "symbol": "MSFT" }, "indicators": { "quote": [{}] } }],
                        "error": null
                    }
                }));
            })
            .await;

        let gw = YahooGateway::new_with_base_url(server.base_url());
        let bars = gw
            .history("MSFT", &HistoryRange::since(d(2024, 1, 1)))
            .await
            .unwrap();
        assert!(bars.is_empty());
    }

    #[tokio::test]
    async fn provider_error_message_is_passed_through() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v8/finance/chart/NOPE");
                then.status(404).json_body(json!({
                    "chart": {
                        "result": null,
                        "error": {
                            "code": "Not Found",
                            "description": "No data found, symbol may be delisted"
                        }
                    }
                }));
            })
            .await;

        let gw = YahooGateway::new_with_base_url(server.base_url());
        let err = gw
            .history("NOPE", &HistoryRange::since(d(2024, 1, 1)))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GatewayError::Api {
                status: Some(404),
                message: "No data found, symbol may be delisted".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn non_json_error_body_is_kept_verbatim() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v8/finance/chart/AAPL");
                then.status(429).body("Too Many Requests");
            })
            .await;

        let gw = YahooGateway::new_with_base_url(server.base_url());
        let err = gw.quote("AAPL").await.unwrap_err();
        assert_eq!(err.message(), "Too Many Requests");
    }

    #[tokio::test]
    async fn malformed_success_body_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v8/finance/chart/AAPL");
                then.status(200).body("<html>oops</html>");
            })
            .await;

        let gw = YahooGateway::new_with_base_url(server.base_url());
        let err = gw.quote("AAPL").await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn quote_reads_meta_and_keeps_extra_fields() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v8/finance/chart/AAPL")
                    .query_param("range", "1d");
                then.status(200).json_body(json!({
                    "chart": {
                        "result": [{
                            "meta": {
                                "symbol": "AAPL",
                                "currency": "USD",
                                "exchangeName": "NMS",
                                "regularMarketPrice": 190.5,
                                "regularMarketTime": 1717185600,
                                "chartPreviousClose": 188.0,
                                "instrumentType": "EQUITY"
                            },
                            "timestamp": [1717185600],
                            "indicators": { "quote": [{ "close": [190.5] }] }
                        }],
                        "error": null
                    }
                }));
            })
            .await;

        let gw = YahooGateway::new_with_base_url(server.base_url());
        let q = gw.quote("AAPL").await.unwrap();

        mock.assert_async().await;
        assert_eq!(q.symbol, "AAPL");
        assert_eq!(q.exchange_name.as_deref(), Some("NMS"));
        assert_eq!(q.regular_market_price, Some(190.5));
        assert_eq!(q.previous_close, Some(188.0));
        assert_eq!(q.extra["instrumentType"], "EQUITY");
    }

    #[test]
    fn chart_url_encodes_symbol_as_single_segment() {
        let gw = YahooGateway::new_with_base_url("http://localhost:9/".to_string());
        let url = gw.chart_url("BRK/B").unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/BRK%2FB");
    }

    #[test]
    fn gateway_is_object_safe_via_box() {
        let _g: Box<dyn MarketDataGateway> = Box::new(YahooGateway::new());
    }
}
