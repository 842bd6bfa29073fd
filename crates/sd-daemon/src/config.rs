//! Daemon configuration derived from environment variables.
//!
//! | Variable              | Default                              |
//! |-----------------------|--------------------------------------|
//! | `BIND_HOST`           | `0.0.0.0`                            |
//! | `PORT`                | `4000`                               |
//! | `CSV_FILE`            | `./assets/csv/all_stocks_sorted.csv` |
//! | `YAHOO_BASE_URL`      | `https://query1.finance.yahoo.com`   |
//! | `STOCK_HISTORY_START` | `2024-01-01`                         |
//! | `CORS_ALLOW_ORIGINS`  | unset (any origin)                   |
//!
//! Blank values count as unset. Values that are set but unparseable are
//! startup errors.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_CSV_FILE: &str = "./assets/csv/all_stocks_sorted.csv";
pub const DEFAULT_YAHOO_BASE_URL: &str = sd_md::yahoo::DEFAULT_BASE_URL;
pub const DEFAULT_STOCK_HISTORY_START: &str = "2024-01-01";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    pub bind_host: IpAddr,
    pub port: u16,
    /// Absolute (or cwd-relative, resolved) path of the sorted catalog CSV.
    pub catalog_path: PathBuf,
    pub yahoo_base_url: String,
    /// Start boundary for `GET /stock/:symbol` history.
    pub stock_history_start: NaiveDate,
    /// Empty ⇒ any origin.
    pub cors_allow_origins: Vec<String>,
}

impl DaemonConfig {
    /// Read from the process environment, resolving `CSV_FILE` against the cwd.
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir().context("resolve current directory")?;
        Self::from_lookup(|k| std::env::var(k).ok(), &cwd)
    }

    /// Build from an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup<F>(lookup: F, cwd: &Path) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let bind_host = get("BIND_HOST")
            .unwrap_or_else(|| DEFAULT_BIND_HOST.to_string())
            .parse::<IpAddr>()
            .context("BIND_HOST is not an IP address")?;

        let port = match get("PORT") {
            Some(p) => p
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port: {p}"))?,
            None => DEFAULT_PORT,
        };

        let csv_file = get("CSV_FILE").unwrap_or_else(|| DEFAULT_CSV_FILE.to_string());
        let catalog_path = cwd.join(csv_file);

        let yahoo_base_url =
            get("YAHOO_BASE_URL").unwrap_or_else(|| DEFAULT_YAHOO_BASE_URL.to_string());

        let start_s =
            get("STOCK_HISTORY_START").unwrap_or_else(|| DEFAULT_STOCK_HISTORY_START.to_string());
        let stock_history_start = NaiveDate::parse_from_str(&start_s, "%Y-%m-%d")
            .with_context(|| format!("STOCK_HISTORY_START is not YYYY-MM-DD: {start_s}"))?;

        let cors_allow_origins = get("CORS_ALLOW_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            bind_host,
            port,
            catalog_path,
            yahoo_base_url,
            stock_history_start,
            cors_allow_origins,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> Result<DaemonConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DaemonConfig::from_lookup(|k| env.get(k).cloned(), Path::new("/srv/desk"))
    }

    #[test]
    fn defaults_when_unset() {
        let c = cfg(&[]).unwrap();
        assert_eq!(c.bind_addr(), "0.0.0.0:4000".parse().unwrap());
        assert_eq!(
            c.catalog_path,
            PathBuf::from("/srv/desk/./assets/csv/all_stocks_sorted.csv")
        );
        assert_eq!(c.yahoo_base_url, sd_md::yahoo::DEFAULT_BASE_URL);
        assert_eq!(c.stock_history_start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(c.cors_allow_origins.is_empty());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let c = cfg(&[("PORT", "  "), ("CSV_FILE", "")]).unwrap();
        assert_eq!(c.port, DEFAULT_PORT);
        assert!(c.catalog_path.ends_with("all_stocks_sorted.csv"));
    }

    #[test]
    fn overrides_are_applied() {
        let c = cfg(&[
            ("PORT", "8080"),
            ("BIND_HOST", "127.0.0.1"),
            ("CSV_FILE", "/data/stocks.csv"),
            ("YAHOO_BASE_URL", "http://localhost:9999"),
            ("STOCK_HISTORY_START", "2023-06-30"),
            ("CORS_ALLOW_ORIGINS", "http://localhost:5173, https://desk.example.com,"),
        ])
        .unwrap();
        assert_eq!(c.bind_addr(), "127.0.0.1:8080".parse().unwrap());
        // absolute CSV_FILE ignores the cwd
        assert_eq!(c.catalog_path, PathBuf::from("/data/stocks.csv"));
        assert_eq!(c.yahoo_base_url, "http://localhost:9999");
        assert_eq!(c.stock_history_start, NaiveDate::from_ymd_opt(2023, 6, 30).unwrap());
        assert_eq!(
            c.cors_allow_origins,
            vec!["http://localhost:5173", "https://desk.example.com"]
        );
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(cfg(&[("PORT", "http")]).is_err());
        assert!(cfg(&[("PORT", "70000")]).is_err());
    }

    #[test]
    fn bad_history_start_is_an_error() {
        let err = cfg(&[("STOCK_HISTORY_START", "01/01/2024")]).unwrap_err();
        assert!(err.to_string().contains("STOCK_HISTORY_START"));
    }
}
