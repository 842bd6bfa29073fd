//! sd-catalog
//!
//! The symbol catalog: the ordered list of `(symbol, name)` pairs served by
//! `GET /top-stocks`.
//!
//! - [`loader`] reads a catalog CSV with an explicit header-alias map.
//! - [`cache`] holds the loaded catalog for the process lifetime.
//! - [`sorter`] is the offline step that precomputes the served order.
//! - [`collate`] is the locale-aware comparison the sorter uses.
//!
//! Nothing here talks to the network.

pub mod cache;
pub mod collate;
pub mod loader;
pub mod sorter;

pub use cache::{CacheState, CatalogCache};
pub use collate::locale_cmp;
pub use loader::{load_catalog, load_catalog_from_reader, load_catalog_with, HeaderAliases};
pub use sorter::{sort_catalog, sort_entries, write_catalog};

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One catalog row. Both fields are trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub symbol: String,
    pub name: String,
}

impl CatalogEntry {
    /// Build an entry from raw cells, or `None` if either trims to empty.
    pub fn from_cells(symbol: &str, name: &str) -> Option<Self> {
        let symbol = symbol.trim();
        let name = name.trim();
        if symbol.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
        })
    }
}

/// Entries in file order. Serializes as a bare JSON array.
///
/// Duplicate symbols are kept as they appear in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<CatalogEntry> {
        self.entries
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced while reading or writing a catalog file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The file could not be opened, read, or written.
    Io { path: String, message: String },
    /// The CSV structure is malformed (e.g. a row with the wrong field count).
    Parse { line: Option<u64>, message: String },
    /// No accepted header spelling for a required field was found.
    MissingColumn(&'static str),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io { path, message } => {
                write!(f, "catalog io error '{path}': {message}")
            }
            CatalogError::Parse {
                line: Some(l),
                message,
            } => write!(f, "catalog csv line {l}: {message}"),
            CatalogError::Parse {
                line: None,
                message,
            } => write!(f, "catalog csv: {message}"),
            CatalogError::MissingColumn(field) => {
                write!(f, "catalog csv has no column for required field '{field}'")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

impl CatalogError {
    pub(crate) fn from_csv(origin: &str, err: csv::Error) -> Self {
        if err.is_io_error() {
            return CatalogError::Io {
                path: origin.to_string(),
                message: err.to_string(),
            };
        }
        CatalogError::Parse {
            line: err.position().map(|p| p.line()),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cells_trims_both_fields() {
        let e = CatalogEntry::from_cells(" AAPL ", " Apple Inc ").unwrap();
        assert_eq!(e.symbol, "AAPL");
        assert_eq!(e.name, "Apple Inc");
    }

    #[test]
    fn from_cells_rejects_blank_fields() {
        assert!(CatalogEntry::from_cells("", "X").is_none());
        assert!(CatalogEntry::from_cells("X", "   ").is_none());
    }

    #[test]
    fn catalog_serializes_as_array() {
        let c = Catalog::new(vec![CatalogEntry::from_cells("A", "Agilent").unwrap()]);
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v, serde_json::json!([{ "symbol": "A", "name": "Agilent" }]));
    }

    #[test]
    fn error_display_parse_with_line() {
        let e = CatalogError::Parse {
            line: Some(7),
            message: "found record with 3 fields".into(),
        };
        assert_eq!(e.to_string(), "catalog csv line 7: found record with 3 fields");
    }

    #[test]
    fn error_display_missing_column() {
        let e = CatalogError::MissingColumn("symbol");
        assert!(e.to_string().contains("'symbol'"));
    }
}
