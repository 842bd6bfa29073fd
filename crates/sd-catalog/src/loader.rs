//! Catalog CSV loader.
//!
//! ## Column contract
//!
//! | Field    | Accepted header spellings ([`HeaderAliases::relaxed`]) |
//! |----------|--------------------------------------------------------|
//! | `symbol` | `symbol`, `Symbol`                                     |
//! | `name`   | `name`, `Name`                                         |
//!
//! Spellings are resolved to column indexes once, against the header row.
//! When a file carries more than one spelling for a field, the cells are tried
//! in alias order and the first non-blank one wins. Other columns are ignored.
//! Rows whose resolved symbol or name trims to empty are dropped; rows are
//! kept in file order.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::{Catalog, CatalogEntry, CatalogError};

// ---------------------------------------------------------------------------
// Header aliases
// ---------------------------------------------------------------------------

/// Accepted header spellings for each catalog field, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderAliases {
    pub symbol: &'static [&'static str],
    pub name: &'static [&'static str],
}

impl HeaderAliases {
    /// Lowercase or capitalised headers; what the service accepts.
    pub const fn relaxed() -> Self {
        Self {
            symbol: &["symbol", "Symbol"],
            name: &["name", "Name"],
        }
    }

    /// Capitalised headers only; the layout of the raw exchange export the
    /// offline sorter consumes.
    pub const fn export() -> Self {
        Self {
            symbol: &["Symbol"],
            name: &["Name"],
        }
    }

    fn resolve(&self, headers: &StringRecord) -> Result<ColumnMap, CatalogError> {
        let find = |aliases: &[&str]| -> Vec<usize> {
            aliases
                .iter()
                .filter_map(|alias| {
                    headers
                        .iter()
                        .position(|h| h.trim_start_matches('\u{feff}').trim() == *alias)
                })
                .collect()
        };

        let symbol = find(self.symbol);
        if symbol.is_empty() {
            return Err(CatalogError::MissingColumn("symbol"));
        }
        let name = find(self.name);
        if name.is_empty() {
            return Err(CatalogError::MissingColumn("name"));
        }
        Ok(ColumnMap { symbol, name })
    }
}

impl Default for HeaderAliases {
    fn default() -> Self {
        Self::relaxed()
    }
}

/// Column indexes per field, in alias preference order.
#[derive(Debug)]
struct ColumnMap {
    symbol: Vec<usize>,
    name: Vec<usize>,
}

impl ColumnMap {
    fn entry(&self, rec: &StringRecord) -> Option<CatalogEntry> {
        CatalogEntry::from_cells(pick(&self.symbol, rec), pick(&self.name, rec))
    }
}

fn pick<'r>(cols: &[usize], rec: &'r StringRecord) -> &'r str {
    cols.iter()
        .filter_map(|&i| rec.get(i))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Load the catalog at `path` using [`HeaderAliases::relaxed`].
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    load_catalog_with(path, HeaderAliases::relaxed())
}

/// Load the catalog at `path` with an explicit alias map.
pub fn load_catalog_with(path: &Path, aliases: HeaderAliases) -> Result<Catalog, CatalogError> {
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|e| CatalogError::Io {
        path: origin.clone(),
        message: e.to_string(),
    })?;
    read_catalog(file, aliases, &origin)
}

/// Load a catalog from any reader (useful for tests without touching the
/// filesystem).
pub fn load_catalog_from_reader<R: Read>(
    reader: R,
    aliases: HeaderAliases,
) -> Result<Catalog, CatalogError> {
    read_catalog(reader, aliases, "<reader>")
}

fn read_catalog<R: Read>(
    reader: R,
    aliases: HeaderAliases,
    origin: &str,
) -> Result<Catalog, CatalogError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| CatalogError::from_csv(origin, e))?
        .clone();
    let cols = aliases.resolve(&headers)?;

    let mut entries = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(|e| CatalogError::from_csv(origin, e))?;
        if let Some(entry) = cols.entry(&rec) {
            entries.push(entry);
        }
    }

    Ok(Catalog::new(entries))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
