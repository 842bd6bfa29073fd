//! Offline catalog sorter.
//!
//! Reads the raw exchange export (`Symbol`/`Name` headers), orders it with
//! [`locale_cmp`], and writes the canonical two-column `symbol,name` file the
//! service loads. This is a one-shot batch step; the service never re-sorts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::collate::locale_cmp;
use crate::loader::{load_catalog_with, HeaderAliases};
use crate::{CatalogEntry, CatalogError};

/// Sort `input` into `output`. Returns the number of entries written.
pub fn sort_catalog(input: &Path, output: &Path) -> Result<usize, CatalogError> {
    let catalog = load_catalog_with(input, HeaderAliases::export())?;
    let sorted = sort_entries(catalog.into_entries());

    let out = output.display().to_string();
    let file = File::create(output).map_err(|e| CatalogError::Io {
        path: out.clone(),
        message: e.to_string(),
    })?;
    write_catalog(file, &sorted, &out)?;

    Ok(sorted.len())
}

/// Stable sort by symbol in locale-aware order.
pub fn sort_entries(mut entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    entries.sort_by(|a, b| locale_cmp(&a.symbol, &b.symbol));
    entries
}

/// Write entries as `symbol,name` CSV with a header row.
///
/// `origin` names the destination in error messages.
pub fn write_catalog<W: Write>(
    writer: W,
    entries: &[CatalogEntry],
    origin: &str,
) -> Result<(), CatalogError> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(["symbol", "name"])
        .map_err(|e| CatalogError::from_csv(origin, e))?;
    for e in entries {
        wtr.write_record([e.symbol.as_str(), e.name.as_str()])
            .map_err(|e| CatalogError::from_csv(origin, e))?;
    }
    wtr.flush().map_err(|e| CatalogError::Io {
        path: origin.to_string(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(symbol: &str, name: &str) -> CatalogEntry {
        CatalogEntry {
            symbol: symbol.into(),
            name: name.into(),
        }
    }

    #[test]
    fn sort_entries_is_locale_aware_and_stable() {
        let out = sort_entries(vec![
            entry("b", "lower b"),
            entry("MSFT", "Microsoft"),
            entry("AAPL", "Apple"),
            entry("MSFT", "Microsoft dup"),
        ]);
        let names: Vec<&str> = out.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "lower b", "Microsoft", "Microsoft dup"]);
    }

    #[test]
    fn write_catalog_emits_header_even_when_empty() {
        let mut buf = Vec::new();
        write_catalog(&mut buf, &[], "<buf>").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "symbol,name\n");
    }

    #[test]
    fn write_catalog_quotes_names_with_commas() {
        let mut buf = Vec::new();
        write_catalog(&mut buf, &[entry("BRK-B", "Berkshire Hathaway, Inc.")], "<buf>").unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "symbol,name\nBRK-B,\"Berkshire Hathaway, Inc.\"\n"
        );
    }
}
