//! Populate-once catalog cache.
//!
//! The first [`CatalogCache::get`] loads the file; every later call returns
//! the same `Arc<Catalog>` without touching the filesystem, even if the file
//! changes. A failed load leaves the cache [`CacheState::Uninitialized`] so
//! the next call retries. Concurrent first callers are serialized on the
//! populate step; readers only ever see "nothing" or the complete catalog.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::loader::load_catalog;
use crate::{Catalog, CatalogError};

/// Lifecycle of a [`CatalogCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Uninitialized,
    Populated,
}

/// Owned cache for the catalog at a fixed path.
#[derive(Debug)]
pub struct CatalogCache {
    path: PathBuf,
    cell: OnceCell<Arc<Catalog>>,
}

impl CatalogCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> CacheState {
        if self.cell.initialized() {
            CacheState::Populated
        } else {
            CacheState::Uninitialized
        }
    }

    /// The cached catalog, loading it on first use.
    pub async fn get(&self) -> Result<Arc<Catalog>, CatalogError> {
        let catalog = self
            .cell
            .get_or_try_init(|| self.load())
            .await
            .map_err(|e| {
                warn!(path = %self.path.display(), error = %e, "catalog load failed");
                e
            })?;
        Ok(Arc::clone(catalog))
    }

    async fn load(&self) -> Result<Arc<Catalog>, CatalogError> {
        let path = self.path.clone();
        let catalog = tokio::task::spawn_blocking(move || load_catalog(&path))
            .await
            .map_err(|e| CatalogError::Io {
                path: self.path.display().to_string(),
                message: format!("catalog load task failed: {e}"),
            })??;

        info!(
            path = %self.path.display(),
            entries = catalog.len(),
            "Loaded {} stocks from CSV",
            catalog.len()
        );
        Ok(Arc::new(catalog))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(path: &Path, body: &str) {
        let mut f = std::fs::File::create(path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    #[test]
    fn fresh_cache_is_uninitialized() {
        let cache = CatalogCache::new("/nope.csv");
        assert_eq!(cache.state(), CacheState::Uninitialized);
    }

    #[tokio::test]
    async fn first_get_populates_and_later_gets_ignore_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stocks.csv");
        write_csv(&path, "symbol,name\nAAPL,Apple\n");

        let cache = CatalogCache::new(&path);
        let first = cache.get().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(cache.state(), CacheState::Populated);

        write_csv(&path, "symbol,name\nAAPL,Apple\nMSFT,Microsoft\n");
        let second = cache.get().await.unwrap();
        assert_eq!(second.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));

        std::fs::remove_file(&path).unwrap();
        assert_eq!(cache.get().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_load_stays_uninitialized_and_retries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.csv");
        let cache = CatalogCache::new(&path);

        let err = cache.get().await.unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        assert_eq!(cache.state(), CacheState::Uninitialized);

        write_csv(&path, "Symbol,Name\nNVDA,NVIDIA\n");
        let c = cache.get().await.unwrap();
        assert_eq!(c.entries()[0].symbol, "NVDA");
        assert_eq!(cache.state(), CacheState::Populated);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_access_converges_on_one_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stocks.csv");
        let mut body = String::from("symbol,name\n");
        for i in 0..500 {
            body.push_str(&format!("S{i:04},Stock {i}\n"));
        }
        write_csv(&path, &body);

        let cache = Arc::new(CatalogCache::new(&path));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get().await })
            })
            .collect();

        let mut results = Vec::new();
        for h in handles {
            results.push(h.await.unwrap().unwrap());
        }

        for r in &results {
            assert_eq!(r.len(), 500);
            assert!(Arc::ptr_eq(r, &results[0]));
        }
    }
}
