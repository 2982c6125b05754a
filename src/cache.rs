//! Dataset cache
//!
//! Holds the last enriched dataset and rebuilds it only when the content
//! hash of either source changes or the cache is explicitly invalidated.

use crate::config::DashboardConfig;
use crate::dataset::{Dataset, SourceFingerprint};
use crate::error::Result;
use crate::ingestion::TabularSource;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

pub struct DatasetCache {
    config: DashboardConfig,
    current: RwLock<Option<Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            current: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    // A panic mid-load never leaves a half-built dataset behind, so a
    // poisoned lock still holds a consistent value.
    fn read(&self) -> RwLockReadGuard<'_, Option<Arc<Dataset>>> {
        self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Arc<Dataset>>> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the cached dataset if both sources are byte-identical to the
    /// ones it was built from, otherwise rebuild it.
    pub fn get_or_load(
        &self,
        orders: &dyn TabularSource,
        products: &dyn TabularSource,
    ) -> Result<Arc<Dataset>> {
        let order_bytes = orders.read_bytes()?;
        let product_bytes = products.read_bytes()?;
        let fingerprint = SourceFingerprint::of(&order_bytes, &product_bytes);

        if let Some(dataset) = self.read().as_ref() {
            if dataset.fingerprint == fingerprint {
                debug!(fingerprint = %fingerprint.short(), "dataset cache hit");
                return Ok(Arc::clone(dataset));
            }
        }

        info!(fingerprint = %fingerprint.short(), "dataset cache miss, rebuilding");
        let dataset = Arc::new(Dataset::from_bytes(
            orders.source_name(),
            &order_bytes,
            products.source_name(),
            &product_bytes,
            &self.config,
        )?);

        *self.write() = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Dataset from the last successful load, if any.
    pub fn current(&self) -> Option<Arc<Dataset>> {
        self.read().clone()
    }

    pub fn invalidate(&self) {
        if self.write().take().is_some() {
            info!("dataset cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::{FileSource, MemorySource};

    const PRODUCTS: &str = "\
Product ID,Product Name,Category,Sub_Collection,Unit Price ($)
P1,Ring,Jewelry,Gold,3
";

    const ORDERS: &str = "\
Product ID,Shipping Fee ($),Quantity (Units),Net Price ($),Date,Customer Location,Customer Age Group
P1,5,2,10,2024-01-15,USA,25-34
";

    #[test]
    fn test_unchanged_sources_hit_cache() {
        let cache = DatasetCache::new(DashboardConfig::default());
        let orders = MemorySource::from_text("orders", ORDERS);
        let products = MemorySource::from_text("products", PRODUCTS);

        let first = cache.get_or_load(&orders, &products).unwrap();
        let second = cache.get_or_load(&orders, &products).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_changed_file_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let orders_path = dir.path().join("orders.csv");
        let products_path = dir.path().join("products.csv");
        std::fs::write(&orders_path, ORDERS).unwrap();
        std::fs::write(&products_path, PRODUCTS).unwrap();

        let cache = DatasetCache::new(DashboardConfig::default());
        let orders = FileSource::new("orders", &orders_path);
        let products = FileSource::new("products", &products_path);

        let first = cache.get_or_load(&orders, &products).unwrap();
        assert_eq!(first.len(), 1);

        std::fs::write(
            &orders_path,
            format!("{}P1,0,1,4,2024-02-01,France,18-24\n", ORDERS),
        )
        .unwrap();
        let second = cache.get_or_load(&orders, &products).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let cache = DatasetCache::new(DashboardConfig::default());
        let orders = MemorySource::from_text("orders", ORDERS);
        let products = MemorySource::from_text("products", PRODUCTS);

        let first = cache.get_or_load(&orders, &products).unwrap();
        cache.invalidate();
        assert!(cache.current().is_none());

        let second = cache.get_or_load(&orders, &products).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.fingerprint, second.fingerprint);
    }

    #[test]
    fn test_failed_load_keeps_previous_dataset() {
        let cache = DatasetCache::new(DashboardConfig::default());
        let products = MemorySource::from_text("products", PRODUCTS);
        cache
            .get_or_load(&MemorySource::from_text("orders", ORDERS), &products)
            .unwrap();

        let broken = MemorySource::from_text("orders", "Product ID\nP1\n");
        assert!(cache.get_or_load(&broken, &products).is_err());
        assert!(cache.current().is_some());
    }
}
