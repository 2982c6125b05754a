//! The enriched dataset: load → join → derive, run once per source version

use crate::coerce::CoercionReport;
use crate::config::DashboardConfig;
use crate::derive::derive_all;
use crate::error::Result;
use crate::ingestion::{load_orders, load_products, TabularSource};
use crate::join::left_join;
use crate::model::EnrichedRecord;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// BLAKE3 digests of the two source payloads a dataset was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFingerprint {
    pub orders: blake3::Hash,
    pub products: blake3::Hash,
}

impl SourceFingerprint {
    pub fn of(orders: &[u8], products: &[u8]) -> Self {
        Self {
            orders: blake3::hash(orders),
            products: blake3::hash(products),
        }
    }

    pub fn short(&self) -> String {
        format!(
            "{}:{}",
            &self.orders.to_hex()[..12],
            &self.products.to_hex()[..12]
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadStats {
    pub order_rows: usize,
    pub product_rows: usize,
    pub unique_products: usize,
    pub unmatched_orders: usize,
}

/// Sorted distinct values available for the filter controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub countries: Vec<String>,
    pub categories: Vec<String>,
}

/// Immutable enriched table plus how it was produced.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<EnrichedRecord>,
    pub fingerprint: SourceFingerprint,
    pub loaded_at: DateTime<Utc>,
    pub stats: LoadStats,
    pub coercion: CoercionReport,
}

impl Dataset {
    /// Read both sources and build the dataset.
    pub fn load(
        orders: &dyn TabularSource,
        products: &dyn TabularSource,
        config: &DashboardConfig,
    ) -> Result<Self> {
        let order_bytes = orders.read_bytes()?;
        let product_bytes = products.read_bytes()?;
        Self::from_bytes(
            orders.source_name(),
            &order_bytes,
            products.source_name(),
            &product_bytes,
            config,
        )
    }

    /// Build from payloads that have already been read.
    pub fn from_bytes(
        orders_name: &str,
        order_bytes: &[u8],
        products_name: &str,
        product_bytes: &[u8],
        config: &DashboardConfig,
    ) -> Result<Self> {
        let started = Instant::now();
        let fingerprint = SourceFingerprint::of(order_bytes, product_bytes);

        let (products, product_report) = load_products(products_name, product_bytes, &config.columns)?;
        let (orders, order_report) = load_orders(orders_name, order_bytes, &config.columns)?;

        let joined = left_join(&orders.records, &products.records)?;
        let unmatched_orders = joined.iter().filter(|row| row.product.is_none()).count();
        let records = derive_all(&joined, &config.fallbacks);

        let mut coercion = order_report;
        coercion.merge(product_report);
        coercion.log_summary();

        let stats = LoadStats {
            order_rows: orders.records.len(),
            product_rows: products.raw_rows,
            unique_products: products.records.len(),
            unmatched_orders,
        };

        info!(
            rows = records.len(),
            unmatched = unmatched_orders,
            fingerprint = %fingerprint.short(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "enriched dataset ready"
        );

        Ok(Self {
            records,
            fingerprint,
            loaded_at: Utc::now(),
            stats,
            coercion,
        })
    }

    pub fn records(&self) -> &[EnrichedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct countries and categories of the unfiltered table.
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            countries: self
                .records
                .iter()
                .map(|r| r.country.clone())
                .unique()
                .sorted()
                .collect(),
            categories: self
                .records
                .iter()
                .map(|r| r.category.clone())
                .unique()
                .sorted()
                .collect(),
        }
    }
}
