//! Dashboard configuration
//!
//! Everything has a default matching the Order_Details / Product_Details exports, so
//! an empty JSON object is a valid config file. Environment variables
//! (optionally from a `.env` file) override the source paths.

use crate::error::{NexusError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ORDERS_PATH_ENV: &str = "NEXUS_ORDERS_PATH";
pub const PRODUCTS_PATH_ENV: &str = "NEXUS_PRODUCTS_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub sources: SourcePaths,
    pub columns: ColumnMapping,
    pub fallbacks: FallbackLabels,
    pub limits: AggregationLimits,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePaths {
    pub orders: Option<PathBuf>,
    pub products: Option<PathBuf>,
}

/// Accepted header aliases per logical field.
///
/// Aliases are compared after header normalization, so `"Unit Price ($)"`
/// is matched by `unit_price`. The first alias present in the file wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub product_id: Vec<String>,
    pub product_name: Vec<String>,
    pub category: Vec<String>,
    pub sub_collection: Vec<String>,
    pub unit_cost: Vec<String>,
    pub shipping_fee: Vec<String>,
    pub quantity: Vec<String>,
    pub selling_price: Vec<String>,
    pub order_date: Vec<String>,
    pub customer_location: Vec<String>,
    pub age_group: Vec<String>,
}

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            product_id: aliases(&["product_id"]),
            product_name: aliases(&["product_name"]),
            category: aliases(&["category"]),
            sub_collection: aliases(&["sub_collection"]),
            unit_cost: aliases(&["unit_price", "unit_cost"]),
            shipping_fee: aliases(&["shipping_fee"]),
            quantity: aliases(&["quantity_units", "quantity"]),
            selling_price: aliases(&["net_price", "selling_price"]),
            order_date: aliases(&["date", "order_date"]),
            customer_location: aliases(&["customer_location", "location"]),
            age_group: aliases(&["customer_age_group", "age_group"]),
        }
    }
}

/// Labels substituted for null product attributes after the join.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackLabels {
    pub category: String,
    pub sub_collection: String,
}

impl Default for FallbackLabels {
    fn default() -> Self {
        Self {
            category: "Other".to_string(),
            sub_collection: "General".to_string(),
        }
    }
}

/// Row limits for the ranked tables and cardinality guards for the
/// group-heavy ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationLimits {
    pub territory_top_n: usize,
    pub product_top_n: usize,
    pub transaction_log_rows: usize,
    pub max_matrix_categories: usize,
    pub max_matrix_age_groups: usize,
    pub max_geo_countries: usize,
}

impl Default for AggregationLimits {
    fn default() -> Self {
        Self {
            territory_top_n: 7,
            product_top_n: 150,
            transaction_log_rows: 100,
            max_matrix_categories: 200,
            max_matrix_age_groups: 50,
            max_geo_countries: 250,
        }
    }
}

impl DashboardConfig {
    /// Load a config from a JSON file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            NexusError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: DashboardConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `NEXUS_ORDERS_PATH` / `NEXUS_PRODUCTS_PATH` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(orders) = std::env::var(ORDERS_PATH_ENV) {
            self.sources.orders = Some(PathBuf::from(orders));
        }
        if let Ok(products) = std::env::var(PRODUCTS_PATH_ENV) {
            self.sources.products = Some(PathBuf::from(products));
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let columns = &self.columns;
        let fields = [
            ("product_id", &columns.product_id),
            ("product_name", &columns.product_name),
            ("category", &columns.category),
            ("sub_collection", &columns.sub_collection),
            ("unit_cost", &columns.unit_cost),
            ("shipping_fee", &columns.shipping_fee),
            ("quantity", &columns.quantity),
            ("selling_price", &columns.selling_price),
            ("order_date", &columns.order_date),
            ("customer_location", &columns.customer_location),
            ("age_group", &columns.age_group),
        ];
        for (field, names) in fields {
            if names.is_empty() {
                return Err(NexusError::Config(format!(
                    "Column mapping for '{}' has no aliases",
                    field
                )));
            }
        }

        if self.limits.max_matrix_categories == 0 || self.limits.max_matrix_age_groups == 0 {
            return Err(NexusError::Config(
                "Matrix cardinality limits must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
