//! Aggregations feeding the KPI block, charts and the transaction log
//!
//! The KPI block and transaction log read the filtered view
//! (`&[&EnrichedRecord]`) directly. The grouped tables run as polars lazy
//! queries over [`enriched_frame`] of that view. Empty input always produces
//! empty output. Ranked tables break ties on their group keys, ascending.

pub mod frame;
pub mod kpi;
pub mod matrix;
pub mod mix;
pub mod products;
pub mod territory;
pub mod transactions;
pub mod trend;

pub use frame::enriched_frame;
pub use kpi::{kpi_summary, KpiSummary};
pub use matrix::{demographic_matrix, DemographicMatrix};
pub use mix::{category_mix, MixSlice};
pub use products::{product_rollup, ProductRollup};
pub use territory::{geo_rollup, territory_rollup, GeoPoint, GeoRollup, TerritoryRollup};
pub use transactions::{transaction_log, TransactionLogEntry};
pub use trend::{time_trend, TrendPoint};
