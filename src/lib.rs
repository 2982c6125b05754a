pub mod aggregate;
pub mod cache;
pub mod coerce;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod derive;
pub mod error;
pub mod export;
pub mod filter;
pub mod ingestion;
pub mod join;
pub mod model;

pub use cache::DatasetCache;
pub use config::{AggregationLimits, DashboardConfig};
pub use dashboard::{build_snapshot, DashboardSnapshot};
pub use dataset::{Dataset, FilterOptions};
pub use error::{DataSourceError, NexusError, Result};
pub use filter::FilterSpec;
pub use model::{EnrichedRecord, MonthBucket, OrderRecord, ProductRecord};
