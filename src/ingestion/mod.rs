//! Ingestion Module
//!
//! Reads the order and product sources into typed tables:
//! - Header normalization and alias resolution
//! - Required-column checks (fail fast)
//! - Numeric/date coercion with warnings
//! - Product deduplication

pub mod columns;
pub mod loader;
pub mod source;

pub use columns::{normalize_header, ColumnIndex};
pub use loader::{load_orders, load_products, normalize_product_id, OrderTable, ProductTable};
pub use source::{FileSource, MemorySource, TabularSource};
