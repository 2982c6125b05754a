//! Dashboard snapshot: one filter spec in, every presentation table out

use crate::aggregate::{
    category_mix, demographic_matrix, enriched_frame, geo_rollup, kpi_summary, product_rollup,
    territory_rollup, time_trend, transaction_log, DemographicMatrix, GeoRollup, KpiSummary,
    MixSlice, ProductRollup, TerritoryRollup, TransactionLogEntry, TrendPoint,
};
use crate::config::AggregationLimits;
use crate::dataset::{Dataset, FilterOptions};
use crate::error::Result;
use crate::filter::FilterSpec;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// Everything the dashboard renders for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub filter: FilterSpec,
    pub filter_options: FilterOptions,
    pub kpis: KpiSummary,
    pub trend: Vec<TrendPoint>,
    pub category_mix: Vec<MixSlice>,
    pub demographics: DemographicMatrix,
    pub territories: Vec<TerritoryRollup>,
    pub geo: GeoRollup,
    pub products: Vec<ProductRollup>,
    pub transactions: Vec<TransactionLogEntry>,
}

/// Filter the dataset and run every aggregation over the result.
///
/// Reads the dataset only; safe to call from many threads at once.
pub fn build_snapshot(
    dataset: &Dataset,
    filter: &FilterSpec,
    limits: &AggregationLimits,
) -> Result<DashboardSnapshot> {
    let started = Instant::now();
    let rows = filter.apply(dataset.records());
    let frame = enriched_frame(&rows)?;

    let snapshot = DashboardSnapshot {
        filter: filter.clone(),
        filter_options: dataset.filter_options(),
        kpis: kpi_summary(&rows),
        trend: time_trend(&frame)?,
        category_mix: category_mix(&frame)?,
        demographics: demographic_matrix(
            &frame,
            limits.max_matrix_categories,
            limits.max_matrix_age_groups,
        )?,
        territories: territory_rollup(&frame, limits.territory_top_n)?,
        geo: geo_rollup(&frame, limits.max_geo_countries)?,
        products: product_rollup(&frame, limits.product_top_n)?,
        transactions: transaction_log(&rows, limits.transaction_log_rows),
    };

    debug!(
        base_rows = dataset.len(),
        filtered_rows = rows.len(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "dashboard snapshot built"
    );

    Ok(snapshot)
}
