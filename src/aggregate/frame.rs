//! Columnar copy of the filtered rows that the grouped tables run over

use crate::model::EnrichedRecord;
use polars::prelude::*;

/// Build the enriched frame for one filtered view.
///
/// Only the columns some aggregation groups or sums over are carried.
/// `year` and `month` are null for undated rows.
pub fn enriched_frame(rows: &[&EnrichedRecord]) -> PolarsResult<DataFrame> {
    df!(
        "product_name" => rows.iter().map(|r| r.product_name.as_deref()).collect::<Vec<_>>(),
        "category" => rows.iter().map(|r| r.category.as_str()).collect::<Vec<_>>(),
        "sub_collection" => rows.iter().map(|r| r.sub_collection.as_str()).collect::<Vec<_>>(),
        "country" => rows.iter().map(|r| r.country.as_str()).collect::<Vec<_>>(),
        "age_group" => rows.iter().map(|r| r.age_group.as_deref()).collect::<Vec<_>>(),
        "year" => rows.iter().map(|r| r.month_period.map(|m| m.year)).collect::<Vec<_>>(),
        "month" => rows.iter().map(|r| r.month_period.map(|m| m.month)).collect::<Vec<_>>(),
        "selling_price" => rows.iter().map(|r| r.selling_price).collect::<Vec<_>>(),
        "quantity" => rows.iter().map(|r| r.quantity).collect::<Vec<_>>(),
        "total_revenue" => rows.iter().map(|r| r.total_revenue).collect::<Vec<_>>(),
        "total_profit" => rows.iter().map(|r| r.total_profit).collect::<Vec<_>>(),
        "margin_percent" => rows.iter().map(|r| r.margin_percent).collect::<Vec<_>>()
    )
}

/// Saturating conversion for `limit` / `tail` row counts.
pub(crate) fn idx(n: usize) -> IdxSize {
    IdxSize::try_from(n).unwrap_or(IdxSize::MAX)
}
