use crate::error::Result;
use crate::model::MonthBucket;
use polars::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: MonthBucket,
    pub revenue: f64,
    pub profit: f64,
}

/// Monthly revenue and profit, oldest month first. Rows without a month
/// bucket are skipped.
pub fn time_trend(frame: &DataFrame) -> Result<Vec<TrendPoint>> {
    let by_month = frame
        .clone()
        .lazy()
        .filter(col("year").is_not_null())
        .group_by([col("year"), col("month")])
        .agg([
            col("total_revenue").sum().alias("revenue"),
            col("total_profit").sum().alias("profit"),
        ])
        .sort_by_exprs([col("year"), col("month")], SortMultipleOptions::default())
        .collect()?;

    let years = by_month.column("year")?.i32()?;
    let months = by_month.column("month")?.u32()?;
    let revenue = by_month.column("revenue")?.f64()?;
    let profit = by_month.column("profit")?.f64()?;

    Ok(years
        .into_iter()
        .zip(months)
        .zip(revenue.into_iter().zip(profit))
        .filter_map(|((year, month), (revenue, profit))| {
            Some(TrendPoint {
                month: MonthBucket {
                    year: year?,
                    month: month?,
                },
                revenue: revenue.unwrap_or(0.0),
                profit: profit.unwrap_or(0.0),
            })
        })
        .collect())
}
