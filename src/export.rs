//! Hand-off of snapshot tables to presentation collaborators
//!
//! Each aggregate becomes a polars `DataFrame` with a fixed column schema:
//!
//! | table          | columns                                                                   |
//! |----------------|---------------------------------------------------------------------------|
//! | `kpis`         | total_revenue, total_profit, margin_percent, order_count                  |
//! | `trend`        | month, revenue, profit                                                    |
//! | `category_mix` | category, sub_collection, revenue                                         |
//! | `demographics` | category, then `age_<group>` per age group                                |
//! | `territories`  | country, revenue, mean_margin                                             |
//! | `geo`          | country, revenue                                                          |
//! | `products`     | product_name, category, mean_selling_price, mean_margin, total_quantity   |
//! | `transactions` | date, product_name, category, country, selling_price, quantity, total_revenue, margin_percent |

use crate::aggregate::DemographicMatrix;
use crate::dashboard::DashboardSnapshot;
use crate::error::Result;
use polars::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const AGE_COLUMN_PREFIX: &str = "age_";

fn matrix_frame(matrix: &DemographicMatrix) -> PolarsResult<DataFrame> {
    let mut columns = Vec::with_capacity(matrix.age_groups.len() + 1);
    columns.push(Series::new("category", matrix.categories.clone()));
    for (j, age_group) in matrix.age_groups.iter().enumerate() {
        let values: Vec<f64> = matrix.values.iter().map(|row| row[j]).collect();
        let name = format!("{}{}", AGE_COLUMN_PREFIX, age_group);
        columns.push(Series::new(name.as_str(), values));
    }
    DataFrame::new(columns)
}

/// Every snapshot table as a named `DataFrame`, in display order.
pub fn snapshot_frames(snapshot: &DashboardSnapshot) -> Result<Vec<(&'static str, DataFrame)>> {
    let kpis = &snapshot.kpis;
    let kpi_frame = df!(
        "total_revenue" => [kpis.total_revenue],
        "total_profit" => [kpis.total_profit],
        "margin_percent" => [kpis.margin_percent],
        "order_count" => [kpis.order_count as u64]
    )?;

    let trend = &snapshot.trend;
    let trend_frame = df!(
        "month" => trend.iter().map(|p| p.month.to_string()).collect::<Vec<_>>(),
        "revenue" => trend.iter().map(|p| p.revenue).collect::<Vec<_>>(),
        "profit" => trend.iter().map(|p| p.profit).collect::<Vec<_>>()
    )?;

    let mix = &snapshot.category_mix;
    let mix_frame = df!(
        "category" => mix.iter().map(|s| s.category.clone()).collect::<Vec<_>>(),
        "sub_collection" => mix.iter().map(|s| s.sub_collection.clone()).collect::<Vec<_>>(),
        "revenue" => mix.iter().map(|s| s.revenue).collect::<Vec<_>>()
    )?;

    let territories = &snapshot.territories;
    let territory_frame = df!(
        "country" => territories.iter().map(|t| t.country.clone()).collect::<Vec<_>>(),
        "revenue" => territories.iter().map(|t| t.revenue).collect::<Vec<_>>(),
        "mean_margin" => territories.iter().map(|t| t.mean_margin).collect::<Vec<_>>()
    )?;

    let geo = &snapshot.geo.points;
    let geo_frame = df!(
        "country" => geo.iter().map(|p| p.country.clone()).collect::<Vec<_>>(),
        "revenue" => geo.iter().map(|p| p.revenue).collect::<Vec<_>>()
    )?;

    let products = &snapshot.products;
    let product_frame = df!(
        "product_name" => products.iter().map(|p| p.product_name.clone()).collect::<Vec<_>>(),
        "category" => products.iter().map(|p| p.category.clone()).collect::<Vec<_>>(),
        "mean_selling_price" => products.iter().map(|p| p.mean_selling_price).collect::<Vec<_>>(),
        "mean_margin" => products.iter().map(|p| p.mean_margin).collect::<Vec<_>>(),
        "total_quantity" => products.iter().map(|p| p.total_quantity).collect::<Vec<_>>()
    )?;

    let log = &snapshot.transactions;
    let log_frame = df!(
        "date" => log.iter().map(|e| e.date.map(|d| d.format(DATE_FORMAT).to_string())).collect::<Vec<_>>(),
        "product_name" => log.iter().map(|e| e.product_name.clone()).collect::<Vec<_>>(),
        "category" => log.iter().map(|e| e.category.clone()).collect::<Vec<_>>(),
        "country" => log.iter().map(|e| e.country.clone()).collect::<Vec<_>>(),
        "selling_price" => log.iter().map(|e| e.selling_price).collect::<Vec<_>>(),
        "quantity" => log.iter().map(|e| e.quantity).collect::<Vec<_>>(),
        "total_revenue" => log.iter().map(|e| e.total_revenue).collect::<Vec<_>>(),
        "margin_percent" => log.iter().map(|e| e.margin_percent).collect::<Vec<_>>()
    )?;

    Ok(vec![
        ("kpis", kpi_frame),
        ("trend", trend_frame),
        ("category_mix", mix_frame),
        ("demographics", matrix_frame(&snapshot.demographics)?),
        ("territories", territory_frame),
        ("geo", geo_frame),
        ("products", product_frame),
        ("transactions", log_frame),
    ])
}

/// Write `<table>.csv` for every table plus `snapshot.json` into `dir`.
/// Returns the paths written.
pub fn write_snapshot(snapshot: &DashboardSnapshot, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for (name, mut frame) in snapshot_frames(snapshot)? {
        let path = dir.join(format!("{}.csv", name));
        let mut file = File::create(&path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut frame)?;
        written.push(path);
    }

    let json_path = dir.join("snapshot.json");
    let writer = BufWriter::new(File::create(&json_path)?);
    serde_json::to_writer_pretty(writer, snapshot)?;
    written.push(json_path);

    info!(dir = %dir.display(), files = written.len(), "snapshot exported");
    Ok(written)
}
