//! CSV Loader - turns the raw order and product sources into typed tables

use crate::coerce::{CoercionReport, Coercer};
use crate::config::ColumnMapping;
use crate::error::DataSourceError;
use crate::ingestion::columns::ColumnIndex;
use crate::model::{OrderRecord, ProductRecord};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashSet;
use tracing::info;

/// Loaded products plus what deduplication removed.
#[derive(Debug, Clone)]
pub struct ProductTable {
    pub records: Vec<ProductRecord>,
    pub raw_rows: usize,
    pub duplicates_dropped: usize,
}

#[derive(Debug, Clone)]
pub struct OrderTable {
    pub records: Vec<OrderRecord>,
}

/// Trimmed, stringified product identifier shared by dedup and join.
pub fn normalize_product_id(raw: &str) -> String {
    raw.trim().to_string()
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Read the header row and all data rows of a CSV payload.
///
/// Rows are returned with their 1-based source line for warnings.
fn read_csv(source_name: &str, bytes: &[u8]) -> Result<(StringRecord, Vec<(u64, StringRecord)>), DataSourceError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = rdr
        .headers()
        .map_err(|e| malformed(source_name, &e))?
        .clone();

    if headers.is_empty() {
        return Err(DataSourceError::Malformed {
            source_name: source_name.to_string(),
            line: Some(1),
            reason: "missing header row".to_string(),
        });
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| malformed(source_name, &e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        rows.push((line, record));
    }

    Ok((headers, rows))
}

fn malformed(source_name: &str, err: &csv::Error) -> DataSourceError {
    DataSourceError::Malformed {
        source_name: source_name.to_string(),
        line: err.position().map(|p| p.line()),
        reason: err.to_string(),
    }
}

fn cell<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("")
}

/// Load the product catalog, keeping the first row seen for each
/// identifier.
pub fn load_products(
    source_name: &str,
    bytes: &[u8],
    columns: &ColumnMapping,
) -> Result<(ProductTable, CoercionReport), DataSourceError> {
    let (headers, rows) = read_csv(source_name, bytes)?;
    let index = ColumnIndex::new(headers.iter());
    let [id_idx, name_idx, category_idx, sub_idx, cost_idx] = index.require(
        source_name,
        [
            ("product_id", &columns.product_id[..]),
            ("product_name", &columns.product_name[..]),
            ("category", &columns.category[..]),
            ("sub_collection", &columns.sub_collection[..]),
            ("unit_cost", &columns.unit_cost[..]),
        ],
    )?;

    let mut coercer = Coercer::new(source_name);
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(rows.len());
    let raw_rows = rows.len();

    for (line, row) in &rows {
        let product_id = normalize_product_id(cell(row, id_idx));
        if !seen.insert(product_id.clone()) {
            continue;
        }

        records.push(ProductRecord {
            product_id,
            product_name: non_blank(cell(row, name_idx)),
            category: non_blank(cell(row, category_idx)),
            sub_collection: non_blank(cell(row, sub_idx)),
            unit_cost: coercer.numeric("unit_cost", *line, cell(row, cost_idx)),
        });
    }

    let duplicates_dropped = raw_rows - records.len();
    info!(
        source = source_name,
        rows = raw_rows,
        unique = records.len(),
        duplicates_dropped,
        "loaded product catalog"
    );

    Ok((
        ProductTable {
            records,
            raw_rows,
            duplicates_dropped,
        },
        coercer.finish(),
    ))
}

/// Load order transactions. Every data row becomes one record.
pub fn load_orders(
    source_name: &str,
    bytes: &[u8],
    columns: &ColumnMapping,
) -> Result<(OrderTable, CoercionReport), DataSourceError> {
    let (headers, rows) = read_csv(source_name, bytes)?;
    let index = ColumnIndex::new(headers.iter());
    let [id_idx, ship_idx, qty_idx, price_idx, date_idx, loc_idx, age_idx] = index.require(
        source_name,
        [
            ("product_id", &columns.product_id[..]),
            ("shipping_fee", &columns.shipping_fee[..]),
            ("quantity", &columns.quantity[..]),
            ("selling_price", &columns.selling_price[..]),
            ("order_date", &columns.order_date[..]),
            ("customer_location", &columns.customer_location[..]),
            ("age_group", &columns.age_group[..]),
        ],
    )?;

    let mut coercer = Coercer::new(source_name);
    let records: Vec<OrderRecord> = rows
        .iter()
        .map(|(line, row)| OrderRecord {
            product_id: normalize_product_id(cell(row, id_idx)),
            shipping_fee: coercer.numeric("shipping_fee", *line, cell(row, ship_idx)),
            quantity: coercer.numeric("quantity", *line, cell(row, qty_idx)),
            selling_price: coercer.numeric("selling_price", *line, cell(row, price_idx)),
            order_date: coercer.datetime("order_date", *line, cell(row, date_idx)),
            customer_location: cell(row, loc_idx).to_string(),
            age_group: non_blank(cell(row, age_idx)),
        })
        .collect();

    info!(source = source_name, rows = records.len(), "loaded orders");

    Ok((OrderTable { records }, coercer.finish()))
}
