use crate::error::{NexusError, Result};
use crate::model::{OrderRecord, ProductRecord};
use polars::prelude::*;
use tracing::info;

const ORDER_ROW: &str = "order_row";
const PRODUCT_ROW: &str = "product_row";

/// An order paired with its product, if the catalog had one.
#[derive(Debug, Clone, Copy)]
pub struct JoinedRow<'a> {
    pub order: &'a OrderRecord,
    pub product: Option<&'a ProductRecord>,
}

fn row_numbers(len: usize) -> Vec<IdxSize> {
    (0..len).map(|i| i as IdxSize).collect()
}

/// Left join orders to products on the normalized product identifier.
///
/// Emits exactly one row per order, in order. Products are expected to be
/// unique by id; if they are not, the first one wins.
pub fn left_join<'a>(
    orders: &'a [OrderRecord],
    products: &'a [ProductRecord],
) -> Result<Vec<JoinedRow<'a>>> {
    let order_keys = df!(
        "product_id" => orders.iter().map(|o| o.product_id.as_str()).collect::<Vec<_>>(),
        ORDER_ROW => row_numbers(orders.len())
    )?;
    let product_keys = df!(
        "product_id" => products.iter().map(|p| p.product_id.as_str()).collect::<Vec<_>>(),
        PRODUCT_ROW => row_numbers(products.len())
    )?
    .lazy()
    .unique_stable(Some(vec!["product_id".to_string()]), UniqueKeepStrategy::First);

    let joined = order_keys
        .lazy()
        .join(
            product_keys,
            [col("product_id")],
            [col("product_id")],
            JoinArgs::new(JoinType::Left),
        )
        .sort_by_exprs([col(ORDER_ROW)], SortMultipleOptions::default())
        .collect()?;

    if joined.height() != orders.len() {
        return Err(NexusError::Join(format!(
            "{} orders produced {} joined rows",
            orders.len(),
            joined.height()
        )));
    }

    let order_rows = joined.column(ORDER_ROW)?.idx()?;
    let product_rows = joined.column(PRODUCT_ROW)?.idx()?;
    let rows: Vec<JoinedRow<'a>> = order_rows
        .into_iter()
        .zip(product_rows)
        .filter_map(|(order_row, product_row)| {
            Some(JoinedRow {
                order: orders.get(order_row? as usize)?,
                product: product_row.and_then(|p| products.get(p as usize)),
            })
        })
        .collect();

    let unmatched = rows.iter().filter(|row| row.product.is_none()).count();
    info!(rows = rows.len(), unmatched, "joined orders to products");

    Ok(rows)
}
