use crate::aggregate::frame::idx;
use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;

/// Per-product point for the price / margin / volume scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRollup {
    pub product_name: String,
    pub category: String,
    pub mean_selling_price: f64,
    pub mean_margin: f64,
    pub total_quantity: f64,
}

/// The `top_n` best-selling (product, category) pairs by units, highest
/// first. Orders that matched no product have no name and are skipped.
pub fn product_rollup(frame: &DataFrame, top_n: usize) -> Result<Vec<ProductRollup>> {
    let ranked = frame
        .clone()
        .lazy()
        .filter(col("product_name").is_not_null())
        .group_by([col("product_name"), col("category")])
        .agg([
            col("selling_price").mean().alias("mean_selling_price"),
            col("margin_percent").mean().alias("mean_margin"),
            col("quantity").sum().alias("total_quantity"),
        ])
        .sort_by_exprs(
            [col("total_quantity"), col("product_name"), col("category")],
            SortMultipleOptions::default().with_order_descendings([true, false, false]),
        )
        .limit(idx(top_n))
        .collect()?;

    let names = ranked.column("product_name")?.str()?;
    let categories = ranked.column("category")?.str()?;
    let price = ranked.column("mean_selling_price")?.f64()?;
    let margin = ranked.column("mean_margin")?.f64()?;
    let quantity = ranked.column("total_quantity")?.f64()?;

    Ok(names
        .into_iter()
        .zip(categories)
        .zip(price.into_iter().zip(margin).zip(quantity))
        .filter_map(|((name, category), ((price, margin), quantity))| {
            Some(ProductRollup {
                product_name: name?.to_string(),
                category: category?.to_string(),
                mean_selling_price: price.unwrap_or(0.0),
                mean_margin: margin.unwrap_or(0.0),
                total_quantity: quantity.unwrap_or(0.0),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::{frame, row};
    use crate::model::EnrichedRecord;

    fn sale(name: Option<&str>, category: &str, price: f64, qty: f64) -> EnrichedRecord {
        let mut r = row("USA", category, price * qty, price * qty / 2.0);
        r.product_name = name.map(str::to_string);
        r.selling_price = price;
        r.quantity = qty;
        r
    }

    #[test]
    fn test_product_rollup_means_and_sums() {
        let rows = vec![
            sale(Some("Ring"), "Jewelry", 10.0, 2.0),
            sale(Some("Ring"), "Jewelry", 20.0, 3.0),
            sale(Some("Scarf"), "Apparel", 5.0, 1.0),
        ];
        let rollup = product_rollup(&frame(&rows), 150).unwrap();
        assert_eq!(rollup.len(), 2);
        assert_eq!(rollup[0].product_name, "Ring");
        assert_eq!(rollup[0].total_quantity, 5.0);
        assert_eq!(rollup[0].mean_selling_price, 15.0);
        assert!((rollup[0].mean_margin - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_name_in_two_categories_is_two_groups() {
        let rows = vec![
            sale(Some("Ring"), "Jewelry", 10.0, 1.0),
            sale(Some("Ring"), "Other", 10.0, 1.0),
        ];
        let rollup = product_rollup(&frame(&rows), 150).unwrap();
        assert_eq!(rollup.len(), 2);
        assert_eq!(rollup[0].category, "Jewelry");
    }

    #[test]
    fn test_product_rollup_skips_unnamed_and_limits() {
        let rows = vec![
            sale(None, "Other", 10.0, 100.0),
            sale(Some("A"), "X", 1.0, 1.0),
            sale(Some("B"), "X", 1.0, 3.0),
            sale(Some("C"), "X", 1.0, 2.0),
        ];
        let rollup = product_rollup(&frame(&rows), 2).unwrap();
        let names: Vec<&str> = rollup.iter().map(|p| p.product_name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn test_product_rollup_empty() {
        assert!(product_rollup(&frame(&[]), 150).unwrap().is_empty());
    }
}
