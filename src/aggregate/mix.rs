use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;

/// One (category, sub-collection) wedge of the product-mix sunburst.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixSlice {
    pub category: String,
    pub sub_collection: String,
    pub revenue: f64,
}

pub fn category_mix(frame: &DataFrame) -> Result<Vec<MixSlice>> {
    let groups = frame
        .clone()
        .lazy()
        .group_by([col("category"), col("sub_collection")])
        .agg([col("total_revenue").sum().alias("revenue")])
        .sort_by_exprs(
            [col("category"), col("sub_collection")],
            SortMultipleOptions::default(),
        )
        .collect()?;

    let categories = groups.column("category")?.str()?;
    let sub_collections = groups.column("sub_collection")?.str()?;
    let revenue = groups.column("revenue")?.f64()?;

    Ok(categories
        .into_iter()
        .zip(sub_collections)
        .zip(revenue)
        .filter_map(|((category, sub_collection), revenue)| {
            Some(MixSlice {
                category: category?.to_string(),
                sub_collection: sub_collection?.to_string(),
                revenue: revenue.unwrap_or(0.0),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::{frame, row};

    #[test]
    fn test_mix_groups_by_category_and_sub_collection() {
        let mut rows = vec![
            row("USA", "Jewelry", 10.0, 1.0),
            row("USA", "Jewelry", 5.0, 1.0),
            row("USA", "Jewelry", 7.0, 1.0),
            row("USA", "Apparel", 3.0, 1.0),
        ];
        rows[2].sub_collection = "Gold".to_string();

        let mix = category_mix(&frame(&rows)).unwrap();
        assert_eq!(mix.len(), 3);
        assert_eq!(mix[0].category, "Apparel");
        assert_eq!((mix[1].sub_collection.as_str(), mix[1].revenue), ("General", 15.0));
        assert_eq!((mix[2].sub_collection.as_str(), mix[2].revenue), ("Gold", 7.0));
    }

    #[test]
    fn test_mix_empty() {
        assert!(category_mix(&frame(&[])).unwrap().is_empty());
    }
}
