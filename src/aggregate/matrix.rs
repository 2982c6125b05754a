use crate::aggregate::frame::idx;
use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// Category × age-group revenue grid for the demographic heatmap.
///
/// `values[i][j]` is the revenue of `categories[i]` within `age_groups[j]`;
/// combinations with no orders are `0.0`. Both axes are sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemographicMatrix {
    pub categories: Vec<String>,
    pub age_groups: Vec<String>,
    pub values: Vec<Vec<f64>>,
    /// Set when an axis hit its cardinality limit and was cut down.
    pub truncated: bool,
}

impl DemographicMatrix {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn value(&self, category: &str, age_group: &str) -> Option<f64> {
        let i = self.categories.iter().position(|c| c == category)?;
        let j = self.age_groups.iter().position(|a| a == age_group)?;
        Some(self.values[i][j])
    }
}

/// Axis keys with the `limit` highest totals, in key order, plus how many
/// distinct keys there were.
fn top_keys(cells: &DataFrame, key: &str, limit: usize) -> Result<(Vec<String>, usize)> {
    let totals = cells
        .clone()
        .lazy()
        .group_by([col(key)])
        .agg([col("revenue").sum()])
        .sort_by_exprs(
            [col("revenue"), col(key)],
            SortMultipleOptions::default().with_order_descendings([true, false]),
        )
        .collect()?;

    let distinct = totals.height();
    let kept = totals
        .lazy()
        .limit(idx(limit))
        .sort_by_exprs([col(key)], SortMultipleOptions::default())
        .collect()?;
    let keys = kept
        .column(key)?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    Ok((keys, distinct))
}

/// Revenue pivoted by category and age group. Rows with no age group
/// are left out.
pub fn demographic_matrix(
    frame: &DataFrame,
    max_categories: usize,
    max_age_groups: usize,
) -> Result<DemographicMatrix> {
    let cells = frame
        .clone()
        .lazy()
        .filter(col("age_group").is_not_null())
        .group_by([col("category"), col("age_group")])
        .agg([col("total_revenue").sum().alias("revenue")])
        .collect()?;

    let (categories, category_count) = top_keys(&cells, "category", max_categories)?;
    let (age_groups, age_count) = top_keys(&cells, "age_group", max_age_groups)?;
    let truncated = category_count > categories.len() || age_count > age_groups.len();
    if truncated {
        warn!(
            categories = category_count,
            age_groups = age_count,
            max_categories,
            max_age_groups,
            "demographic matrix truncated to cardinality limits"
        );
    }

    let mut lookup: HashMap<(&str, &str), f64> = HashMap::with_capacity(cells.height());
    let cell_categories = cells.column("category")?.str()?;
    let cell_ages = cells.column("age_group")?.str()?;
    let cell_revenue = cells.column("revenue")?.f64()?;
    for ((category, age), revenue) in cell_categories.into_iter().zip(cell_ages).zip(cell_revenue) {
        if let (Some(category), Some(age)) = (category, age) {
            lookup.insert((category, age), revenue.unwrap_or(0.0));
        }
    }

    let values: Vec<Vec<f64>> = categories
        .iter()
        .map(|category| {
            age_groups
                .iter()
                .map(|age| {
                    lookup
                        .get(&(category.as_str(), age.as_str()))
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect()
        })
        .collect();

    Ok(DemographicMatrix {
        categories,
        age_groups,
        values,
        truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::{frame, row};
    use crate::model::EnrichedRecord;

    fn aged(category: &str, age: Option<&str>, revenue: f64) -> EnrichedRecord {
        let mut r = row("USA", category, revenue, 0.0);
        r.age_group = age.map(str::to_string);
        r
    }

    #[test]
    fn test_matrix_fills_missing_with_zero() {
        let rows = vec![
            aged("Jewelry", Some("18-24"), 10.0),
            aged("Jewelry", Some("18-24"), 5.0),
            aged("Apparel", Some("35-44"), 7.0),
        ];
        let matrix = demographic_matrix(&frame(&rows), 10, 10).unwrap();

        assert_eq!(matrix.categories, vec!["Apparel", "Jewelry"]);
        assert_eq!(matrix.age_groups, vec!["18-24", "35-44"]);
        assert_eq!(matrix.values, vec![vec![0.0, 7.0], vec![15.0, 0.0]]);
        assert_eq!(matrix.value("Jewelry", "18-24"), Some(15.0));
        assert_eq!(matrix.value("Jewelry", "99+"), None);
        assert!(!matrix.truncated);
    }

    #[test]
    fn test_matrix_skips_rows_without_age_group() {
        let rows = vec![aged("Jewelry", None, 10.0)];
        let matrix = demographic_matrix(&frame(&rows), 10, 10).unwrap();
        assert!(matrix.is_empty());
        assert!(matrix.values.is_empty());
    }

    #[test]
    fn test_matrix_caps_cardinality_by_revenue() {
        let rows = vec![
            aged("A", Some("x"), 1.0),
            aged("B", Some("x"), 30.0),
            aged("C", Some("x"), 20.0),
            aged("D", Some("x"), 20.0),
        ];
        let matrix = demographic_matrix(&frame(&rows), 2, 10).unwrap();
        assert!(matrix.truncated);
        // B is highest; C wins the tie with D on key order
        assert_eq!(matrix.categories, vec!["B", "C"]);
        assert_eq!(matrix.values, vec![vec![30.0], vec![20.0]]);
    }

    #[test]
    fn test_matrix_empty() {
        let matrix = demographic_matrix(&frame(&[]), 10, 10).unwrap();
        assert_eq!(matrix, DemographicMatrix::default());
    }
}
