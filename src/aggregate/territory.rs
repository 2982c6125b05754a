use crate::aggregate::frame::idx;
use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerritoryRollup {
    pub country: String,
    pub revenue: f64,
    pub mean_margin: f64,
}

/// Top `top_n` countries by revenue, in ascending revenue order so the
/// largest bar renders last. Equal revenue orders by country name.
pub fn territory_rollup(frame: &DataFrame, top_n: usize) -> Result<Vec<TerritoryRollup>> {
    let ranked = frame
        .clone()
        .lazy()
        .group_by([col("country")])
        .agg([
            col("total_revenue").sum().alias("revenue"),
            col("margin_percent").mean().alias("mean_margin"),
        ])
        .sort_by_exprs([col("revenue"), col("country")], SortMultipleOptions::default())
        .tail(idx(top_n))
        .collect()?;

    let countries = ranked.column("country")?.str()?;
    let revenue = ranked.column("revenue")?.f64()?;
    let margin = ranked.column("mean_margin")?.f64()?;

    Ok(countries
        .into_iter()
        .zip(revenue)
        .zip(margin)
        .filter_map(|((country, revenue), margin)| {
            Some(TerritoryRollup {
                country: country?.to_string(),
                revenue: revenue.unwrap_or(0.0),
                mean_margin: margin.unwrap_or(0.0),
            })
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub country: String,
    pub revenue: f64,
}

/// Revenue per country for the globe view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeoRollup {
    pub points: Vec<GeoPoint>,
    pub truncated: bool,
}

/// Revenue for every country, sorted by name. Beyond `max_countries` only
/// the highest-revenue countries are kept.
pub fn geo_rollup(frame: &DataFrame, max_countries: usize) -> Result<GeoRollup> {
    let by_country = frame
        .clone()
        .lazy()
        .group_by([col("country")])
        .agg([col("total_revenue").sum().alias("revenue")])
        .collect()?;

    let countries = by_country.height();
    let truncated = countries > max_countries;
    let mut kept = by_country.lazy();
    if truncated {
        warn!(countries, max_countries, "geo rollup truncated to cardinality limit");
        kept = kept
            .sort_by_exprs(
                [col("revenue"), col("country")],
                SortMultipleOptions::default().with_order_descendings([true, false]),
            )
            .limit(idx(max_countries));
    }
    let kept = kept
        .sort_by_exprs([col("country")], SortMultipleOptions::default())
        .collect()?;

    let names = kept.column("country")?.str()?;
    let revenue = kept.column("revenue")?.f64()?;
    let points = names
        .into_iter()
        .zip(revenue)
        .filter_map(|(country, revenue)| {
            Some(GeoPoint {
                country: country?.to_string(),
                revenue: revenue.unwrap_or(0.0),
            })
        })
        .collect();

    Ok(GeoRollup { points, truncated })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::{frame, row};
    use crate::model::EnrichedRecord;

    #[test]
    fn test_territory_top_n_ascending() {
        let countries = ["A", "B", "C", "D", "E", "F", "G", "H", "I"];
        let rows: Vec<EnrichedRecord> = countries
            .iter()
            .enumerate()
            .map(|(i, c)| row(c, "X", (i as f64 + 1.0) * 10.0, 1.0))
            .collect();

        let top = territory_rollup(&frame(&rows), 7).unwrap();
        assert_eq!(top.len(), 7);
        let names: Vec<&str> = top.iter().map(|t| t.country.as_str()).collect();
        assert_eq!(names, vec!["C", "D", "E", "F", "G", "H", "I"]);
        assert!(top.windows(2).all(|w| w[0].revenue <= w[1].revenue));
    }

    #[test]
    fn test_territory_mean_margin() {
        let rows = vec![row("USA", "X", 100.0, 50.0), row("USA", "X", 100.0, 10.0)];
        let top = territory_rollup(&frame(&rows), 7).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].revenue, 200.0);
        assert!((top[0].mean_margin - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_territory_ties_keep_key_order() {
        let rows = vec![row("B", "X", 10.0, 1.0), row("A", "X", 10.0, 1.0), row("C", "X", 10.0, 1.0)];
        let top = territory_rollup(&frame(&rows), 2).unwrap();
        let names: Vec<&str> = top.iter().map(|t| t.country.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn test_territory_empty() {
        assert!(territory_rollup(&frame(&[]), 7).unwrap().is_empty());
    }

    #[test]
    fn test_geo_rollup_caps_countries() {
        let rows = vec![row("B", "X", 5.0, 1.0), row("A", "X", 1.0, 1.0), row("C", "X", 9.0, 1.0)];
        let all = geo_rollup(&frame(&rows), 10).unwrap();
        assert!(!all.truncated);
        assert_eq!(all.points.len(), 3);
        assert_eq!(all.points[0].country, "A");

        let capped = geo_rollup(&frame(&rows), 2).unwrap();
        assert!(capped.truncated);
        let names: Vec<&str> = capped.points.iter().map(|p| p.country.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }
}
