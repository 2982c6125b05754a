//! Metric derivation
//!
//! Pure per-row transform from a joined row to an [`EnrichedRecord`]. No
//! state crosses rows, so the order of evaluation does not matter.

use crate::config::FallbackLabels;
use crate::join::JoinedRow;
use crate::model::{EnrichedRecord, MonthBucket};

/// `100 * profit / revenue` for positive revenue, otherwise `0`.
///
/// Zero and negative revenue both yield `0`, as does any ratio that
/// overflows to a non-finite value. The result is never NaN.
pub fn margin_percent(total_profit: f64, total_revenue: f64) -> f64 {
    if total_revenue > 0.0 && total_revenue.is_finite() {
        let margin = total_profit / total_revenue * 100.0;
        if margin.is_finite() {
            return margin;
        }
    }
    0.0
}

/// Last comma-separated segment of a location, trimmed. Locations without
/// a comma are returned whole.
pub fn extract_country(location: &str) -> &str {
    match location.rsplit_once(',') {
        Some((_, country)) => country.trim(),
        None => location,
    }
}

pub fn derive_row(row: &JoinedRow<'_>, fallbacks: &FallbackLabels) -> EnrichedRecord {
    let order = row.order;
    let product = row.product;

    let unit_cost = product.map(|p| p.unit_cost).unwrap_or(0.0);
    let total_revenue = order.selling_price * order.quantity + order.shipping_fee;
    let total_cost = unit_cost * order.quantity;
    let total_profit = total_revenue - total_cost;

    EnrichedRecord {
        product_id: order.product_id.clone(),
        product_name: product.and_then(|p| p.product_name.clone()),
        category: product
            .and_then(|p| p.category.clone())
            .unwrap_or_else(|| fallbacks.category.clone()),
        sub_collection: product
            .and_then(|p| p.sub_collection.clone())
            .unwrap_or_else(|| fallbacks.sub_collection.clone()),
        unit_cost,
        shipping_fee: order.shipping_fee,
        quantity: order.quantity,
        selling_price: order.selling_price,
        order_date: order.order_date,
        customer_location: order.customer_location.clone(),
        age_group: order.age_group.clone(),
        total_revenue,
        total_cost,
        total_profit,
        margin_percent: margin_percent(total_profit, total_revenue),
        month_period: order.order_date.as_ref().map(MonthBucket::of),
        country: extract_country(&order.customer_location).to_string(),
    }
}

pub fn derive_all(rows: &[JoinedRow<'_>], fallbacks: &FallbackLabels) -> Vec<EnrichedRecord> {
    rows.iter().map(|row| derive_row(row, fallbacks)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::parse_datetime;
    use crate::model::{OrderRecord, ProductRecord};

    fn order(qty: f64, price: f64, ship: f64, date: &str, location: &str) -> OrderRecord {
        OrderRecord {
            product_id: "P1".to_string(),
            shipping_fee: ship,
            quantity: qty,
            selling_price: price,
            order_date: parse_datetime(date),
            customer_location: location.to_string(),
            age_group: Some("25-34".to_string()),
        }
    }

    fn product(cost: f64, category: Option<&str>) -> ProductRecord {
        ProductRecord {
            product_id: "P1".to_string(),
            product_name: Some("Ring".to_string()),
            category: category.map(str::to_string),
            sub_collection: None,
            unit_cost: cost,
        }
    }

    #[test]
    fn test_reference_row() {
        let o = order(2.0, 10.0, 5.0, "2024-01-15", "Austin, USA");
        let p = product(3.0, None);
        let row = JoinedRow { order: &o, product: Some(&p) };

        let enriched = derive_row(&row, &FallbackLabels::default());
        assert!((enriched.total_revenue - 25.0).abs() < 1e-9);
        assert!((enriched.total_cost - 6.0).abs() < 1e-9);
        assert!((enriched.total_profit - 19.0).abs() < 1e-9);
        assert!((enriched.margin_percent - 76.0).abs() < 1e-9);
        assert_eq!(enriched.category, "Other");
        assert_eq!(enriched.sub_collection, "General");
        assert_eq!(enriched.month_period.map(|m| m.to_string()).as_deref(), Some("2024-01"));
        assert_eq!(enriched.country, "USA");
    }

    #[test]
    fn test_zero_revenue_has_zero_margin() {
        let o = order(0.0, 0.0, 0.0, "2024-01-15", "USA");
        let p = product(3.0, Some("Jewelry"));
        let enriched = derive_row(&JoinedRow { order: &o, product: Some(&p) }, &FallbackLabels::default());
        assert_eq!(enriched.total_revenue, 0.0);
        assert_eq!(enriched.margin_percent, 0.0);
        assert!(!enriched.margin_percent.is_nan());
    }

    #[test]
    fn test_negative_revenue_has_zero_margin() {
        let o = order(1.0, -50.0, 0.0, "2024-01-15", "USA");
        let enriched = derive_row(&JoinedRow { order: &o, product: None }, &FallbackLabels::default());
        assert_eq!(enriched.total_revenue, -50.0);
        assert_eq!(enriched.margin_percent, 0.0);
    }

    #[test]
    fn test_overflowing_revenue_has_zero_margin() {
        let o = order(1e200, 1e200, 0.0, "2024-01-15", "USA");
        let p = product(1e200, Some("Jewelry"));
        let enriched = derive_row(&JoinedRow { order: &o, product: Some(&p) }, &FallbackLabels::default());
        assert!(enriched.total_revenue.is_infinite());
        assert!(!enriched.margin_percent.is_nan());
        assert_eq!(enriched.margin_percent, 0.0);

        assert_eq!(margin_percent(f64::MAX, f64::MIN_POSITIVE), 0.0);
        assert_eq!(margin_percent(f64::NAN, 10.0), 0.0);
    }

    #[test]
    fn test_unmatched_row_uses_fallbacks() {
        let o = order(3.0, 4.0, 1.0, "garbage", "Lyon, France");
        let enriched = derive_row(&JoinedRow { order: &o, product: None }, &FallbackLabels::default());
        assert!(enriched.product_name.is_none());
        assert_eq!(enriched.category, "Other");
        assert_eq!(enriched.sub_collection, "General");
        assert_eq!(enriched.unit_cost, 0.0);
        assert_eq!(enriched.total_cost, 0.0);
        assert!((enriched.margin_percent - 100.0).abs() < 1e-9);
        assert!(enriched.order_date.is_none());
        assert!(enriched.month_period.is_none());
    }

    #[test]
    fn test_extract_country() {
        assert_eq!(extract_country("Austin, Texas, USA"), "USA");
        assert_eq!(extract_country("Berlin,Germany "), "Germany");
        assert_eq!(extract_country("Japan"), "Japan");
        assert_eq!(extract_country("Paris,"), "");
        assert_eq!(extract_country(""), "");
    }
}
