use crate::model::EnrichedRecord;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;

/// Row of the recent-transactions table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionLogEntry {
    pub date: Option<NaiveDateTime>,
    pub product_name: Option<String>,
    pub category: String,
    pub country: String,
    pub selling_price: f64,
    pub quantity: f64,
    pub total_revenue: f64,
    pub margin_percent: f64,
}

impl From<&EnrichedRecord> for TransactionLogEntry {
    fn from(record: &EnrichedRecord) -> Self {
        Self {
            date: record.order_date,
            product_name: record.product_name.clone(),
            category: record.category.clone(),
            country: record.country.clone(),
            selling_price: record.selling_price,
            quantity: record.quantity,
            total_revenue: record.total_revenue,
            margin_percent: record.margin_percent,
        }
    }
}

/// Newest first, undated last.
fn newest_first(a: &Option<NaiveDateTime>, b: &Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The `limit` most recent transactions. Equal dates keep source order.
pub fn transaction_log(rows: &[&EnrichedRecord], limit: usize) -> Vec<TransactionLogEntry> {
    let mut sorted: Vec<&EnrichedRecord> = rows.to_vec();
    sorted.sort_by(|a, b| newest_first(&a.order_date, &b.order_date));
    sorted.into_iter().take(limit).map(TransactionLogEntry::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::{dated, refs, row};

    #[test]
    fn test_log_sorted_newest_first_nulls_last() {
        let rows = vec![
            dated(row("A", "X", 1.0, 0.0), "2024-01-01"),
            dated(row("B", "X", 2.0, 0.0), "bad"),
            dated(row("C", "X", 3.0, 0.0), "2024-05-01"),
            dated(row("D", "X", 4.0, 0.0), "2024-03-01"),
        ];
        let log = transaction_log(&refs(&rows), 100);
        let countries: Vec<&str> = log.iter().map(|e| e.country.as_str()).collect();
        assert_eq!(countries, vec!["C", "D", "A", "B"]);
        assert!(log[3].date.is_none());
    }

    #[test]
    fn test_log_limit_applies_after_sort() {
        let rows: Vec<EnrichedRecord> = (1..=5)
            .map(|day| dated(row(&day.to_string(), "X", 1.0, 0.0), &format!("2024-01-0{}", day)))
            .collect();
        let log = transaction_log(&refs(&rows), 2);
        let countries: Vec<&str> = log.iter().map(|e| e.country.as_str()).collect();
        assert_eq!(countries, vec!["5", "4"]);
    }

    #[test]
    fn test_log_ties_keep_source_order() {
        let rows = vec![
            dated(row("first", "X", 1.0, 0.0), "2024-01-01"),
            dated(row("second", "X", 1.0, 0.0), "2024-01-01"),
        ];
        let log = transaction_log(&refs(&rows), 10);
        assert_eq!(log[0].country, "first");
        assert_eq!(log[1].country, "second");
    }

    #[test]
    fn test_log_empty() {
        assert!(transaction_log(&[], 100).is_empty());
    }
}
