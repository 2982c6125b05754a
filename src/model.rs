//! Row types flowing through the pipeline

use chrono::{Datelike, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;

/// One order transaction as loaded, numerics already coerced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub product_id: String,
    pub shipping_fee: f64,
    pub quantity: f64,
    pub selling_price: f64,
    pub order_date: Option<NaiveDateTime>,
    pub customer_location: String,
    pub age_group: Option<String>,
}

/// One catalog entry, unique by `product_id` after loading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub product_id: String,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub sub_collection: Option<String>,
    pub unit_cost: f64,
}

/// Year-month key used by the time trend. Orders chronologically and
/// renders as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
}

impl MonthBucket {
    pub fn of(date: &NaiveDateTime) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An order joined with its product and carrying every derived metric.
///
/// Built once by the metric deriver and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub product_id: String,
    pub product_name: Option<String>,
    pub category: String,
    pub sub_collection: String,
    pub unit_cost: f64,
    pub shipping_fee: f64,
    pub quantity: f64,
    pub selling_price: f64,
    pub order_date: Option<NaiveDateTime>,
    pub customer_location: String,
    pub age_group: Option<String>,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    pub margin_percent: f64,
    pub month_period: Option<MonthBucket>,
    pub country: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_month_bucket_format_and_order() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let dec = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();

        let jan_bucket = MonthBucket::of(&jan);
        assert_eq!(jan_bucket.to_string(), "2024-01");
        assert!(MonthBucket::of(&dec) < jan_bucket);
        assert_eq!(serde_json::to_string(&jan_bucket).unwrap(), "\"2024-01\"");
    }
}
