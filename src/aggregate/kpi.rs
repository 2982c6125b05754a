use crate::model::EnrichedRecord;
use serde::Serialize;

/// Headline scalars for the KPI cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_revenue: f64,
    pub total_profit: f64,
    pub margin_percent: f64,
    pub order_count: usize,
}

/// Totals over every row, including rows with no date or no matched
/// product.
pub fn kpi_summary(rows: &[&EnrichedRecord]) -> KpiSummary {
    let total_revenue: f64 = rows.iter().map(|r| r.total_revenue).sum();
    let total_profit: f64 = rows.iter().map(|r| r.total_profit).sum();

    // Unlike the per-row margin, any non-zero revenue (negative included) divides.
    let ratio = total_profit / total_revenue * 100.0;
    let margin_percent = if total_revenue != 0.0 && ratio.is_finite() {
        ratio
    } else {
        0.0
    };

    KpiSummary {
        total_revenue,
        total_profit,
        margin_percent,
        order_count: rows.len(),
    }
}
