//! Daily revenue series of the filtered period, feeding the shell's
//! time-series chart.

use offer_core::types::{DailyRevenue, MasterRecord};
use std::collections::BTreeMap;

/// Sum offer revenue per day, ascending by date.
pub fn daily_revenue(period_records: &[MasterRecord]) -> Vec<DailyRevenue> {
    let mut by_day: BTreeMap<chrono::NaiveDate, f64> = BTreeMap::new();
    for record in period_records {
        *by_day.entry(record.date).or_insert(0.0) += record.amount;
    }
    by_day
        .into_iter()
        .map(|(date, total)| DailyRevenue { date, total })
        .collect()
}
