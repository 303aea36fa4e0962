//! Period filtering over the master table.

use chrono::NaiveDate;
use offer_core::types::MasterRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Conjunctive filter of the main analysis period: date within the
/// inclusive range (day granularity), product id in the offer set, city
/// and segment in their selections. A record missing a dimension value
/// never satisfies that membership predicate.
///
/// Pure and order-preserving; callers with an empty offer selection must
/// short-circuit before reaching this point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodFilter {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub offer_products: HashSet<String>,
    pub cities: HashSet<String>,
    pub segments: HashSet<String>,
}

impl PeriodFilter {
    pub fn apply(&self, master: &[MasterRecord]) -> Vec<MasterRecord> {
        master
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }

    fn matches(&self, record: &MasterRecord) -> bool {
        record.date >= self.start
            && record.date <= self.end
            && self.offer_products.contains(record.product_id.trim())
            && member(record.city.as_deref(), &self.cities)
            && member(record.segment.as_deref(), &self.segments)
    }
}

/// Offer-wide subset used by the comparative period: date range and offer
/// membership only. The main period's geography and segment selections do
/// not apply here.
pub fn filter_offer_window(
    master: &[MasterRecord],
    start: NaiveDate,
    end: NaiveDate,
    offer_products: &HashSet<String>,
) -> Vec<MasterRecord> {
    master
        .iter()
        .filter(|record| {
            record.date >= start
                && record.date <= end
                && offer_products.contains(record.product_id.trim())
        })
        .cloned()
        .collect()
}

/// Normalize a product id for offer-membership comparison.
pub fn normalize_id(raw: &str) -> String {
    raw.trim().to_string()
}

fn member(value: Option<&str>, selection: &HashSet<String>) -> bool {
    value.is_some_and(|v| selection.contains(v))
}
