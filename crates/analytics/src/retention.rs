//! Period-over-period retention: comparative-period qualification and the
//! intersection of qualifying customers across both periods.
//!
//! The comparative subset is offer-wide: it reapplies the date range and
//! offer membership only, never the main period's geography or segment
//! selections. Qualification here is per customer (summed revenue), not
//! per transaction.

use crate::filter;
use chrono::{Duration, NaiveDate};
use offer_core::types::{MasterRecord, RevenueVariation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Inclusive date window of the comparative period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparativeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Default comparative window: same duration as the main period, ending
/// the day before it starts, with both endpoints clamped to the earliest
/// date available in the dataset.
pub fn default_comparative_window(
    start: NaiveDate,
    end: NaiveDate,
    min_date: NaiveDate,
) -> ComparativeWindow {
    let duration = end - start;
    ComparativeWindow {
        start: (start - duration - Duration::days(1)).max(min_date),
        end: (start - Duration::days(1)).max(min_date),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionResult {
    pub window: ComparativeWindow,
    pub comparative_revenue_total: f64,
    /// Customers whose summed comparative-period revenue met the threshold.
    pub previous_qualifying_customer_ids: BTreeSet<String>,
    /// Customers qualifying in both periods.
    pub retained_customer_ids: BTreeSet<String>,
    pub revenue_variation: RevenueVariation,
}

/// Qualify customers in the comparative window and intersect with the main
/// period's qualifying set.
pub fn analyze(
    master: &[MasterRecord],
    window: ComparativeWindow,
    offer_products: &HashSet<String>,
    comparative_min_amount: f64,
    current_revenue_total: f64,
    current_qualifying: &BTreeSet<String>,
) -> RetentionResult {
    let comparative =
        filter::filter_offer_window(master, window.start, window.end, offer_products);

    let mut per_customer: HashMap<&str, f64> = HashMap::new();
    let mut comparative_revenue_total = 0.0;
    for record in &comparative {
        *per_customer.entry(record.customer_id.as_str()).or_insert(0.0) += record.amount;
        comparative_revenue_total += record.amount;
    }

    let previous_qualifying_customer_ids: BTreeSet<String> = per_customer
        .into_iter()
        .filter(|(_, total)| *total >= comparative_min_amount)
        .map(|(id, _)| id.to_string())
        .collect();

    let retained_customer_ids: BTreeSet<String> = current_qualifying
        .intersection(&previous_qualifying_customer_ids)
        .cloned()
        .collect();

    let revenue_variation = if comparative_revenue_total == 0.0 {
        RevenueVariation::NotAvailable
    } else {
        RevenueVariation::Pct(
            (current_revenue_total - comparative_revenue_total) / comparative_revenue_total
                * 100.0,
        )
    };

    debug!(
        window_start = %window.start,
        window_end = %window.end,
        comparative_revenue_total,
        previous = previous_qualifying_customer_ids.len(),
        retained = retained_customer_ids.len(),
        variation = %revenue_variation,
        "Retention pass complete"
    );

    RetentionResult {
        window,
        comparative_revenue_total,
        previous_qualifying_customer_ids,
        retained_customer_ids,
        revenue_variation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        customer_id: &str,
        product_id: &str,
        date: &str,
        amount: f64,
        city: Option<&str>,
    ) -> MasterRecord {
        MasterRecord {
            sale_id: format!("{customer_id}-{date}"),
            customer_id: customer_id.into(),
            product_id: product_id.into(),
            store_id: None,
            date: date.parse().unwrap(),
            amount,
            product_name: None,
            category: None,
            customer_name: None,
            segment: None,
            city: city.map(Into::into),
            store_name: None,
        }
    }

    fn offer(values: &[&str]) -> HashSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn window(start: &str, end: &str) -> ComparativeWindow {
        ComparativeWindow {
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
        }
    }

    #[test]
    fn test_default_window_precedes_main_period() {
        let w = default_comparative_window(
            "2024-02-01".parse().unwrap(),
            "2024-02-10".parse().unwrap(),
            "2024-01-01".parse().unwrap(),
        );
        assert_eq!(w.end, "2024-01-31".parse().unwrap());
        assert_eq!(w.start, "2024-01-22".parse().unwrap());
    }

    #[test]
    fn test_default_window_clamps_to_earliest_date() {
        let w = default_comparative_window(
            "2024-01-03".parse().unwrap(),
            "2024-01-20".parse().unwrap(),
            "2024-01-01".parse().unwrap(),
        );
        assert_eq!(w.start, "2024-01-01".parse().unwrap());
        assert_eq!(w.end, "2024-01-02".parse().unwrap());
    }

    #[test]
    fn test_retained_is_intersection_of_both_periods() {
        // A qualifies in both periods, B only previously, C only currently.
        let master = vec![
            record("A", "P1", "2024-01-10", 35_000.0, None),
            record("B", "P1", "2024-01-12", 40_000.0, None),
            record("C", "P1", "2024-01-15", 1_000.0, None),
        ];
        let current: BTreeSet<String> = ["A", "C"].iter().map(|s| s.to_string()).collect();

        let result = analyze(
            &master,
            window("2024-01-01", "2024-01-31"),
            &offer(&["P1"]),
            30_000.0,
            100_000.0,
            &current,
        );

        assert_eq!(
            result.previous_qualifying_customer_ids,
            BTreeSet::from(["A".to_string(), "B".to_string()])
        );
        assert_eq!(
            result.retained_customer_ids,
            BTreeSet::from(["A".to_string()])
        );
        assert!(result
            .retained_customer_ids
            .is_subset(&result.previous_qualifying_customer_ids));
        assert!(result.retained_customer_ids.is_subset(&current));
    }

    #[test]
    fn test_per_customer_sum_crosses_transactions() {
        // Two 20000 purchases sum to 40000; qualifies at 30000 even though
        // no single transaction does.
        let master = vec![
            record("A", "P1", "2024-01-10", 20_000.0, None),
            record("A", "P1", "2024-01-20", 20_000.0, None),
        ];

        let result = analyze(
            &master,
            window("2024-01-01", "2024-01-31"),
            &offer(&["P1"]),
            30_000.0,
            0.0,
            &BTreeSet::new(),
        );
        assert_eq!(result.previous_qualifying_customer_ids.len(), 1);
    }

    #[test]
    fn test_geo_filters_do_not_apply_to_comparative_period() {
        let master = vec![record("A", "P1", "2024-01-10", 50_000.0, Some("Cali"))];
        let result = analyze(
            &master,
            window("2024-01-01", "2024-01-31"),
            &offer(&["P1"]),
            30_000.0,
            0.0,
            &BTreeSet::new(),
        );
        // The Cali record counts even though no city selection was made.
        assert_eq!(result.comparative_revenue_total, 50_000.0);
    }

    #[test]
    fn test_zero_comparative_revenue_reports_na() {
        let result = analyze(
            &[],
            window("2024-01-01", "2024-01-31"),
            &offer(&["P1"]),
            30_000.0,
            100_000.0,
            &BTreeSet::new(),
        );
        assert_eq!(result.revenue_variation, RevenueVariation::NotAvailable);
        assert_eq!(result.revenue_variation.to_string(), "N/A");
    }

    #[test]
    fn test_variation_carries_sign() {
        let master = vec![record("A", "P1", "2024-01-10", 50_000.0, None)];
        let grew = analyze(
            &master,
            window("2024-01-01", "2024-01-31"),
            &offer(&["P1"]),
            30_000.0,
            75_000.0,
            &BTreeSet::new(),
        );
        assert_eq!(grew.revenue_variation, RevenueVariation::Pct(50.0));
        assert_eq!(grew.revenue_variation.to_string(), "+50.0%");

        let shrank = analyze(
            &master,
            window("2024-01-01", "2024-01-31"),
            &offer(&["P1"]),
            30_000.0,
            25_000.0,
            &BTreeSet::new(),
        );
        assert_eq!(shrank.revenue_variation, RevenueVariation::Pct(-50.0));
    }
}
