//! Integration test for the full model → analyze → export flow.

use offer_analytics::ComparativeWindow;
use offer_core::config::AnalysisConfig;
use offer_core::types::{Customer, Product, RevenueVariation, SaleLine, Store};
use offer_model::loader::RawTables;
use offer_model::MasterTableCache;
use offer_reporting::{compute_report, ReportOutcome, ReportParams};
use std::sync::Arc;

fn sale(sale_id: &str, customer_id: &str, product_id: &str, date: &str, amount: f64) -> SaleLine {
    SaleLine {
        sale_id: sale_id.into(),
        customer_id: customer_id.into(),
        product_id: product_id.into(),
        store_id: Some("S1".into()),
        date: date.into(),
        amount,
    }
}

fn raw_tables(sales: Vec<SaleLine>, digest: &str) -> RawTables {
    RawTables {
        sales,
        customers: vec![
            Customer {
                customer_id: "A".into(),
                name: "Ada".into(),
                segment: "Premium".into(),
                city: "Bogota".into(),
            },
            Customer {
                customer_id: "B".into(),
                name: "Bo".into(),
                segment: "Standard".into(),
                city: "Cali".into(),
            },
        ],
        products: vec![
            Product {
                product_id: "P1".into(),
                category: "Snacks".into(),
                name: "Chips".into(),
            },
            Product {
                product_id: "P2".into(),
                category: "Drinks".into(),
                name: "Soda".into(),
            },
        ],
        stores: vec![Store {
            store_id: "S1".into(),
            name: "Centro".into(),
        }],
        digest: digest.into(),
    }
}

fn base_params() -> ReportParams {
    ReportParams {
        start: "2024-01-01".parse().unwrap(),
        end: "2024-01-31".parse().unwrap(),
        offer_product_ids: vec!["P1".into(), "P2".into()],
        cities: None,
        segments: None,
        min_amount: 55_000.0,
        comparative_enabled: false,
        comparative_window: None,
        comparative_min_amount: 30_000.0,
    }
}

#[test]
fn test_multi_line_sale_qualifies_end_to_end() {
    // One transaction of two offer lines totaling 60000 against a 55000
    // threshold: it qualifies and customer A is the only qualifier.
    let tables = raw_tables(
        vec![
            sale("1", "A", "P1", "2024-01-05", 40_000.0),
            sale("1", "A", "P2", "2024-01-05", 20_000.0),
        ],
        "flow-1",
    );
    let cache = MasterTableCache::new();
    let master = cache.get_or_build(&tables);

    let outcome = compute_report(&master, &base_params(), &AnalysisConfig::default()).unwrap();
    let ReportOutcome::Report(bundle) = outcome else {
        panic!("expected a report");
    };

    assert_eq!(bundle.qualifier.transactions.len(), 1);
    assert_eq!(bundle.qualifier.transactions[0].offer_amount, 60_000.0);
    assert_eq!(bundle.qualifier.qualifying.len(), 1);
    assert_eq!(
        bundle.qualifier.qualifying_customer_ids,
        ["A".to_string()].into_iter().collect()
    );

    let sheet = bundle.workbook.sheet("qualifying_customers").unwrap();
    assert_eq!(sheet.rows.len(), 1);
    assert_eq!(sheet.rows[0][1], serde_json::json!("Ada"));
}

#[test]
fn test_zero_comparative_revenue_reports_na() {
    // Current period sells 100000; the comparative window has no offer
    // sales at all. The variation is the sentinel, never a number.
    let tables = raw_tables(
        vec![sale("1", "A", "P1", "2024-02-10", 100_000.0)],
        "flow-2",
    );
    let cache = MasterTableCache::new();
    let master = cache.get_or_build(&tables);

    let mut params = base_params();
    params.start = "2024-02-01".parse().unwrap();
    params.end = "2024-02-28".parse().unwrap();
    params.comparative_enabled = true;
    params.comparative_window = Some(ComparativeWindow {
        start: "2024-01-01".parse().unwrap(),
        end: "2024-01-31".parse().unwrap(),
    });

    let outcome = compute_report(&master, &params, &AnalysisConfig::default()).unwrap();
    let ReportOutcome::Report(bundle) = outcome else {
        panic!("expected a report");
    };

    let retention = bundle.retention.as_ref().unwrap();
    assert_eq!(retention.comparative_revenue_total, 0.0);
    assert_eq!(retention.revenue_variation, RevenueVariation::NotAvailable);
    assert_eq!(retention.revenue_variation.to_string(), "N/A");
    assert!(retention.retained_customer_ids.is_empty());
}

#[test]
fn test_pareto_cutoff_keeps_only_the_leading_product() {
    // Product totals 800 and 200: cumulative shares 0.8 and 1.0. The
    // inclusive cutoff keeps every detail row of the first product only.
    let tables = raw_tables(
        vec![
            sale("1", "A", "P1", "2024-01-05", 500.0),
            sale("2", "B", "P1", "2024-01-06", 300.0),
            sale("3", "A", "P2", "2024-01-07", 200.0),
        ],
        "flow-3",
    );
    let cache = MasterTableCache::new();
    let master = cache.get_or_build(&tables);

    let mut params = base_params();
    params.min_amount = 100.0;

    let outcome = compute_report(&master, &params, &AnalysisConfig::default()).unwrap();
    let ReportOutcome::Report(bundle) = outcome else {
        panic!("expected a report");
    };

    assert!((bundle.pareto.products[0].cumulative_share - 0.8).abs() < 1e-9);
    assert!((bundle.pareto.products[1].cumulative_share - 1.0).abs() < 1e-9);
    assert_eq!(bundle.pareto_display.len(), 2);
    assert!(bundle.pareto_display.iter().all(|e| e.product_id == "P1"));
}

#[test]
fn test_empty_offer_selection_short_circuits() {
    let tables = raw_tables(vec![sale("1", "A", "P1", "2024-01-05", 100.0)], "flow-4");
    let cache = MasterTableCache::new();
    let master = cache.get_or_build(&tables);

    let mut params = base_params();
    params.offer_product_ids.clear();

    let outcome = compute_report(&master, &params, &AnalysisConfig::default()).unwrap();
    assert!(matches!(outcome, ReportOutcome::NoOfferSelected));
}

#[test]
fn test_master_table_is_reused_across_passes() {
    let tables = raw_tables(vec![sale("1", "A", "P1", "2024-01-05", 100.0)], "flow-5");
    let cache = MasterTableCache::new();

    let first = cache.get_or_build(&tables);
    let second = cache.get_or_build(&tables);
    assert!(Arc::ptr_eq(&first, &second));

    cache.invalidate();
    let rebuilt = cache.get_or_build(&tables);
    assert!(!Arc::ptr_eq(&first, &rebuilt));
}
