//! Pareto (80/20) revenue-concentration analysis.
//!
//! Cumulative share is a property of the product: the running sum of
//! product totals in descending revenue order over the grand total, copied
//! onto every detail row of that product. Equal totals are ordered by
//! ascending product id (detail rows additionally by ascending customer
//! id) so the share sequence is deterministic.

use offer_core::types::{MasterRecord, ParetoEntry};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Product-level revenue total with its cumulative share of the grand
/// total, in descending revenue order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParetoProduct {
    pub product_id: String,
    pub product_name: Option<String>,
    pub total: f64,
    pub cumulative_share: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParetoAnalysis {
    /// (product, customer) revenue pairs, descending by amount.
    pub detail: Vec<ParetoEntry>,
    /// Product totals, descending, carrying the cumulative share.
    pub products: Vec<ParetoProduct>,
}

impl ParetoAnalysis {
    /// Detail rows whose product lies within the cumulative band. The
    /// boundary is inclusive: a product sitting exactly on the cutoff
    /// stays in the subset.
    pub fn cutoff_detail(&self, cutoff: f64) -> Vec<ParetoEntry> {
        self.detail
            .iter()
            .filter(|entry| entry.cumulative_share <= cutoff)
            .cloned()
            .collect()
    }
}

/// Rank the period's products by revenue and compute per-product
/// cumulative shares plus the (product, customer) detail.
pub fn analyze(period_records: &[MasterRecord]) -> ParetoAnalysis {
    struct DetailAcc {
        product_name: Option<String>,
        customer_name: Option<String>,
        amount: f64,
    }

    let mut detail_groups: HashMap<(String, String), DetailAcc> = HashMap::new();
    let mut product_groups: HashMap<String, (Option<String>, f64)> = HashMap::new();

    for record in period_records {
        let key = (record.product_id.clone(), record.customer_id.clone());
        detail_groups
            .entry(key)
            .and_modify(|acc| acc.amount += record.amount)
            .or_insert_with(|| DetailAcc {
                product_name: record.product_name.clone(),
                customer_name: record.customer_name.clone(),
                amount: record.amount,
            });

        let product = product_groups
            .entry(record.product_id.clone())
            .or_insert_with(|| (record.product_name.clone(), 0.0));
        product.1 += record.amount;
    }

    let mut products: Vec<ParetoProduct> = product_groups
        .into_iter()
        .map(|(product_id, (product_name, total))| ParetoProduct {
            product_id,
            product_name,
            total,
            cumulative_share: 0.0,
        })
        .collect();
    products.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });

    let grand_total: f64 = products.iter().map(|p| p.total).sum();
    let mut running = 0.0;
    for product in &mut products {
        running += product.total;
        // A grand total of zero would divide to NaN; report zero shares.
        product.cumulative_share = if grand_total > 0.0 {
            running / grand_total
        } else {
            0.0
        };
    }

    let share_by_product: HashMap<&str, f64> = products
        .iter()
        .map(|p| (p.product_id.as_str(), p.cumulative_share))
        .collect();

    let mut detail: Vec<ParetoEntry> = detail_groups
        .into_iter()
        .map(|((product_id, customer_id), acc)| {
            let cumulative_share = share_by_product
                .get(product_id.as_str())
                .copied()
                .unwrap_or(0.0);
            ParetoEntry {
                product_id,
                product_name: acc.product_name,
                customer_id,
                customer_name: acc.customer_name,
                amount: acc.amount,
                cumulative_share,
            }
        })
        .collect();
    detail.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.product_id.cmp(&b.product_id))
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });

    ParetoAnalysis { detail, products }
}
