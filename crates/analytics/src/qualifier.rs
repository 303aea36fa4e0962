//! Transaction-level qualification against the minimum-spend threshold.

use chrono::NaiveDate;
use offer_core::types::{MasterRecord, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Outcome of qualifying one filtered period.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualifierSummary {
    /// Every transaction of the period, sorted by sale id.
    pub transactions: Vec<Transaction>,
    /// Transactions whose offer amount met the threshold.
    pub qualifying: Vec<Transaction>,
    /// Distinct customers behind the qualifying transactions.
    pub qualifying_customer_ids: BTreeSet<String>,
}

/// Group the period's records by sale id and flag the transactions whose
/// summed offer amount meets `min_amount` (inclusive). The records are
/// already offer-scoped by the filter layer, so the per-group sum is the
/// offer amount of that transaction.
pub fn analyze(period_records: &[MasterRecord], min_amount: f64) -> QualifierSummary {
    struct Acc {
        customer_id: String,
        date: NaiveDate,
        amount: f64,
        items: u64,
    }

    let mut groups: HashMap<&str, Acc> = HashMap::new();
    for record in period_records {
        groups
            .entry(record.sale_id.as_str())
            .and_modify(|acc| {
                acc.amount += record.amount;
                acc.items += 1;
            })
            .or_insert_with(|| Acc {
                customer_id: record.customer_id.clone(),
                date: record.date,
                amount: record.amount,
                items: 1,
            });
    }

    let mut transactions: Vec<Transaction> = groups
        .into_iter()
        .map(|(sale_id, acc)| Transaction {
            sale_id: sale_id.to_string(),
            customer_id: acc.customer_id,
            date: acc.date,
            offer_amount: acc.amount,
            item_count: acc.items,
        })
        .collect();
    transactions.sort_by(|a, b| a.sale_id.cmp(&b.sale_id));

    let qualifying: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.offer_amount >= min_amount)
        .cloned()
        .collect();

    let qualifying_customer_ids: BTreeSet<String> = qualifying
        .iter()
        .map(|t| t.customer_id.clone())
        .collect();

    debug!(
        transactions = transactions.len(),
        qualifying = qualifying.len(),
        customers = qualifying_customer_ids.len(),
        min_amount,
        "Qualification pass complete"
    );

    QualifierSummary {
        transactions,
        qualifying,
        qualifying_customer_ids,
    }
}
