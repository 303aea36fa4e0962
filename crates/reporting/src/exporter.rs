//! Multi-sheet report assembly.
//!
//! The workbook carries four logical tables: qualifying customers with
//! dimension context, the line detail of threshold-passing transactions,
//! the full-context Pareto detail, and (when retention analysis ran) the
//! retained-customer list. The only aggregation performed here is the
//! cumulative-share recomputation the full-context Pareto sheet needs,
//! since its grouping carries dimensions the analysis table does not.

use chrono::{DateTime, NaiveDate, Utc};
use offer_analytics::QualifierSummary;
use offer_core::types::MasterRecord;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::info;
use uuid::Uuid;

// ─── Workbook model ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ReportSheet {
    /// Render the sheet as CSV, quoting string cells.
    pub fn to_csv(&self) -> String {
        let mut csv = self.headers.join(",");
        csv.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .map(|v| match v {
                    Value::String(s) => format!("\"{}\"", s.replace('"', "\"\"")),
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect();
            csv.push_str(&cells.join(","));
            csv.push('\n');
        }
        csv
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportWorkbook {
    pub id: Uuid,
    /// Derived from the analysis date range.
    pub name: String,
    pub sheets: Vec<ReportSheet>,
    pub generated_at: DateTime<Utc>,
}

impl ReportWorkbook {
    pub fn sheet(&self, name: &str) -> Option<&ReportSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ─── Assembly ───────────────────────────────────────────────────────────

/// Assemble the export workbook for one analysis pass.
pub fn export(
    master: &[MasterRecord],
    qualifier: &QualifierSummary,
    period_records: &[MasterRecord],
    retained: Option<&BTreeSet<String>>,
    start: NaiveDate,
    end: NaiveDate,
) -> ReportWorkbook {
    let context = customer_context(master);

    let mut sheets = vec![
        qualifying_customers_sheet(qualifier, &context),
        threshold_transactions_sheet(qualifier, period_records),
        pareto_detail_sheet(period_records),
    ];
    if let Some(retained) = retained {
        sheets.push(customer_list_sheet("retained_customers", retained, &context));
    }

    let workbook = ReportWorkbook {
        id: Uuid::new_v4(),
        name: format!("offer_report_{start}_to_{end}"),
        sheets,
        generated_at: Utc::now(),
    };
    info!(
        workbook = %workbook.name,
        sheets = workbook.sheets.len(),
        "Report workbook assembled"
    );
    workbook
}

/// First-seen dimension context per customer across the master table.
fn customer_context(master: &[MasterRecord]) -> HashMap<&str, &MasterRecord> {
    let mut context: HashMap<&str, &MasterRecord> = HashMap::new();
    for record in master {
        context.entry(record.customer_id.as_str()).or_insert(record);
    }
    context
}

fn opt(value: &Option<String>) -> Value {
    value.as_deref().map_or(Value::Null, |v| json!(v))
}

fn customer_row(id: &str, context: &HashMap<&str, &MasterRecord>) -> Vec<Value> {
    match context.get(id) {
        Some(record) => vec![
            json!(id),
            opt(&record.customer_name),
            opt(&record.segment),
            opt(&record.city),
        ],
        None => vec![json!(id), Value::Null, Value::Null, Value::Null],
    }
}

fn qualifying_customers_sheet(
    qualifier: &QualifierSummary,
    context: &HashMap<&str, &MasterRecord>,
) -> ReportSheet {
    customer_list_sheet(
        "qualifying_customers",
        &qualifier.qualifying_customer_ids,
        context,
    )
}

fn customer_list_sheet(
    name: &str,
    ids: &BTreeSet<String>,
    context: &HashMap<&str, &MasterRecord>,
) -> ReportSheet {
    ReportSheet {
        name: name.to_string(),
        headers: ["customer_id", "name", "segment", "city"]
            .map(String::from)
            .to_vec(),
        rows: ids.iter().map(|id| customer_row(id, context)).collect(),
    }
}

/// Per-line detail of the transactions that passed the threshold, joined
/// back to the period records for item amounts, category, and store.
fn threshold_transactions_sheet(
    qualifier: &QualifierSummary,
    period_records: &[MasterRecord],
) -> ReportSheet {
    let qualifying_sales: HashSet<&str> = qualifier
        .qualifying
        .iter()
        .map(|t| t.sale_id.as_str())
        .collect();

    let rows = period_records
        .iter()
        .filter(|r| qualifying_sales.contains(r.sale_id.as_str()))
        .map(|r| {
            vec![
                json!(r.sale_id),
                json!(r.date.to_string()),
                json!(r.customer_id),
                json!(r.product_id),
                opt(&r.product_name),
                opt(&r.category),
                opt(&r.store_name),
                json!(r.amount),
            ]
        })
        .collect();

    ReportSheet {
        name: "threshold_transactions".to_string(),
        headers: [
            "sale_id",
            "date",
            "customer_id",
            "product_id",
            "product_name",
            "category",
            "store_name",
            "amount",
        ]
        .map(String::from)
        .to_vec(),
        rows,
    }
}

/// Full-context Pareto detail. Grouping adds segment, city, and store to
/// the (product, customer) key, so the product-level cumulative share is
/// recomputed over these groups before being copied onto each row.
fn pareto_detail_sheet(period_records: &[MasterRecord]) -> ReportSheet {
    #[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
    struct FullKey {
        product_id: String,
        customer_id: String,
        segment: Option<String>,
        city: Option<String>,
        store_id: Option<String>,
    }
    struct FullAcc {
        product_name: Option<String>,
        customer_name: Option<String>,
        store_name: Option<String>,
        amount: f64,
    }

    let mut groups: HashMap<FullKey, FullAcc> = HashMap::new();
    for record in period_records {
        let key = FullKey {
            product_id: record.product_id.clone(),
            customer_id: record.customer_id.clone(),
            segment: record.segment.clone(),
            city: record.city.clone(),
            store_id: record.store_id.clone(),
        };
        groups
            .entry(key)
            .and_modify(|acc| acc.amount += record.amount)
            .or_insert_with(|| FullAcc {
                product_name: record.product_name.clone(),
                customer_name: record.customer_name.clone(),
                store_name: record.store_name.clone(),
                amount: record.amount,
            });
    }

    let mut product_totals: HashMap<&str, f64> = HashMap::new();
    for (key, acc) in &groups {
        *product_totals.entry(key.product_id.as_str()).or_insert(0.0) += acc.amount;
    }
    let mut ranked: Vec<(&str, f64)> = product_totals.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    let grand_total: f64 = ranked.iter().map(|(_, total)| total).sum();
    let mut running = 0.0;
    let mut share_by_product: HashMap<String, f64> = HashMap::new();
    for &(product_id, total) in &ranked {
        running += total;
        let share = if grand_total > 0.0 {
            running / grand_total
        } else {
            0.0
        };
        share_by_product.insert(product_id.to_string(), share);
    }

    let mut entries: Vec<(FullKey, FullAcc)> = groups.into_iter().collect();
    entries.sort_by(|a, b| {
        b.1.amount
            .partial_cmp(&a.1.amount)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let rows = entries
        .into_iter()
        .map(|(key, acc)| {
            let share = share_by_product
                .get(key.product_id.as_str())
                .copied()
                .unwrap_or(0.0);
            vec![
                json!(key.product_id),
                opt(&acc.product_name),
                json!(key.customer_id),
                opt(&acc.customer_name),
                opt(&key.segment),
                opt(&key.city),
                opt(&key.store_id),
                opt(&acc.store_name),
                json!(acc.amount),
                json!(share),
            ]
        })
        .collect();

    ReportSheet {
        name: "pareto_detail".to_string(),
        headers: [
            "product_id",
            "product_name",
            "customer_id",
            "customer_name",
            "segment",
            "city",
            "store_id",
            "store_name",
            "amount",
            "cumulative_share",
        ]
        .map(String::from)
        .to_vec(),
        rows,
    }
}
