use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Raw input records ──────────────────────────────────────────────────

/// One product line of a sale as it appears in the sales dataset.
/// Several lines share a `sale_id` (one transaction, many products).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub sale_id: String,
    pub customer_id: String,
    pub product_id: String,
    #[serde(default)]
    pub store_id: Option<String>,
    /// Raw date string; parsed during master-table build.
    pub date: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub customer_id: String,
    pub name: String,
    pub segment: String,
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub category: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub store_id: String,
    pub name: String,
}

// ─── Master table ───────────────────────────────────────────────────────

/// A sale line enriched with its product, customer, and store dimensions.
///
/// Built once per input snapshot by the data modeler. Rows are guaranteed
/// to carry a parsed date and non-empty sale and customer ids; a dimension
/// that had no matching row keeps `None` in its fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterRecord {
    pub sale_id: String,
    pub customer_id: String,
    pub product_id: String,
    pub store_id: Option<String>,
    pub date: NaiveDate,
    pub amount: f64,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub customer_name: Option<String>,
    pub segment: Option<String>,
    pub city: Option<String>,
    pub store_name: Option<String>,
}

// ─── Derived aggregates ─────────────────────────────────────────────────

/// All lines of one sale collapsed to transaction level. `offer_amount`
/// sums only offer-product lines (the filter layer guarantees every
/// grouped line belongs to the offer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub sale_id: String,
    pub customer_id: String,
    pub date: NaiveDate,
    pub offer_amount: f64,
    pub item_count: u64,
}

/// A (product, customer) revenue pair plus the cumulative revenue share
/// of its product among all offer products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParetoEntry {
    pub product_id: String,
    pub product_name: Option<String>,
    pub customer_id: String,
    pub customer_name: Option<String>,
    pub amount: f64,
    pub cumulative_share: f64,
}

/// Offer revenue of a single day within the analysis period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub total: f64,
}

/// Headline metrics of the filtered analysis period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodKpis {
    pub total_revenue: f64,
    pub transaction_count: u64,
    pub customer_count: u64,
    pub qualifying_customer_count: u64,
}

/// Period-over-period revenue variation. `NotAvailable` stands in when the
/// comparative total is zero; it renders as the literal string "N/A".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueVariation {
    Pct(f64),
    NotAvailable,
}

impl fmt::Display for RevenueVariation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevenueVariation::Pct(v) => write!(f, "{v:+.1}%"),
            RevenueVariation::NotAvailable => write!(f, "N/A"),
        }
    }
}
