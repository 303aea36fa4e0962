//! Master-table construction: date normalization and the left-join
//! pipeline over the dimension datasets.
//!
//! Joins are many-to-one (one sale line maps to at most one row per
//! dimension) and left-preserving: the built table has exactly one row per
//! surviving sale line, whether or not its dimensions matched. Rows
//! without a parseable date, sale id, or customer id are dropped here.

use crate::loader::RawTables;
use chrono::{NaiveDate, NaiveDateTime};
use offer_core::types::{Customer, MasterRecord, Product, Store};
use std::collections::HashMap;
use tracing::info;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a raw date cell at day granularity. Time-of-day components are
/// accepted and discarded. Returns `None` for anything unparseable.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Build the denormalized master table from the raw datasets.
pub fn build_master(tables: &RawTables) -> Vec<MasterRecord> {
    let products: HashMap<&str, &Product> = tables
        .products
        .iter()
        .map(|p| (p.product_id.trim(), p))
        .collect();
    let customers: HashMap<&str, &Customer> = tables
        .customers
        .iter()
        .map(|c| (c.customer_id.trim(), c))
        .collect();
    let stores: HashMap<&str, &Store> = tables
        .stores
        .iter()
        .map(|s| (s.store_id.trim(), s))
        .collect();

    let mut master = Vec::with_capacity(tables.sales.len());
    let mut dropped = 0usize;

    for sale in &tables.sales {
        let Some(date) = parse_date(&sale.date) else {
            dropped += 1;
            continue;
        };
        let sale_id = sale.sale_id.trim();
        let customer_id = sale.customer_id.trim();
        if sale_id.is_empty() || customer_id.is_empty() {
            dropped += 1;
            continue;
        }

        let product = products.get(sale.product_id.trim()).copied();
        let customer = customers.get(customer_id).copied();
        let store = sale
            .store_id
            .as_deref()
            .and_then(|id| stores.get(id.trim()))
            .copied();

        master.push(MasterRecord {
            sale_id: sale_id.to_string(),
            customer_id: customer_id.to_string(),
            product_id: sale.product_id.trim().to_string(),
            store_id: sale.store_id.as_deref().map(|id| id.trim().to_string()),
            date,
            amount: sale.amount,
            product_name: product.map(|p| p.name.clone()),
            category: product.map(|p| p.category.clone()),
            customer_name: customer.map(|c| c.name.clone()),
            segment: customer.map(|c| c.segment.clone()),
            city: customer.map(|c| c.city.clone()),
            store_name: store.map(|s| s.name.clone()),
        });
    }

    info!(rows = master.len(), dropped, "Master table built");
    master
}

/// Earliest and latest dates present in the master table. The shell bounds
/// its date pickers with this; the comparative window is clamped to the
/// lower bound.
pub fn date_bounds(master: &[MasterRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let mut iter = master.iter();
    let first = iter.next()?.date;
    let (min, max) = iter.fold((first, first), |(min, max), record| {
        (min.min(record.date), max.max(record.date))
    });
    Some((min, max))
}
