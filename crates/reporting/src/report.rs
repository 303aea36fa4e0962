//! The report computation pass.
//!
//! `compute_report` is the composition root of the analytics layer: one
//! synchronous, run-to-completion pass per parameter change, with no
//! caching beyond the master-table build it receives. The presentation
//! shell calls it on every parameter change and renders the returned
//! bundle however it likes.

use crate::exporter::{self, ReportWorkbook};
use chrono::NaiveDate;
use offer_analytics::{
    filter, pareto, qualifier, retention, trend, ComparativeWindow, ParetoAnalysis, PeriodFilter,
    QualifierSummary, RetentionResult,
};
use offer_core::config::AnalysisConfig;
use offer_core::error::{OfferError, OfferResult};
use offer_core::types::{DailyRevenue, MasterRecord, ParetoEntry, PeriodKpis};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// Analysis parameters as supplied by the presentation shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportParams {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Offer membership; empty means no analysis can run.
    pub offer_product_ids: Vec<String>,
    /// City selection; `None` selects every city present in the data.
    pub cities: Option<Vec<String>>,
    /// Segment selection; `None` selects every segment present in the data.
    pub segments: Option<Vec<String>>,
    pub min_amount: f64,
    pub comparative_enabled: bool,
    /// Explicit comparative window; `None` derives the default window
    /// (same duration, ending the day before the main period).
    pub comparative_window: Option<ComparativeWindow>,
    pub comparative_min_amount: f64,
}

/// Everything one analysis pass produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportBundle {
    /// Analysis range after clamping to the dataset's date bounds.
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub kpis: PeriodKpis,
    pub qualifier: QualifierSummary,
    pub retention: Option<RetentionResult>,
    pub daily_trend: Vec<DailyRevenue>,
    pub pareto: ParetoAnalysis,
    /// Cutoff subset truncated for the on-screen table.
    pub pareto_display: Vec<ParetoEntry>,
    pub workbook: ReportWorkbook,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportOutcome {
    /// Empty offer selection: a valid state in which every analysis
    /// component is skipped and the shell tells the user nothing ran.
    NoOfferSelected,
    Report(Box<ReportBundle>),
}

/// Run one full analysis pass over the master table.
pub fn compute_report(
    master: &[MasterRecord],
    params: &ReportParams,
    config: &AnalysisConfig,
) -> OfferResult<ReportOutcome> {
    let offer_products: HashSet<String> = params
        .offer_product_ids
        .iter()
        .map(|id| filter::normalize_id(id))
        .filter(|id| !id.is_empty())
        .collect();
    if offer_products.is_empty() {
        info!("No offer products selected; skipping analysis");
        return Ok(ReportOutcome::NoOfferSelected);
    }

    if params.start > params.end {
        return Err(OfferError::InvalidParams(format!(
            "analysis range starts after it ends ({} > {})",
            params.start, params.end
        )));
    }
    if let Some(window) = &params.comparative_window {
        if window.start > window.end {
            return Err(OfferError::InvalidParams(format!(
                "comparative range starts after it ends ({} > {})",
                window.start, window.end
            )));
        }
    }

    let bounds = offer_model::date_bounds(master);
    let (start, end) = match bounds {
        Some((min_date, max_date)) => (
            params.start.clamp(min_date, max_date),
            params.end.clamp(min_date, max_date),
        ),
        None => (params.start, params.end),
    };

    let cities = params
        .cities
        .clone()
        .unwrap_or_else(|| distinct_values(master, |r| r.city.as_deref()));
    let segments = params
        .segments
        .clone()
        .unwrap_or_else(|| distinct_values(master, |r| r.segment.as_deref()));

    let period_filter = PeriodFilter {
        start,
        end,
        offer_products: offer_products.clone(),
        cities: cities.into_iter().collect(),
        segments: segments.into_iter().collect(),
    };
    let period_records = period_filter.apply(master);

    let qualifier = qualifier::analyze(&period_records, params.min_amount);
    let kpis = compute_kpis(&period_records, &qualifier);

    let retention = if params.comparative_enabled {
        let min_date = bounds.map_or(NaiveDate::MIN, |(min, _)| min);
        let window = params
            .comparative_window
            .unwrap_or_else(|| retention::default_comparative_window(start, end, min_date));
        Some(retention::analyze(
            master,
            window,
            &offer_products,
            params.comparative_min_amount,
            kpis.total_revenue,
            &qualifier.qualifying_customer_ids,
        ))
    } else {
        None
    };

    let pareto = pareto::analyze(&period_records);
    let pareto_display: Vec<ParetoEntry> = pareto
        .cutoff_detail(config.pareto_cutoff)
        .into_iter()
        .take(config.display_rows)
        .collect();
    let daily_trend = trend::daily_revenue(&period_records);

    let workbook = exporter::export(
        master,
        &qualifier,
        &period_records,
        retention.as_ref().map(|r| &r.retained_customer_ids),
        start,
        end,
    );

    info!(
        period_rows = period_records.len(),
        total_revenue = kpis.total_revenue,
        qualifying_customers = kpis.qualifying_customer_count,
        retained = retention
            .as_ref()
            .map(|r| r.retained_customer_ids.len())
            .unwrap_or(0),
        "Report computed"
    );

    Ok(ReportOutcome::Report(Box::new(ReportBundle {
        start,
        end,
        kpis,
        qualifier,
        retention,
        daily_trend,
        pareto,
        pareto_display,
        workbook,
    })))
}

fn compute_kpis(period_records: &[MasterRecord], qualifier: &QualifierSummary) -> PeriodKpis {
    let customers: HashSet<&str> = period_records
        .iter()
        .map(|r| r.customer_id.as_str())
        .collect();

    PeriodKpis {
        total_revenue: period_records.iter().map(|r| r.amount).sum(),
        transaction_count: qualifier.transactions.len() as u64,
        customer_count: customers.len() as u64,
        qualifying_customer_count: qualifier.qualifying_customer_ids.len() as u64,
    }
}

fn distinct_values<F>(master: &[MasterRecord], get: F) -> Vec<String>
where
    F: Fn(&MasterRecord) -> Option<&str>,
{
    let mut values: Vec<String> = master
        .iter()
        .filter_map(|r| get(r).map(str::to_string))
        .collect();
    values.sort();
    values.dedup();
    values
}
