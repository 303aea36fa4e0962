//! Offer Insight: offer diagnostics and customer-retention reporting.
//!
//! Loads the four input datasets, runs one analysis pass, logs the
//! headline metrics, and writes the export workbook to disk.

use chrono::NaiveDate;
use clap::Parser;
use offer_analytics::ComparativeWindow;
use offer_core::config::AppConfig;
use offer_model::MasterTableCache;
use offer_reporting::{compute_report, ReportOutcome, ReportParams};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "offer-insight")]
#[command(about = "Offer diagnostics and customer-retention reporting")]
#[command(version)]
struct Cli {
    /// Directory holding the four input CSV datasets (overrides config)
    #[arg(long, env = "OFFER_INSIGHT__DATA__DATA_DIR")]
    data_dir: Option<String>,

    /// Analysis start date (YYYY-MM-DD); defaults to the earliest date in the data
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Analysis end date (YYYY-MM-DD); defaults to the latest date in the data
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Offer product ids, comma-separated; defaults to every product in the data
    #[arg(long, value_delimiter = ',')]
    offer: Vec<String>,

    /// City selection, comma-separated; defaults to every city
    #[arg(long, value_delimiter = ',')]
    cities: Vec<String>,

    /// Segment selection, comma-separated; defaults to every segment
    #[arg(long, value_delimiter = ',')]
    segments: Vec<String>,

    /// Minimum offer amount per transaction (overrides config)
    #[arg(long, env = "OFFER_INSIGHT__ANALYSIS__MIN_AMOUNT")]
    min_amount: Option<f64>,

    /// Disable the comparative (retention) analysis
    #[arg(long, default_value_t = false)]
    no_comparative: bool,

    /// Comparative window start (YYYY-MM-DD); derived when omitted
    #[arg(long)]
    comparative_start: Option<NaiveDate>,

    /// Comparative window end (YYYY-MM-DD); derived when omitted
    #[arg(long)]
    comparative_end: Option<NaiveDate>,

    /// Minimum comparative amount per customer (overrides config)
    #[arg(long, env = "OFFER_INSIGHT__ANALYSIS__COMPARATIVE_MIN_AMOUNT")]
    comparative_min: Option<f64>,

    /// Directory the workbook sheets are written to
    #[arg(long, default_value = "report")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "offer_insight=info,offer_model=info,offer_reporting=info".into()),
        )
        .init();

    let cli = Cli::parse();

    info!("Offer Insight starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(dir) = cli.data_dir {
        config.data.data_dir = dir;
    }
    if let Some(amount) = cli.min_amount {
        config.analysis.min_amount = amount;
    }
    if let Some(amount) = cli.comparative_min {
        config.analysis.comparative_min_amount = amount;
    }
    if cli.no_comparative {
        config.analysis.comparative_enabled = false;
    }

    let tables = offer_model::load_tables(&config.data)?;
    let cache = MasterTableCache::new();
    let master = cache.get_or_build(&tables);

    let Some((min_date, max_date)) = offer_model::date_bounds(&master) else {
        warn!("No usable rows in the master table; nothing to analyze");
        return Ok(());
    };

    let offer_product_ids = if cli.offer.is_empty() {
        // Same default as the interactive shell: every product participates.
        let mut ids: Vec<String> = master.iter().map(|r| r.product_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    } else {
        cli.offer
    };

    let params = ReportParams {
        start: cli.start.unwrap_or(min_date),
        end: cli.end.unwrap_or(max_date),
        offer_product_ids,
        cities: (!cli.cities.is_empty()).then_some(cli.cities),
        segments: (!cli.segments.is_empty()).then_some(cli.segments),
        min_amount: config.analysis.min_amount,
        comparative_enabled: config.analysis.comparative_enabled,
        comparative_window: match (cli.comparative_start, cli.comparative_end) {
            (Some(start), Some(end)) => Some(ComparativeWindow { start, end }),
            _ => None,
        },
        comparative_min_amount: config.analysis.comparative_min_amount,
    };

    match compute_report(&master, &params, &config.analysis)? {
        ReportOutcome::NoOfferSelected => {
            warn!("No offer products selected; no analysis can run");
        }
        ReportOutcome::Report(bundle) => {
            info!(
                start = %bundle.start,
                end = %bundle.end,
                total_revenue = bundle.kpis.total_revenue,
                transactions = bundle.kpis.transaction_count,
                customers = bundle.kpis.customer_count,
                qualifiers = bundle.kpis.qualifying_customer_count,
                "Analysis period summary"
            );
            if let Some(retention) = &bundle.retention {
                info!(
                    comparative_start = %retention.window.start,
                    comparative_end = %retention.window.end,
                    comparative_revenue = retention.comparative_revenue_total,
                    previous_qualifiers = retention.previous_qualifying_customer_ids.len(),
                    retained = retention.retained_customer_ids.len(),
                    variation = %retention.revenue_variation,
                    "Retention summary"
                );
            }

            std::fs::create_dir_all(&cli.out_dir)?;
            for sheet in &bundle.workbook.sheets {
                let path = cli.out_dir.join(format!("{}.csv", sheet.name));
                std::fs::write(&path, sheet.to_csv())?;
            }
            let bundle_path = cli.out_dir.join(format!("{}.json", bundle.workbook.name));
            std::fs::write(&bundle_path, bundle.workbook.to_json()?)?;
            info!(dir = %cli.out_dir.display(), "Workbook written");
        }
    }

    Ok(())
}
