use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `OFFER_INSIGHT__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Locations of the four input datasets.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_sales_file")]
    pub sales_file: String,
    #[serde(default = "default_customers_file")]
    pub customers_file: String,
    #[serde(default = "default_products_file")]
    pub products_file: String,
    #[serde(default = "default_stores_file")]
    pub stores_file: String,
}

/// Thresholds and display knobs of the analysis layer.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum offer amount per transaction to qualify in the main period.
    #[serde(default = "default_min_amount")]
    pub min_amount: f64,
    #[serde(default = "default_comparative_enabled")]
    pub comparative_enabled: bool,
    /// Minimum summed revenue per customer to qualify in the comparative period.
    #[serde(default = "default_comparative_min_amount")]
    pub comparative_min_amount: f64,
    /// Cumulative-share boundary of the Pareto subset (inclusive).
    #[serde(default = "default_pareto_cutoff")]
    pub pareto_cutoff: f64,
    /// Row limit of the on-screen Pareto detail table.
    #[serde(default = "default_display_rows")]
    pub display_rows: usize,
}

// Default functions
fn default_data_dir() -> String {
    "data".to_string()
}
fn default_sales_file() -> String {
    "sales.csv".to_string()
}
fn default_customers_file() -> String {
    "customers.csv".to_string()
}
fn default_products_file() -> String {
    "products.csv".to_string()
}
fn default_stores_file() -> String {
    "stores.csv".to_string()
}
fn default_min_amount() -> f64 {
    55_000.0
}
fn default_comparative_enabled() -> bool {
    true
}
fn default_comparative_min_amount() -> f64 {
    30_000.0
}
fn default_pareto_cutoff() -> f64 {
    0.80
}
fn default_display_rows() -> usize {
    10
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            sales_file: default_sales_file(),
            customers_file: default_customers_file(),
            products_file: default_products_file(),
            stores_file: default_stores_file(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_amount: default_min_amount(),
            comparative_enabled: default_comparative_enabled(),
            comparative_min_amount: default_comparative_min_amount(),
            pareto_cutoff: default_pareto_cutoff(),
            display_rows: default_display_rows(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("OFFER_INSIGHT")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
