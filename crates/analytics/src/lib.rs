//! Offer analytics: period filtering, transaction qualification, customer
//! retention, Pareto concentration, and the daily revenue trend.
//!
//! Every analyzer is a pure function over master-table rows; results are
//! recomputed per invocation and never cached.

pub mod filter;
pub mod pareto;
pub mod qualifier;
pub mod retention;
pub mod trend;

pub use filter::PeriodFilter;
pub use pareto::{ParetoAnalysis, ParetoProduct};
pub use qualifier::QualifierSummary;
pub use retention::{ComparativeWindow, RetentionResult};
