//! Data modeling layer: CSV ingestion, master-table construction, and the
//! digest-keyed build cache.

pub mod cache;
pub mod loader;
pub mod modeler;

pub use cache::MasterTableCache;
pub use loader::{load_tables, RawTables};
pub use modeler::{build_master, date_bounds, parse_date};
