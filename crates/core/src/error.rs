use thiserror::Error;

pub type OfferResult<T> = Result<T, OfferError>;

#[derive(Error, Debug)]
pub enum OfferError {
    /// A required input dataset could not be located or read. The load is
    /// aborted entirely; no partial analysis runs.
    #[error("Input dataset '{dataset}' is missing or unreadable at {path}")]
    MissingInput { dataset: &'static str, path: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid report parameters: {0}")]
    InvalidParams(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
