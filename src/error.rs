use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown container image reference: {0}")]
    UnknownImage(String),

    #[error("Unknown placement strategy: {0}")]
    UnknownStrategy(String),

    #[error("Invalid search parameters: {0}")]
    InvalidSearchParameters(String),

    #[error("Placement vector length {vector_len} does not match service count {service_count}")]
    PlacementLengthMismatch { vector_len: usize, service_count: usize },

    #[error("Failed to write metrics output: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write metrics CSV: {0}")]
    CsvError(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
