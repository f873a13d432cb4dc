use thiserror::Error;

/// Canonical result for the benchmark layer.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("pipeline times do not add up: {sum} != {total}")]
    Attribution { sum: f64, total: f64 },

    #[error("could not categorize benchmarked query: {0}")]
    Category(String),

    #[error(transparent)]
    Plan(#[from] planlat_plan::Error),

    #[error(transparent)]
    Pipeline(#[from] planlat_pipeline::Error),

    #[error(transparent)]
    Features(#[from] planlat_features::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("benchmark decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
