use planlat_core::OpId;
use planlat_pipeline::OperatorStage;
use planlat_plan::OperatorType;
use thiserror::Error;

/// Canonical result for featurization.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no features for {kind:?} - {stage:?}")]
    NoFeatures {
        kind: OperatorType,
        stage: OperatorStage,
    },

    #[error("operator {0} not present in the query plan")]
    MissingOperator(OpId),

    #[error(transparent)]
    Pipeline(#[from] planlat_pipeline::Error),

    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
