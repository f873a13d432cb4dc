use planlat_core::OpId;
use thiserror::Error;

/// Canonical result for plan parsing.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} missing in operator name map")]
    UnknownOperator(String),

    #[error("unhandled expression: {0}")]
    UnknownExpression(String),

    #[error("could not find selectivity for expression: {0}")]
    NoSelectivity(String),

    #[error("could not match child {child} against the declared inputs of {op}")]
    ChildMismatch { op: String, child: OpId },

    #[error("operator {op} is missing required field `{field}`")]
    MissingField { op: String, field: &'static str },

    #[error("expression node is missing `{0}`")]
    MalformedExpression(&'static str),

    #[error("unknown intermediate unit: {0}")]
    UnknownIu(String),

    #[error("telemetry decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] planlat_core::Error),
}
