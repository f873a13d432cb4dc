use planlat_core::{OpId, StepId};
use planlat_plan::OperatorType;
use thiserror::Error;

/// Canonical result for pipeline construction.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0:?} should be at begin or end of pipeline")]
    StagePosition(OperatorType),

    #[error("join should not be at start of pipeline")]
    JoinAtStart,

    #[error("pipeline predecessor of {op} is neither its left nor its right input")]
    JoinPredecessor { op: String },

    #[error("probe side of an index nl join must be its left input ({op})")]
    IndexNlProbeSide { op: String },

    #[error("build side of an index nl join must be its right input ({op})")]
    IndexNlBuildSide { op: String },

    #[error("build of an index nl join should never be a pipeline")]
    IndexNlBuildPipeline,

    #[error("set operations never run as pass-through")]
    SetOpPassThrough,

    #[error("no stage rule for operator {0:?}")]
    Unclassified(OperatorType),

    #[error("pipeline references unknown analyze-plan step {0}")]
    UnknownStep(StepId),

    #[error("could not assign operators to pipelines")]
    UnassignedPipeline,

    #[error("operator {0} not present in the query plan")]
    MissingOperator(OpId),

    #[error("union-all operator {0} has no tail pipeline")]
    MissingUnionTail(OpId),

    #[error("pipeline ending at union-all {0} has no feeding operator")]
    UnionBranchTooShort(OpId),
}
