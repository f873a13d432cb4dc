//! Stage classification: the role an operator plays within its pipeline.
//!
//! A pure function of (operator kind, position, pipeline length, immediate
//! predecessor). Every combination outside the documented table is a fatal
//! classification error; a malformed plan shape must never be silently
//! classified.

use planlat_core::OpId;
use planlat_plan::{Operator, OperatorType, QueryPlan};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperatorStage {
    Scan,
    Build,
    Probe,
    PassThrough,
}

impl OperatorStage {
    pub fn as_str(self) -> &'static str {
        match self {
            OperatorStage::Scan => "Scan",
            OperatorStage::Build => "Build",
            OperatorStage::Probe => "Probe",
            OperatorStage::PassThrough => "PassThrough",
        }
    }
}

pub(crate) fn lookup(plan: &QueryPlan, id: OpId) -> Result<&Operator> {
    plan.operator(id).ok_or(Error::MissingOperator(id))
}

/// Classify the operator at `op_index` of a data-flow-ordered pipeline.
pub fn classify(plan: &QueryPlan, op_index: usize, pipeline_ops: &[OpId]) -> Result<OperatorStage> {
    let op = lookup(plan, pipeline_ops[op_index])?;
    let last_index = pipeline_ops.len() - 1;
    match op.kind {
        OperatorType::TableScan
        | OperatorType::EarlyExecution
        | OperatorType::PipelineBreakerScan
        | OperatorType::InlineTable => Ok(OperatorStage::Scan),

        OperatorType::Map
        | OperatorType::Select
        | OperatorType::AssertSingle
        | OperatorType::EarlyProbe => Ok(OperatorStage::PassThrough),

        OperatorType::CsvWriter | OperatorType::FileOutput | OperatorType::Temp => {
            Ok(OperatorStage::Build)
        }

        OperatorType::GroupBy | OperatorType::Sort | OperatorType::Window => {
            if op_index == 0 {
                Ok(OperatorStage::Scan)
            } else if op_index == last_index {
                Ok(OperatorStage::Build)
            } else {
                Err(Error::StagePosition(op.kind))
            }
        }

        OperatorType::HashJoin => {
            if op_index == 0 {
                return Err(Error::JoinAtStart);
            }
            let predecessor = pipeline_ops[op_index - 1];
            let from_left = op.input_op == Some(predecessor);
            let from_right = op.right_input_op == Some(predecessor);
            if !from_left && !from_right {
                return Err(Error::JoinPredecessor {
                    op: op.name.clone(),
                });
            }
            if op_index != last_index || from_right {
                Ok(OperatorStage::Probe)
            } else {
                Ok(OperatorStage::Build)
            }
        }

        OperatorType::IndexNLJoin => {
            if op_index == 0 {
                return Err(Error::JoinAtStart);
            }
            let predecessor = pipeline_ops[op_index - 1];
            let from_left = op.input_op == Some(predecessor);
            let from_right = op.right_input_op == Some(predecessor);
            if !from_left && !from_right {
                return Err(Error::JoinPredecessor {
                    op: op.name.clone(),
                });
            }
            if op_index != last_index {
                if !from_left {
                    return Err(Error::IndexNlProbeSide {
                        op: op.name.clone(),
                    });
                }
                Ok(OperatorStage::Probe)
            } else if op.parents.is_empty() {
                // the root of the plan may be driven from either side
                if from_left {
                    Ok(OperatorStage::Probe)
                } else {
                    Err(Error::IndexNlBuildPipeline)
                }
            } else {
                if !from_right {
                    return Err(Error::IndexNlBuildSide {
                        op: op.name.clone(),
                    });
                }
                Ok(OperatorStage::Build)
            }
        }

        OperatorType::SetOperation => {
            if op_index == 0 {
                Ok(OperatorStage::Scan)
            } else if op_index == last_index {
                Ok(OperatorStage::Build)
            } else {
                Err(Error::SetOpPassThrough)
            }
        }

        OperatorType::MultiWayJoin => {
            if op_index == 0 {
                Ok(OperatorStage::Scan)
            } else {
                Ok(OperatorStage::Build)
            }
        }

        OperatorType::GroupJoin => {
            if op_index == 0 {
                return Ok(OperatorStage::Scan);
            }
            let predecessor = pipeline_ops[op_index - 1];
            if op.right_input_op == Some(predecessor) {
                Ok(OperatorStage::Probe)
            } else if op.input_op == Some(predecessor) {
                Ok(OperatorStage::Build)
            } else {
                Err(Error::JoinPredecessor {
                    op: op.name.clone(),
                })
            }
        }

        OperatorType::AnalyzePlan => Err(Error::Unclassified(op.kind)),
    }
}
