//! Pipelines and execution phases.
//!
//! An `ExecutionPhase` is one occurrence of an operator within one pipeline.
//! After the union-all fix-up the same operator can occur in several
//! pipelines; `fraction` is the share of its cardinality attributable to the
//! occurrence, and all cardinality-derived numbers are scaled by it.

use planlat_core::OpId;
use planlat_plan::{OperatorType, QueryPlan};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::stage::{lookup, OperatorStage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPhase {
    pub op: OpId,
    pub stage: OperatorStage,
    pub fraction: f64,
}

/// One scheduled unit of execution: data-flow-ordered phases plus the
/// engine's timing window for the unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub phases: Vec<ExecutionPhase>,
    pub start: f64,
    pub stop: f64,
}

impl Pipeline {
    /// Tuples entering the pipeline. GroupBy/Sort/Temp heads scan their own
    /// materialized buffer, not the raw upstream input.
    pub fn scan_cardinality(&self, plan: &QueryPlan) -> Result<f64> {
        let Some(first) = self.phases.first() else {
            return Ok(0.0);
        };
        let op = lookup(plan, first.op)?;
        Ok(match op.kind {
            OperatorType::GroupBy | OperatorType::Sort | OperatorType::Temp => {
                op.output_cardinality
            }
            _ => op.input_cardinality,
        })
    }

    /// Tuples leaving the pipeline. A GroupBy sink consumes its input; it
    /// reports the pre-aggregation cardinality.
    pub fn sink_cardinality(&self, plan: &QueryPlan) -> Result<f64> {
        let Some(last) = self.phases.last() else {
            return Ok(0.0);
        };
        let op = lookup(plan, last.op)?;
        Ok(match op.kind {
            OperatorType::GroupBy => op.input_cardinality,
            _ => op.output_cardinality,
        })
    }

    pub fn phase_of(&self, op: OpId) -> Option<&ExecutionPhase> {
        self.phases.iter().find(|phase| phase.op == op)
    }
}

impl ExecutionPhase {
    pub fn input_percentage(&self, plan: &QueryPlan, pipeline: &Pipeline) -> Result<f64> {
        let scan = pipeline.scan_cardinality(plan)?;
        if scan == 0.0 {
            return Ok(0.0);
        }
        Ok(lookup(plan, self.op)?.input_cardinality * self.fraction / scan)
    }

    pub fn output_percentage(&self, plan: &QueryPlan, pipeline: &Pipeline) -> Result<f64> {
        let scan = pipeline.scan_cardinality(plan)?;
        if scan == 0.0 {
            return Ok(0.0);
        }
        Ok(lookup(plan, self.op)?.output_cardinality * self.fraction / scan)
    }

    /// `None` for operators without a right input.
    pub fn right_percentage(&self, plan: &QueryPlan, pipeline: &Pipeline) -> Result<Option<f64>> {
        let Some(right) = lookup(plan, self.op)?.right_input_cardinality else {
            return Ok(None);
        };
        let scan = pipeline.scan_cardinality(plan)?;
        if scan == 0.0 {
            return Ok(Some(0.0));
        }
        Ok(Some(right * self.fraction / scan))
    }

    /// A probe keeps consuming the full pipeline stream; other stages see
    /// only this occurrence's share.
    pub fn effective_input_cardinality(&self, plan: &QueryPlan) -> Result<f64> {
        let input = lookup(plan, self.op)?.input_cardinality;
        Ok(if self.stage == OperatorStage::Probe {
            input
        } else {
            input * self.fraction
        })
    }

    /// The terminal phase materializes the full output; earlier phases only
    /// forward their share.
    pub fn effective_output_cardinality(&self, plan: &QueryPlan, is_last: bool) -> Result<f64> {
        let output = lookup(plan, self.op)?.output_cardinality;
        Ok(if is_last { output } else { output * self.fraction })
    }

    pub fn effective_right_cardinality(&self, plan: &QueryPlan) -> Result<f64> {
        let right = lookup(plan, self.op)?.right_input_cardinality.unwrap_or(0.0);
        Ok(if self.stage == OperatorStage::Probe {
            right * self.fraction
        } else {
            right
        })
    }
}
