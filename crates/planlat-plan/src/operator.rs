//! The in-memory model of one physical operator occurrence.

use planlat_core::{OpId, StepId};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::raw::PlanNode;

/// Physical operator kinds the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperatorType {
    TableScan,
    InlineTable,
    PipelineBreakerScan,
    Temp,
    EarlyExecution,
    Select,
    Map,
    MultiWayJoin,
    HashJoin,
    IndexNLJoin,
    GroupJoin,
    GroupBy,
    Sort,
    SetOperation,
    Window,
    FileOutput,
    CsvWriter,
    AssertSingle,
    EarlyProbe,
    AnalyzePlan,
}

impl OperatorType {
    pub fn is_join(self) -> bool {
        matches!(
            self,
            OperatorType::HashJoin | OperatorType::IndexNLJoin | OperatorType::GroupJoin
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperatorType::TableScan => "TableScan",
            OperatorType::InlineTable => "InlineTable",
            OperatorType::PipelineBreakerScan => "PipelineBreakerScan",
            OperatorType::Temp => "Temp",
            OperatorType::EarlyExecution => "EarlyExecution",
            OperatorType::Select => "Select",
            OperatorType::Map => "Map",
            OperatorType::MultiWayJoin => "MultiWayJoin",
            OperatorType::HashJoin => "HashJoin",
            OperatorType::IndexNLJoin => "IndexNLJoin",
            OperatorType::GroupJoin => "GroupJoin",
            OperatorType::GroupBy => "GroupBy",
            OperatorType::Sort => "Sort",
            OperatorType::SetOperation => "SetOperation",
            OperatorType::Window => "Window",
            OperatorType::FileOutput => "FileOutput",
            OperatorType::CsvWriter => "CsvWriter",
            OperatorType::AssertSingle => "AssertSingle",
            OperatorType::EarlyProbe => "EarlyProbe",
            OperatorType::AnalyzePlan => "AnalyzePlan",
        }
    }

    /// Determine the kind from a raw node. Name suffix digits are stripped;
    /// `join` is split into hash vs. index-nested-loop by the physical
    /// operator tag.
    pub fn from_node(node: &PlanNode) -> Result<Self> {
        let name = node.operator.trim_end_matches(|c: char| c.is_ascii_digit());
        if name == "join" {
            if let Some(physical) = node.physical_operator.as_deref() {
                match physical {
                    "hashjoin" | "singletonjoin" | "bnljoin" => return Ok(OperatorType::HashJoin),
                    "indexnljoin" => return Ok(OperatorType::IndexNLJoin),
                    _ => {}
                }
            }
        }
        match name {
            "fileoutput" => Ok(OperatorType::FileOutput),
            "csvwriter" => Ok(OperatorType::CsvWriter),
            "sort" => Ok(OperatorType::Sort),
            "window" => Ok(OperatorType::Window),
            "select" => Ok(OperatorType::Select),
            "groupby" => Ok(OperatorType::GroupBy),
            "groupjoin" => Ok(OperatorType::GroupJoin),
            "multiwayjoin" => Ok(OperatorType::MultiWayJoin),
            "tablescan" => Ok(OperatorType::TableScan),
            "inlinetable" => Ok(OperatorType::InlineTable),
            "map" => Ok(OperatorType::Map),
            "earlyexecution" => Ok(OperatorType::EarlyExecution),
            "pipelinebreakerscan" => Ok(OperatorType::PipelineBreakerScan),
            "temp" => Ok(OperatorType::Temp),
            "setoperation" => Ok(OperatorType::SetOperation),
            "assertsingle" => Ok(OperatorType::AssertSingle),
            "earlyprobe" => Ok(OperatorType::EarlyProbe),
            "analyzeplan" => Ok(OperatorType::AnalyzePlan),
            _ => Err(Error::UnknownOperator(name.to_string())),
        }
    }
}

/// Scan-predicate statistics: per predicate shape, a plain count and an
/// accumulator of the incoming selectivity (the fraction of scanned tuples
/// that reach the predicate).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expressions {
    pub join_filter_count: u32,
    pub false_count: u32,
    pub like_count: u32,
    pub like_selectivity: f64,
    pub compare_count: u32,
    pub compare_selectivity: f64,
    pub in_expression_count: u32,
    pub in_expression_selectivity: f64,
    pub between_count: u32,
    pub between_selectivity: f64,
    pub or_expression_count: u32,
    pub or_selectivity: f64,
    pub starts_with_count: u32,
    pub starts_with_selectivity: f64,
}

/// One operator occurrence. Arena-resident: parent/child links are `OpId`
/// references into the owning `QueryPlan`, never owned pointers, so nodes
/// shared by multiple parents need no special ownership handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    pub kind: OperatorType,
    /// Raw operator tag as reported, e.g. `tablescan2`.
    pub name: String,
    pub op_id: OpId,
    pub step_id: StepId,

    // features
    pub output_cardinality: f64,
    pub input_cardinality: f64,
    /// Present only for binary operators.
    pub right_input_cardinality: Option<f64>,
    /// Bytes per produced tuple, summed over the produced IUs.
    pub output_tuple_size: f64,
    pub expressions: Expressions,
    /// True for a set operation reported as `unionall`.
    pub union_all: bool,

    /// Consumers of this operator's output; more than one only for nodes
    /// physically shared by multiple parents in the raw plan.
    pub parents: Vec<OpId>,
    pub input_op: Option<OpId>,
    pub right_input_op: Option<OpId>,
}
