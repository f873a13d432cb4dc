//! Typed model of the engine's analyze-plan telemetry.
//!
//! Each node declares exactly the child fields its operator family can carry;
//! unknown fields in the raw record are ignored. The parser (`parse`) decides
//! which of the declared children to recurse into per operator kind.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One telemetry payload: the root operator, the intermediate-unit size
/// table, and the per-pipeline timing records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTelemetry {
    pub plan: PlanNode,
    #[serde(default)]
    pub ius: Vec<IuEntry>,
    #[serde(default)]
    pub analyze_plan_pipelines: Vec<RawPipeline>,
}

impl PlanTelemetry {
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// A named, sized column-like value flowing between operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IuEntry {
    pub iu: String,
    #[serde(rename = "estimatedSize")]
    pub estimated_size: f64,
}

/// One scheduled unit of execution as the engine reports it: the
/// analyze-plan step ids it ran and its timing window (engine time units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPipeline {
    pub operators: Vec<u64>,
    pub start: f64,
    pub stop: f64,
    #[serde(default)]
    pub duration: f64,
}

/// One operator occurrence in the raw plan tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanNode {
    /// Operator tag, possibly suffixed with a disambiguating digit
    /// (e.g. `tablescan2`).
    pub operator: String,
    pub operator_id: u64,
    pub analyze_plan_id: u64,
    #[serde(default)]
    pub physical_operator: Option<String>,
    /// The optimizer's cardinality estimate.
    #[serde(default)]
    pub cardinality: Option<f64>,
    /// The measured cardinality from the analyze run.
    #[serde(default)]
    pub analyze_plan_cardinality: Option<f64>,
    #[serde(default, rename = "producedIUs")]
    pub produced_ius: Vec<IuRef>,
    #[serde(default)]
    pub restrictions: Vec<ExprNode>,
    #[serde(default)]
    pub residuals: Vec<ExprNode>,
    #[serde(default)]
    pub tablename: Option<String>,
    /// Set-operation flavour (`unionall`, `intersect`, ...).
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub left: Option<Box<PlanNode>>,
    #[serde(default)]
    pub right: Option<Box<PlanNode>>,
    #[serde(default)]
    pub input: Option<Box<PlanNode>>,
    #[serde(default)]
    pub inputs: Vec<MultiWayInput>,
    #[serde(default)]
    pub arguments: Vec<SetOpArgument>,
    #[serde(default)]
    pub pipeline_breaker: Option<Box<PlanNode>>,
}

/// Multi-way joins wrap each input in an object with extra join metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiWayInput {
    pub op: PlanNode,
}

/// Set operations wrap each branch in an argument record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetOpArgument {
    pub input: PlanNode,
}

/// A produced IU is either a reference into the payload's `ius` table or an
/// inline record carrying its own size estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IuRef {
    Name(String),
    Sized {
        #[serde(rename = "estimatedSize")]
        estimated_size: f64,
    },
}

/// One node of a predicate expression tree. Leaf operands (attribute and
/// constant references) also deserialize into this shape, with every tag
/// absent; the analyzer never descends into them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExprNode {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub expression: Option<String>,
    /// Comparison direction (`<`, `<=`, `=`, ...).
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub estimated_selectivity: Option<f64>,
    /// `mode: filter` wraps the actual predicate in `value`; comparison
    /// leaves put their constant operand here instead.
    #[serde(default)]
    pub value: Option<ExprValue>,
    #[serde(default)]
    pub input: Option<ExprInput>,
}

/// `not` carries a single child; `and`/`or` carry a list; leaves may carry
/// operand references the analyzer never descends into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExprInput {
    One(Box<ExprNode>),
    Many(Vec<ExprNode>),
    Opaque(serde_json::Value),
}

/// A nested predicate (under `mode: filter`) or a scalar constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExprValue {
    Node(Box<ExprNode>),
    Constant(serde_json::Value),
}

impl ExprNode {
    /// Short tag for diagnostics.
    pub(crate) fn tag(&self) -> String {
        self.expression
            .clone()
            .or_else(|| self.mode.clone())
            .unwrap_or_else(|| "<untagged>".to_string())
    }
}
