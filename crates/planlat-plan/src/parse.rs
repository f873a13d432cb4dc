//! Recursive construction of the operator arena from a telemetry payload.
//!
//! Operators live in one id-indexed arena (`QueryPlan::operators`); parent
//! and child relationships are `OpId` references into the arena, which makes
//! nodes reachable through multiple parents unremarkable. Which child fields
//! a node recurses into is decided per operator kind.

use std::collections::BTreeMap;

use planlat_core::{OpId, StepId, TableStatsSource};

use crate::error::{Error, Result};
use crate::expr::{accumulate_expression, expression_selectivity};
use crate::operator::{Expressions, Operator, OperatorType};
use crate::raw::{IuRef, PlanNode, PlanTelemetry};

/// The aggregate root: every operator of one analyzed query, keyed by its
/// telemetry id, plus the intermediate-unit size table. Immutable once
/// parsed.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    operators: BTreeMap<OpId, Operator>,
    ius: BTreeMap<String, f64>,
    predicted_cardinalities: bool,
}

impl QueryPlan {
    /// Parse one telemetry payload against externally supplied table
    /// statistics. `predicted_cardinalities` switches the cardinality source
    /// from the analyze run's measurements to the optimizer's estimates.
    pub fn parse(
        telemetry: &PlanTelemetry,
        stats: &dyn TableStatsSource,
        predicted_cardinalities: bool,
    ) -> Result<Self> {
        let ius: BTreeMap<String, f64> = telemetry
            .ius
            .iter()
            .map(|entry| (entry.iu.clone(), entry.estimated_size))
            .collect();
        let mut parser = Parser {
            stats,
            ius,
            predicted: predicted_cardinalities,
            operators: BTreeMap::new(),
        };
        parser.parse_node(&telemetry.plan, None)?;
        Ok(Self {
            operators: parser.operators,
            ius: parser.ius,
            predicted_cardinalities,
        })
    }

    pub fn operator(&self, id: OpId) -> Option<&Operator> {
        self.operators.get(&id)
    }

    /// All operators, ordered by id.
    pub fn operators(&self) -> impl Iterator<Item = &Operator> {
        self.operators.values()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn iu_size(&self, name: &str) -> Option<f64> {
        self.ius.get(name).copied()
    }

    pub fn predicted_cardinalities(&self) -> bool {
        self.predicted_cardinalities
    }

    /// Map from analyze-plan step id to operator id, as pipeline telemetry
    /// references operators by step.
    pub fn step_index(&self) -> BTreeMap<StepId, OpId> {
        self.operators
            .values()
            .map(|op| (op.step_id, op.op_id))
            .collect()
    }

    /// True when `op` (transitively) consumes the output of `of`, i.e. `of`
    /// must run before `op` within a pipeline.
    pub fn is_downstream_of(&self, op: OpId, of: OpId) -> bool {
        if op == of {
            return false;
        }
        let mut pending: Vec<OpId> = match self.operators.get(&of) {
            Some(o) => o.parents.clone(),
            None => return false,
        };
        let mut visited = std::collections::BTreeSet::new();
        while let Some(current) = pending.pop() {
            if current == op {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(o) = self.operators.get(&current) {
                pending.extend(o.parents.iter().copied());
            }
        }
        false
    }
}

/// Parent context threaded through the recursion: the already-inserted
/// parent's id plus its raw node, needed to match the child against the
/// parent's declared inputs.
struct ParentRef<'a> {
    id: OpId,
    kind: OperatorType,
    node: &'a PlanNode,
}

struct Parser<'a> {
    stats: &'a dyn TableStatsSource,
    ius: BTreeMap<String, f64>,
    predicted: bool,
    operators: BTreeMap<OpId, Operator>,
}

impl<'a> Parser<'a> {
    fn missing(node: &PlanNode, field: &'static str) -> Error {
        Error::MissingField {
            op: node.operator.clone(),
            field,
        }
    }

    /// Measured cardinality from the analyze run unless predicted mode is
    /// requested; table scans fall back to the optimizer estimate (scans
    /// below nested-loop joins carry no analyze cardinality).
    fn output_cardinality(&self, node: &PlanNode) -> f64 {
        let mut output = 0.0;
        if node.operator == "tablescan" {
            if let Some(c) = node.cardinality {
                output = c;
            }
        }
        if !self.predicted {
            if let Some(c) = node.analyze_plan_cardinality {
                output = c;
            }
        }
        output
    }

    fn left_cardinality(&self, node: &PlanNode) -> Result<f64> {
        let left = node.left.as_deref().ok_or_else(|| Self::missing(node, "left"))?;
        match left.cardinality {
            Some(c) if self.predicted || left.analyze_plan_cardinality.is_none() => Ok(c),
            _ => left
                .analyze_plan_cardinality
                .ok_or_else(|| Self::missing(left, "analyzePlanCardinality")),
        }
    }

    fn input_cardinality(&self, node: &PlanNode, kind: OperatorType) -> Result<f64> {
        match kind {
            k if k.is_join() => self.left_cardinality(node),
            OperatorType::TableScan => {
                let raw_name = node
                    .tablename
                    .as_deref()
                    .ok_or_else(|| Self::missing(node, "tablename"))?;
                // the engine reports table names unquoted
                let table = self.stats.quote_table_name(raw_name)?;
                Ok(self.stats.get_table_scan_size(&table)? as f64)
            }
            OperatorType::PipelineBreakerScan | OperatorType::InlineTable => {
                Ok(self.output_cardinality(node))
            }
            OperatorType::MultiWayJoin => Ok(0.0),
            OperatorType::SetOperation => {
                let operation = node
                    .operation
                    .as_deref()
                    .ok_or_else(|| Self::missing(node, "operation"))?;
                if operation == "unionall" {
                    Ok(0.0)
                } else {
                    Ok(self.output_cardinality(node))
                }
            }
            _ => {
                // walk down the input chain until a cardinality shows up
                let mut current = node;
                loop {
                    let input = current
                        .input
                        .as_deref()
                        .ok_or_else(|| Self::missing(current, "input"))?;
                    if !self.predicted {
                        if let Some(c) = input.analyze_plan_cardinality {
                            return Ok(c);
                        }
                    }
                    if let Some(c) = input.cardinality {
                        return Ok(c);
                    }
                    current = input;
                }
            }
        }
    }

    fn right_cardinality(&self, node: &PlanNode, kind: OperatorType) -> Result<Option<f64>> {
        match kind {
            OperatorType::IndexNLJoin => {
                let right = node
                    .right
                    .as_deref()
                    .ok_or_else(|| Self::missing(node, "right"))?;
                let right_kind = OperatorType::from_node(right)?;
                Ok(Some(self.input_cardinality(right, right_kind)?))
            }
            k if k.is_join() => {
                let right = node
                    .right
                    .as_deref()
                    .ok_or_else(|| Self::missing(node, "right"))?;
                Ok(Some(self.output_cardinality(right)))
            }
            _ => Ok(None),
        }
    }

    fn tuple_size(&self, node: &PlanNode) -> Result<f64> {
        node.produced_ius
            .iter()
            .map(|iu| match iu {
                IuRef::Name(name) => self
                    .ius
                    .get(name)
                    .copied()
                    .ok_or_else(|| Error::UnknownIu(name.clone())),
                IuRef::Sized { estimated_size } => Ok(*estimated_size),
            })
            .sum()
    }

    /// Restriction/residual statistics; meaningful for table scans only.
    /// Each predicate's selectivity attenuates what later predicates see.
    fn parse_expressions(&self, node: &PlanNode, kind: OperatorType) -> Result<Expressions> {
        let mut result = Expressions::default();
        if kind == OperatorType::TableScan {
            let mut current_selectivity = 1.0;
            for expression in node.restrictions.iter().chain(&node.residuals) {
                let selectivity = expression_selectivity(expression)?;
                accumulate_expression(expression, &mut result, current_selectivity, selectivity)?;
                current_selectivity *= selectivity;
            }
        }
        Ok(result)
    }

    fn parse_node(&mut self, node: &PlanNode, parent: Option<&ParentRef<'_>>) -> Result<()> {
        let kind = OperatorType::from_node(node)?;
        let id = OpId::new(node.operator_id);

        // revisited through a second parent edge: link, don't reconstruct
        if self.operators.contains_key(&id) {
            if let Some(p) = parent {
                if let Some(existing) = self.operators.get_mut(&id) {
                    existing.parents.push(p.id);
                }
                self.annotate_child(p, id)?;
            }
            return Ok(());
        }

        let output_cardinality = self.output_cardinality(node);
        let input_cardinality = self.input_cardinality(node, kind)?;
        let right_input_cardinality = self.right_cardinality(node, kind)?;
        let output_tuple_size = self.tuple_size(node)?;
        let expressions = self.parse_expressions(node, kind)?;

        let operator = Operator {
            kind,
            name: node.operator.clone(),
            op_id: id,
            step_id: StepId::new(node.analyze_plan_id),
            output_cardinality,
            input_cardinality,
            right_input_cardinality,
            output_tuple_size,
            expressions,
            union_all: kind == OperatorType::SetOperation
                && node.operation.as_deref() == Some("unionall"),
            parents: parent.iter().map(|p| p.id).collect(),
            input_op: None,
            right_input_op: None,
        };
        self.operators.insert(id, operator);

        let me = ParentRef { id, kind, node };
        match kind {
            k if k.is_join() => {
                let left = node.left.as_deref().ok_or_else(|| Self::missing(node, "left"))?;
                let right = node
                    .right
                    .as_deref()
                    .ok_or_else(|| Self::missing(node, "right"))?;
                self.parse_node(left, Some(&me))?;
                self.parse_node(right, Some(&me))?;
            }
            OperatorType::MultiWayJoin => {
                for input in &node.inputs {
                    self.parse_node(&input.op, Some(&me))?;
                }
            }
            OperatorType::PipelineBreakerScan => {
                // only one of the scanners over a shared breaker carries it
                if let Some(breaker) = node.pipeline_breaker.as_deref() {
                    self.parse_node(breaker, Some(&me))?;
                }
            }
            OperatorType::TableScan | OperatorType::InlineTable => {}
            OperatorType::SetOperation => {
                for argument in &node.arguments {
                    self.parse_node(&argument.input, Some(&me))?;
                }
            }
            _ => {
                let input = node
                    .input
                    .as_deref()
                    .ok_or_else(|| Self::missing(node, "input"))?;
                self.parse_node(input, Some(&me))?;
            }
        }

        if let Some(p) = parent {
            self.annotate_child(p, id)?;
        }
        Ok(())
    }

    /// Resolve which named slot of the parent the child fills, by matching
    /// the child's id against the parent's declared input nodes.
    fn annotate_child(&mut self, parent: &ParentRef<'_>, child: OpId) -> Result<()> {
        let child_raw = child.get();
        let mismatch = || Error::ChildMismatch {
            op: parent.node.operator.clone(),
            child,
        };

        let right_slot = match parent.kind {
            k if k.is_join() => {
                let left = parent
                    .node
                    .left
                    .as_deref()
                    .ok_or_else(|| Self::missing(parent.node, "left"))?;
                let right = parent
                    .node
                    .right
                    .as_deref()
                    .ok_or_else(|| Self::missing(parent.node, "right"))?;
                if left.operator_id == child_raw {
                    false
                } else if right.operator_id == child_raw {
                    true
                } else {
                    return Err(mismatch());
                }
            }
            OperatorType::SetOperation | OperatorType::MultiWayJoin => false,
            OperatorType::PipelineBreakerScan => {
                if let Some(breaker) = parent.node.pipeline_breaker.as_deref() {
                    if breaker.operator_id != child_raw {
                        return Err(mismatch());
                    }
                }
                false
            }
            _ => match parent.node.input.as_deref() {
                Some(input) if input.operator_id == child_raw => false,
                _ => return Err(mismatch()),
            },
        };

        let parent_op = self.operators.get_mut(&parent.id).ok_or_else(|| {
            planlat_core::Error::Invariant(format!("parent {} not in arena", parent.id))
        })?;
        if right_slot {
            parent_op.right_input_op = Some(child);
        } else {
            parent_op.input_op = Some(child);
        }
        Ok(())
    }
}
