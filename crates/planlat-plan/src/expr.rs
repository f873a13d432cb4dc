//! Scan-predicate analysis.
//!
//! Walks a restriction/residual expression tree and accumulates, per
//! predicate shape, a count and an incoming-selectivity-weighted exposure:
//! the fraction of scanned tuples expected to reach each sub-predicate, with
//! AND/OR combinators attenuating that fraction positionally.

use crate::error::{Error, Result};
use crate::operator::Expressions;
use crate::raw::{ExprInput, ExprNode, ExprValue};

fn single_input(expr: &ExprNode) -> Result<&ExprNode> {
    match &expr.input {
        Some(ExprInput::One(child)) => Ok(child),
        _ => Err(Error::MalformedExpression("input")),
    }
}

fn input_list(expr: &ExprNode) -> Result<&[ExprNode]> {
    match &expr.input {
        Some(ExprInput::Many(children)) if !children.is_empty() => Ok(children),
        _ => Err(Error::MalformedExpression("input list")),
    }
}

/// Estimated selectivity of one expression node: the telemetry value when
/// present, else a fixed fallback per predicate shape. `not` inverts its
/// child, `and` multiplies, `or` sums capped at 1.
pub fn expression_selectivity(expr: &ExprNode) -> Result<f64> {
    if let Some(s) = expr.estimated_selectivity {
        return Ok(s);
    }
    match expr.expression.as_deref() {
        Some("compare") => match expr.direction.as_deref() {
            Some("<" | "<=" | ">" | ">=") => Ok(0.5),
            Some("=") => Ok(0.01),
            Some("<>") => Ok(0.99),
            _ => Err(Error::NoSelectivity(expr.tag())),
        },
        Some("between" | "isnotnull") => Ok(0.5),
        Some("in" | "like" | "startswith") => Ok(0.01),
        Some("not") => Ok(1.0 - expression_selectivity(single_input(expr)?)?),
        Some("and") => input_list(expr)?
            .iter()
            .map(expression_selectivity)
            .product::<Result<f64>>(),
        Some("or") => {
            let sum = input_list(expr)?
                .iter()
                .map(expression_selectivity)
                .sum::<Result<f64>>()?;
            Ok(sum.min(1.0))
        }
        _ => Err(Error::NoSelectivity(expr.tag())),
    }
}

/// Distribute the parent's incoming selectivity over AND/OR children.
///
/// Without per-conjunct cardinality telemetry we assume the number of
/// sub-expressions a tuple reaches is uniformly distributed: child `i` sees
/// `incoming - i * single_child_share`.
fn accumulate_children(
    expr: &ExprNode,
    out: &mut Expressions,
    incoming_selectivity: f64,
    expression_selectivity: f64,
) -> Result<()> {
    let children = input_list(expr)?;
    let outgoing = incoming_selectivity * expression_selectivity;
    let single_share = (incoming_selectivity - outgoing) / children.len() as f64;
    for (i, child) in children.iter().enumerate() {
        let current_incoming = incoming_selectivity - i as f64 * single_share;
        accumulate_expression(child, out, current_incoming, single_share)?;
    }
    Ok(())
}

/// Walk one predicate tree, incrementing each leaf shape's counter and
/// adding the leaf's current incoming selectivity to its accumulator.
pub fn accumulate_expression(
    expr: &ExprNode,
    out: &mut Expressions,
    incoming_selectivity: f64,
    expression_selectivity: f64,
) -> Result<()> {
    let mode = expr.mode.as_deref();
    let tag = expr.expression.as_deref();

    if mode == Some("filter") {
        let Some(ExprValue::Node(value)) = &expr.value else {
            return Err(Error::MalformedExpression("value"));
        };
        return accumulate_expression(value, out, incoming_selectivity, expression_selectivity);
    }
    if mode == Some("joinfilter") {
        out.join_filter_count += 1;
        return Ok(());
    }
    // null checks should be similarly cheap as comparisons
    if matches!(
        mode,
        Some("<" | "<=" | ">" | ">=" | "=" | "!=" | "isnotnull" | "is")
    ) || matches!(tag, Some("compare" | "isnotnull" | "is"))
    {
        out.compare_count += 1;
        out.compare_selectivity += incoming_selectivity;
        return Ok(());
    }
    if tag == Some("not") {
        return accumulate_expression(
            single_input(expr)?,
            out,
            incoming_selectivity,
            expression_selectivity,
        );
    }
    if tag == Some("or") {
        out.or_expression_count += 1;
        out.or_selectivity += incoming_selectivity;
        return accumulate_children(expr, out, incoming_selectivity, expression_selectivity);
    }
    if tag == Some("and") {
        return accumulate_children(expr, out, incoming_selectivity, expression_selectivity);
    }
    if tag == Some("in") {
        out.in_expression_count += 1;
        out.in_expression_selectivity += incoming_selectivity;
        return Ok(());
    }
    if matches!(mode, Some("[]" | "[)" | "(]" | "()")) || tag == Some("between") {
        out.between_count += 1;
        out.between_selectivity += incoming_selectivity;
        return Ok(());
    }
    if tag == Some("like") {
        out.like_count += 1;
        out.like_selectivity += incoming_selectivity;
        return Ok(());
    }
    if tag == Some("startswith") {
        out.starts_with_count += 1;
        out.starts_with_selectivity += incoming_selectivity;
        return Ok(());
    }
    if mode == Some("false") {
        out.false_count = 0;
        return Ok(());
    }
    Err(Error::UnknownExpression(expr.tag()))
}
