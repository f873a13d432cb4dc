//! Pipeline construction from raw timing telemetry, plus the union-all
//! fix-up as a pure post-pass.

use std::collections::VecDeque;

use planlat_core::{OpId, StepId};
use planlat_plan::{QueryPlan, RawPipeline};

use crate::error::{Error, Result};
use crate::phase::{ExecutionPhase, Pipeline};
use crate::stage::{classify, lookup, OperatorStage};

/// Build one pipeline per telemetry record: resolve analyze-plan step ids,
/// order by data-flow precedence, classify each operator, then apply the
/// union-all fix-up.
pub fn build_pipelines(plan: &QueryPlan, raw: &[RawPipeline]) -> Result<Vec<Pipeline>> {
    let steps = plan.step_index();
    let mut pipelines = Vec::with_capacity(raw.len());
    for record in raw {
        if record.operators == [0]
            && !steps.contains_key(&StepId::new(0))
            && record.duration == 0.0
        {
            return Err(Error::UnassignedPipeline);
        }
        let mut ops = record
            .operators
            .iter()
            .map(|&step| {
                let step = StepId::new(step);
                steps.get(&step).copied().ok_or(Error::UnknownStep(step))
            })
            .collect::<Result<Vec<OpId>>>()?;
        order_by_data_flow(plan, &mut ops);
        let phases = ops
            .iter()
            .enumerate()
            .map(|(index, &op)| {
                Ok(ExecutionPhase {
                    op,
                    stage: classify(plan, index, &ops)?,
                    fraction: 1.0,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        pipelines.push(Pipeline {
            phases,
            start: record.start,
            stop: record.stop,
        });
    }
    fix_union_all(plan, pipelines)
}

/// Order the operators so every producer precedes its transitive consumers.
/// The precedence relation is a strict partial order; ties keep telemetry
/// order.
fn order_by_data_flow(plan: &QueryPlan, ops: &mut Vec<OpId>) {
    let n = ops.len();
    if n <= 1 {
        return;
    }
    let mut indegree = vec![0usize; n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for u in 0..n {
        for v in 0..n {
            if u != v && plan.is_downstream_of(ops[v], ops[u]) {
                dependents[u].push(v);
                indegree[v] += 1;
            }
        }
    }
    let mut ready: VecDeque<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(u) = ready.pop_front() {
        order.push(ops[u]);
        for &v in &dependents[u] {
            indegree[v] -= 1;
            if indegree[v] == 0 {
                ready.push_back(v);
            }
        }
    }
    // reachability over a parsed DAG cannot cycle
    debug_assert_eq!(order.len(), n);
    if order.len() == n {
        *ops = order;
    }
}

/// The engine reports one separate pipeline for the work downstream of a
/// union-all, attributed to none of the branches that feed it. Redistribute:
/// the tail pipeline's phases (minus the union itself) are appended to every
/// branch pipeline ending at the union, scaled by the branch's share of the
/// union's output, and the tail is emptied.
pub fn fix_union_all(plan: &QueryPlan, mut pipelines: Vec<Pipeline>) -> Result<Vec<Pipeline>> {
    for op in plan.operators() {
        if !op.union_all {
            continue;
        }
        let tail_index = pipelines
            .iter()
            .position(|p| p.phases.first().map(|phase| phase.op) == Some(op.op_id))
            .ok_or(Error::MissingUnionTail(op.op_id))?;

        // the tail carries no cost of its own
        pipelines[tail_index].start = 0.0;
        pipelines[tail_index].stop = 0.0;
        pipelines[tail_index].phases[0].stage = OperatorStage::PassThrough;
        let union_cardinality = op.output_cardinality.max(1.0);
        let tail_phases: Vec<ExecutionPhase> = pipelines[tail_index].phases[1..].to_vec();

        for pipeline in pipelines.iter_mut() {
            let Some(last) = pipeline.phases.last() else {
                continue;
            };
            if last.op != op.op_id {
                continue;
            }
            if pipeline.phases.len() < 2 {
                return Err(Error::UnionBranchTooShort(op.op_id));
            }
            let feeding = &pipeline.phases[pipeline.phases.len() - 2];
            let fraction = lookup(plan, feeding.op)?.output_cardinality / union_cardinality;
            let last_index = pipeline.phases.len() - 1;
            pipeline.phases[last_index].stage = OperatorStage::PassThrough;
            for tail_phase in &tail_phases {
                let mut replayed = tail_phase.clone();
                replayed.fraction *= fraction;
                pipeline.phases.push(replayed);
            }
        }
        pipelines[tail_index].phases.clear();
    }
    Ok(pipelines)
}
