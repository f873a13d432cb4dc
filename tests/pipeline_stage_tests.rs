//! Stage classification and pipeline construction, including the union-all
//! fix-up.

mod fixtures;

use fixtures::{parse, schema};
use planlat_core::OpId;
use planlat_pipeline::{build_pipelines, classify, OperatorStage};
use planlat_plan::{PlanTelemetry, QueryPlan};
use serde_json::json;

fn stages(pipeline: &planlat_pipeline::Pipeline) -> Vec<OperatorStage> {
    pipeline.phases.iter().map(|p| p.stage).collect()
}

#[test]
fn sole_table_scan_is_a_scan() {
    let (_, pipelines) = parse(&fixtures::scan_telemetry());
    assert_eq!(stages(&pipelines[0]), vec![OperatorStage::Scan]);
}

#[test]
fn hash_join_build_and_probe_sides() {
    let (_, pipelines) = parse(&fixtures::join_telemetry());
    // build side: scan feeds the join's left input, join is terminal
    assert_eq!(
        stages(&pipelines[0]),
        vec![OperatorStage::Scan, OperatorStage::Build]
    );
    // probe side: the join passes the right input through to the group-by
    assert_eq!(
        stages(&pipelines[1]),
        vec![
            OperatorStage::Scan,
            OperatorStage::Probe,
            OperatorStage::Build
        ]
    );
    // the group-by then scans its own buffer
    assert_eq!(stages(&pipelines[2]), vec![OperatorStage::Scan]);
}

#[test]
fn operators_are_ordered_by_data_flow() {
    // the first pipeline record lists [join, scan]; the build must reorder
    let (_, pipelines) = parse(&fixtures::join_telemetry());
    let ops: Vec<OpId> = pipelines[0].phases.iter().map(|p| p.op).collect();
    assert_eq!(ops, vec![OpId::new(11), OpId::new(13)]);
}

#[test]
fn scan_and_sink_cardinalities() {
    let (plan, pipelines) = parse(&fixtures::join_telemetry());
    // probe pipeline scans the orders table and sinks into the group-by,
    // which reports its pre-aggregation cardinality
    assert_eq!(pipelines[1].scan_cardinality(&plan).unwrap(), 500.0);
    assert_eq!(pipelines[1].sink_cardinality(&plan).unwrap(), 800.0);
    // the group-by's own pipeline scans its materialized buffer
    assert_eq!(pipelines[2].scan_cardinality(&plan).unwrap(), 10.0);
}

#[test]
fn classification_is_deterministic() {
    let (plan, _) = parse(&fixtures::join_telemetry());
    let ops = [OpId::new(11), OpId::new(13)];
    let first = classify(&plan, 1, &ops).unwrap();
    let second = classify(&plan, 1, &ops).unwrap();
    assert_eq!(first, second);
}

#[test]
fn join_at_pipeline_start_is_fatal() {
    let (plan, _) = parse(&fixtures::join_telemetry());
    let error = classify(&plan, 0, &[OpId::new(13), OpId::new(14)]).unwrap_err();
    assert_eq!(
        error.to_string(),
        "join should not be at start of pipeline"
    );
}

#[test]
fn group_by_in_the_middle_is_fatal() {
    let (plan, _) = parse(&fixtures::join_telemetry());
    let ops = [OpId::new(12), OpId::new(14), OpId::new(13)];
    let error = classify(&plan, 1, &ops).unwrap_err();
    assert!(error.to_string().contains("begin or end of pipeline"));
}

#[test]
fn probe_side_of_shared_temp_join() {
    let (_, pipelines) = parse(&fixtures::shared_temp_telemetry());
    // left scanner feeds the build, right scanner feeds the probe
    assert_eq!(
        stages(&pipelines[1]),
        vec![OperatorStage::Scan, OperatorStage::Build]
    );
    assert_eq!(
        stages(&pipelines[2]),
        vec![OperatorStage::Scan, OperatorStage::Probe]
    );
}

fn parse_plan(value: serde_json::Value) -> QueryPlan {
    let telemetry = PlanTelemetry::from_value(value).unwrap();
    QueryPlan::parse(&telemetry, &schema(), false).unwrap()
}

fn scan_node(operator: &str, op_id: u64, step: u64, table: &str, card: f64) -> serde_json::Value {
    json!({
        "operator": operator,
        "operatorId": op_id,
        "analyzePlanId": step,
        "cardinality": card,
        "analyzePlanCardinality": card,
        "producedIUs": [],
        "restrictions": [],
        "residuals": [],
        "tablename": table
    })
}

#[test]
fn index_nl_join_stages() {
    // the join feeds a map, so it is not the plan root
    let plan = parse_plan(json!({
        "plan": {
            "operator": "map",
            "operatorId": 3,
            "analyzePlanId": 3,
            "analyzePlanCardinality": 450.0,
            "producedIUs": [],
            "restrictions": [],
            "residuals": [],
            "input": {
                "operator": "join",
                "operatorId": 2,
                "analyzePlanId": 2,
                "physicalOperator": "indexnljoin",
                "analyzePlanCardinality": 450.0,
                "producedIUs": [],
                "restrictions": [],
                "residuals": [],
                "left": scan_node("tablescan", 1, 1, "lineitem", 1000.0),
                "right": scan_node("tablescan2", 4, 4, "orders", 480.0)
            }
        },
        "ius": [],
        "analyzePlanPipelines": []
    }));
    // the right side of an index join counts its input, i.e. the table size
    let join = plan.operator(planlat_core::OpId::new(2)).unwrap();
    assert_eq!(join.right_input_cardinality, Some(500.0));

    let (left, join, map, right) = (
        OpId::new(1),
        OpId::new(2),
        OpId::new(3),
        OpId::new(4),
    );
    // mid-pipeline the join probes, driven from its left input
    assert_eq!(
        classify(&plan, 1, &[left, join, map]).unwrap(),
        OperatorStage::Probe
    );
    // terminal with a consumer above, the right input builds the index side
    assert_eq!(
        classify(&plan, 1, &[right, join]).unwrap(),
        OperatorStage::Build
    );
    // mid-pipeline from the right is malformed
    assert!(classify(&plan, 1, &[right, join, map]).is_err());
}

#[test]
fn root_index_nl_join_probes_from_the_left_only() {
    let plan = parse_plan(json!({
        "plan": {
            "operator": "join",
            "operatorId": 2,
            "analyzePlanId": 2,
            "physicalOperator": "indexnljoin",
            "analyzePlanCardinality": 450.0,
            "producedIUs": [],
            "restrictions": [],
            "residuals": [],
            "left": scan_node("tablescan", 1, 1, "lineitem", 1000.0),
            "right": scan_node("tablescan2", 3, 3, "orders", 480.0)
        },
        "ius": [],
        "analyzePlanPipelines": []
    }));
    let (left, join, right) = (OpId::new(1), OpId::new(2), OpId::new(3));
    assert_eq!(
        classify(&plan, 1, &[left, join]).unwrap(),
        OperatorStage::Probe
    );
    let error = classify(&plan, 1, &[right, join]).unwrap_err();
    assert!(error.to_string().contains("never be a pipeline"));
}

#[test]
fn group_join_stage_depends_on_the_feeding_side() {
    let plan = parse_plan(json!({
        "plan": {
            "operator": "groupjoin",
            "operatorId": 2,
            "analyzePlanId": 2,
            "analyzePlanCardinality": 50.0,
            "producedIUs": [],
            "restrictions": [],
            "residuals": [],
            "left": scan_node("tablescan", 1, 1, "lineitem", 1000.0),
            "right": scan_node("tablescan2", 3, 3, "orders", 480.0)
        },
        "ius": [],
        "analyzePlanPipelines": []
    }));
    let (left, join, right) = (OpId::new(1), OpId::new(2), OpId::new(3));
    assert_eq!(classify(&plan, 0, &[join]).unwrap(), OperatorStage::Scan);
    assert_eq!(
        classify(&plan, 1, &[left, join]).unwrap(),
        OperatorStage::Build
    );
    assert_eq!(
        classify(&plan, 1, &[right, join]).unwrap(),
        OperatorStage::Probe
    );
}

#[test]
fn multi_way_join_scans_first_then_builds() {
    let plan = parse_plan(json!({
        "plan": {
            "operator": "multiwayjoin",
            "operatorId": 3,
            "analyzePlanId": 3,
            "analyzePlanCardinality": 2000.0,
            "producedIUs": [],
            "restrictions": [],
            "residuals": [],
            "inputs": [
                {"op": scan_node("tablescan", 1, 1, "lineitem", 1000.0)},
                {"op": scan_node("tablescan2", 2, 2, "orders", 480.0)}
            ]
        },
        "ius": [],
        "analyzePlanPipelines": []
    }));
    let join = OpId::new(3);
    // a multi-way join has no single input
    assert_eq!(plan.operator(join).unwrap().input_cardinality, 0.0);
    assert_eq!(classify(&plan, 0, &[join]).unwrap(), OperatorStage::Scan);
    assert_eq!(
        classify(&plan, 1, &[OpId::new(1), join]).unwrap(),
        OperatorStage::Build
    );
}

#[test]
fn analyze_plan_operator_has_no_stage_rule() {
    let telemetry = PlanTelemetry::from_value(json!({
        "plan": {
            "operator": "analyzeplan",
            "operatorId": 2,
            "analyzePlanId": 2,
            "analyzePlanCardinality": 1.0,
            "producedIUs": [],
            "restrictions": [],
            "residuals": [],
            "input": {
                "operator": "tablescan",
                "operatorId": 1,
                "analyzePlanId": 1,
                "analyzePlanCardinality": 1000.0,
                "producedIUs": [],
                "restrictions": [],
                "residuals": [],
                "tablename": "lineitem"
            }
        },
        "ius": [],
        "analyzePlanPipelines": [
            {"operators": [1, 2], "start": 0.0, "stop": 10.0, "duration": 10.0}
        ]
    }))
    .unwrap();
    let plan = QueryPlan::parse(&telemetry, &schema(), false).unwrap();
    assert!(build_pipelines(&plan, &telemetry.analyze_plan_pipelines).is_err());
}

#[test]
fn unknown_pipeline_step_is_fatal() {
    let (plan, _) = parse(&fixtures::scan_telemetry());
    let raw = vec![planlat_plan::RawPipeline {
        operators: vec![99],
        start: 0.0,
        stop: 1.0,
        duration: 1.0,
    }];
    assert!(build_pipelines(&plan, &raw).is_err());
}

#[test]
fn union_all_fix_up_redistributes_the_tail() {
    let (plan, pipelines) = parse(&fixtures::union_all_telemetry());
    let union = OpId::new(23);
    let sort = OpId::new(24);

    // the tail pipeline has been emptied and its window zeroed
    assert!(pipelines[2].phases.is_empty());
    assert_eq!(pipelines[2].start, 0.0);
    assert_eq!(pipelines[2].stop, 0.0);

    // each branch now ends pass-through into the union, then replays the sort
    for (index, fraction) in [(0usize, 0.4), (1, 0.6)] {
        let phases = &pipelines[index].phases;
        assert_eq!(phases.len(), 3);
        assert_eq!(phases[1].op, union);
        assert_eq!(phases[1].stage, OperatorStage::PassThrough);
        assert_eq!(phases[2].op, sort);
        assert_eq!(phases[2].stage, OperatorStage::Build);
        assert!((phases[2].fraction - fraction).abs() < 1e-12);
    }

    // the replayed fractions of the sort cover its full cardinality
    let total: f64 = pipelines
        .iter()
        .flat_map(|p| &p.phases)
        .filter(|phase| phase.op == sort)
        .map(|phase| phase.fraction)
        .sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(plan.operator(union).unwrap().union_all);
}

#[test]
fn intersect_pipelines_are_not_fixed_up() {
    let (_, pipelines) = parse(&fixtures::intersect_telemetry());
    assert_eq!(stages(&pipelines[0]), vec![OperatorStage::Scan]);
    assert_eq!(
        stages(&pipelines[1]),
        vec![OperatorStage::Scan, OperatorStage::Build]
    );
    assert_eq!(
        stages(&pipelines[2]),
        vec![OperatorStage::Scan, OperatorStage::Build]
    );
    assert!(pipelines.iter().all(|p| !p.phases.is_empty()));
}
