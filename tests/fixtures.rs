//! Shared telemetry fixtures for the integration tests.
#![allow(dead_code)]

use planlat_core::{Schema, TableStats};
use planlat_pipeline::{build_pipelines, Pipeline};
use planlat_plan::{PlanTelemetry, QueryPlan};
use serde_json::{json, Value};

pub fn schema() -> Schema {
    Schema::new(
        "bench",
        [
            TableStats {
                name: "lineitem".into(),
                row_count: 1000,
            },
            TableStats {
                name: "orders".into(),
                row_count: 500,
            },
            TableStats {
                name: "supplier".into(),
                row_count: 10,
            },
        ],
    )
}

pub fn parse(telemetry: &Value) -> (QueryPlan, Vec<Pipeline>) {
    let telemetry = PlanTelemetry::from_value(telemetry.clone()).expect("telemetry should decode");
    let plan = QueryPlan::parse(&telemetry, &schema(), false).expect("plan should parse");
    let pipelines =
        build_pipelines(&plan, &telemetry.analyze_plan_pipelines).expect("pipelines should build");
    (plan, pipelines)
}

/// Single table scan, one pipeline.
pub fn scan_telemetry() -> Value {
    json!({
        "plan": {
            "operator": "tablescan",
            "operatorId": 1,
            "analyzePlanId": 1,
            "cardinality": 900.0,
            "analyzePlanCardinality": 1000.0,
            "producedIUs": ["l_orderkey", {"estimatedSize": 4.0}],
            "restrictions": [],
            "residuals": [],
            "tablename": "lineitem"
        },
        "ius": [{"iu": "l_orderkey", "estimatedSize": 8.0}],
        "analyzePlanPipelines": [
            {"operators": [1], "start": 0.0, "stop": 100.0, "duration": 100.0}
        ]
    })
}

/// Table scan with two restrictions: an equality and a LIKE.
pub fn filtered_scan_telemetry() -> Value {
    json!({
        "plan": {
            "operator": "tablescan",
            "operatorId": 1,
            "analyzePlanId": 1,
            "cardinality": 10.0,
            "analyzePlanCardinality": 0.0,
            "producedIUs": ["l_orderkey"],
            "restrictions": [
                {"expression": "compare", "direction": "="},
                {"expression": "like"}
            ],
            "residuals": [],
            "tablename": "lineitem"
        },
        "ius": [{"iu": "l_orderkey", "estimatedSize": 8.0}],
        "analyzePlanPipelines": [
            {"operators": [1], "start": 0.0, "stop": 100.0, "duration": 100.0}
        ]
    })
}

fn join_plan_node() -> Value {
    json!({
        "operator": "join",
        "operatorId": 13,
        "analyzePlanId": 3,
        "physicalOperator": "hashjoin",
        "analyzePlanCardinality": 800.0,
        "producedIUs": ["l_orderkey", "o_orderkey"],
        "restrictions": [],
        "residuals": [],
        "left": {
            "operator": "tablescan",
            "operatorId": 11,
            "analyzePlanId": 1,
            "cardinality": 1100.0,
            "analyzePlanCardinality": 1000.0,
            "producedIUs": ["l_orderkey"],
            "restrictions": [],
            "residuals": [],
            "tablename": "lineitem"
        },
        "right": {
            "operator": "tablescan2",
            "operatorId": 12,
            "analyzePlanId": 2,
            "cardinality": 480.0,
            "analyzePlanCardinality": 500.0,
            "producedIUs": ["o_orderkey"],
            "restrictions": [],
            "residuals": [],
            "tablename": "orders"
        }
    })
}

/// Hash join fed by two scans, aggregated by a group-by.
///
/// Pipelines: build side `[t1, join]`, probe side `[t2, join, groupby]`, and
/// the group-by's own scan pipeline. The first record lists its operators
/// out of data-flow order on purpose.
pub fn join_telemetry() -> Value {
    join_telemetry_with_timing([(0.0, 10.0), (10.0, 40.0), (40.0, 50.0)])
}

pub fn join_telemetry_with_timing(timing: [(f64, f64); 3]) -> Value {
    json!({
        "plan": {
            "operator": "groupby",
            "operatorId": 14,
            "analyzePlanId": 4,
            "analyzePlanCardinality": 10.0,
            "producedIUs": [{"estimatedSize": 16.0}],
            "restrictions": [],
            "residuals": [],
            "input": join_plan_node()
        },
        "ius": [
            {"iu": "l_orderkey", "estimatedSize": 8.0},
            {"iu": "o_orderkey", "estimatedSize": 4.0}
        ],
        "analyzePlanPipelines": [
            {"operators": [3, 1], "start": timing[0].0, "stop": timing[0].1, "duration": 0.0},
            {"operators": [2, 3, 4], "start": timing[1].0, "stop": timing[1].1, "duration": 0.0},
            {"operators": [4], "start": timing[2].0, "stop": timing[2].1, "duration": 0.0}
        ]
    })
}

/// A union-all over two scans, sorted afterwards. The engine reports the
/// post-union work as its own (misattributed) pipeline.
pub fn union_all_telemetry() -> Value {
    json!({
        "plan": {
            "operator": "sort",
            "operatorId": 24,
            "analyzePlanId": 4,
            "analyzePlanCardinality": 1000.0,
            "producedIUs": [{"estimatedSize": 8.0}],
            "restrictions": [],
            "residuals": [],
            "input": {
                "operator": "setoperation",
                "operatorId": 23,
                "analyzePlanId": 3,
                "operation": "unionall",
                "analyzePlanCardinality": 1000.0,
                "producedIUs": [{"estimatedSize": 8.0}],
                "restrictions": [],
                "residuals": [],
                "arguments": [
                    {"input": {
                        "operator": "tablescan",
                        "operatorId": 21,
                        "analyzePlanId": 1,
                        "cardinality": 380.0,
                        "analyzePlanCardinality": 400.0,
                        "producedIUs": ["l_orderkey"],
                        "restrictions": [],
                        "residuals": [],
                        "tablename": "lineitem"
                    }},
                    {"input": {
                        "operator": "tablescan2",
                        "operatorId": 22,
                        "analyzePlanId": 2,
                        "cardinality": 580.0,
                        "analyzePlanCardinality": 600.0,
                        "producedIUs": ["o_orderkey"],
                        "restrictions": [],
                        "residuals": [],
                        "tablename": "orders"
                    }}
                ]
            }
        },
        "ius": [
            {"iu": "l_orderkey", "estimatedSize": 8.0},
            {"iu": "o_orderkey", "estimatedSize": 4.0}
        ],
        "analyzePlanPipelines": [
            {"operators": [1, 3], "start": 0.0, "stop": 20.0, "duration": 20.0},
            {"operators": [2, 3], "start": 20.0, "stop": 50.0, "duration": 30.0},
            {"operators": [3, 4], "start": 50.0, "stop": 60.0, "duration": 10.0}
        ]
    })
}

/// An intersect whose branch pipeline overlaps the downstream pipeline: the
/// visible symptom of set-operation misreporting, resolved by clamping.
pub fn intersect_telemetry() -> Value {
    json!({
        "plan": {
            "operator": "sort",
            "operatorId": 34,
            "analyzePlanId": 4,
            "analyzePlanCardinality": 100.0,
            "producedIUs": [{"estimatedSize": 8.0}],
            "restrictions": [],
            "residuals": [],
            "input": {
                "operator": "setoperation",
                "operatorId": 33,
                "analyzePlanId": 3,
                "operation": "intersect",
                "analyzePlanCardinality": 100.0,
                "producedIUs": [{"estimatedSize": 8.0}],
                "restrictions": [],
                "residuals": [],
                "arguments": [
                    {"input": {
                        "operator": "tablescan",
                        "operatorId": 31,
                        "analyzePlanId": 1,
                        "cardinality": 280.0,
                        "analyzePlanCardinality": 300.0,
                        "producedIUs": ["l_orderkey"],
                        "restrictions": [],
                        "residuals": [],
                        "tablename": "lineitem"
                    }},
                    {"input": {
                        "operator": "tablescan2",
                        "operatorId": 32,
                        "analyzePlanId": 2,
                        "cardinality": 180.0,
                        "analyzePlanCardinality": 200.0,
                        "producedIUs": ["o_orderkey"],
                        "restrictions": [],
                        "residuals": [],
                        "tablename": "orders"
                    }}
                ]
            }
        },
        "ius": [
            {"iu": "l_orderkey", "estimatedSize": 8.0},
            {"iu": "o_orderkey", "estimatedSize": 4.0}
        ],
        "analyzePlanPipelines": [
            {"operators": [2], "start": 0.0, "stop": 10.0, "duration": 10.0},
            {"operators": [1, 3], "start": 10.0, "stop": 40.0, "duration": 30.0},
            {"operators": [3, 4], "start": 30.0, "stop": 60.0, "duration": 30.0}
        ]
    })
}

/// Scan materialized into a temp buffer, scanned again by a second pipeline.
pub fn temp_telemetry(first: (f64, f64), second: (f64, f64)) -> Value {
    json!({
        "plan": {
            "operator": "temp",
            "operatorId": 42,
            "analyzePlanId": 2,
            "analyzePlanCardinality": 1000.0,
            "producedIUs": ["l_orderkey"],
            "restrictions": [],
            "residuals": [],
            "input": {
                "operator": "tablescan",
                "operatorId": 41,
                "analyzePlanId": 1,
                "cardinality": 1000.0,
                "analyzePlanCardinality": 1000.0,
                "producedIUs": ["l_orderkey"],
                "restrictions": [],
                "residuals": [],
                "tablename": "lineitem"
            }
        },
        "ius": [{"iu": "l_orderkey", "estimatedSize": 8.0}],
        "analyzePlanPipelines": [
            {"operators": [1, 2], "start": first.0, "stop": first.1, "duration": 0.0},
            {"operators": [2], "start": second.0, "stop": second.1, "duration": 0.0}
        ]
    })
}

/// A join of two pipeline-breaker scans over the same temp buffer: the temp
/// node appears twice in the raw record with one operator id.
pub fn shared_temp_telemetry() -> Value {
    let temp = json!({
        "operator": "temp",
        "operatorId": 52,
        "analyzePlanId": 2,
        "analyzePlanCardinality": 1000.0,
        "producedIUs": ["l_orderkey"],
        "restrictions": [],
        "residuals": [],
        "input": {
            "operator": "tablescan",
            "operatorId": 51,
            "analyzePlanId": 1,
            "cardinality": 1000.0,
            "analyzePlanCardinality": 1000.0,
            "producedIUs": ["l_orderkey"],
            "restrictions": [],
            "residuals": [],
            "tablename": "lineitem"
        }
    });
    json!({
        "plan": {
            "operator": "join",
            "operatorId": 55,
            "analyzePlanId": 5,
            "physicalOperator": "hashjoin",
            "analyzePlanCardinality": 1000.0,
            "producedIUs": [],
            "restrictions": [],
            "residuals": [],
            "left": {
                "operator": "pipelinebreakerscan",
                "operatorId": 53,
                "analyzePlanId": 3,
                "analyzePlanCardinality": 1000.0,
                "producedIUs": ["l_orderkey"],
                "restrictions": [],
                "residuals": [],
                "pipelineBreaker": temp.clone()
            },
            "right": {
                "operator": "pipelinebreakerscan2",
                "operatorId": 54,
                "analyzePlanId": 4,
                "analyzePlanCardinality": 1000.0,
                "producedIUs": ["l_orderkey"],
                "restrictions": [],
                "residuals": [],
                "pipelineBreaker": temp
            }
        },
        "ius": [{"iu": "l_orderkey", "estimatedSize": 8.0}],
        "analyzePlanPipelines": [
            {"operators": [1, 2], "start": 0.0, "stop": 10.0, "duration": 10.0},
            {"operators": [3, 5], "start": 10.0, "stop": 20.0, "duration": 10.0},
            {"operators": [4, 5], "start": 20.0, "stop": 30.0, "duration": 10.0}
        ]
    })
}
