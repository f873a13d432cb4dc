//! The closed feature taxonomy.
//!
//! `PIPELINE_TIME_FEATURES` is a literal, ordered, version-controlled table:
//! for each (operator kind, stage) pair that can legally occur, the feature
//! dimensions that apply to it. The global vector layout is generated from
//! this table deterministically, so trained models and stored feature
//! matrices stay index-compatible as long as the table is unchanged.

use planlat_pipeline::OperatorStage;
use planlat_plan::OperatorType;
use serde::{Deserialize, Serialize};

/// Scalar features a phase can contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Feature {
    /// Cardinality of input, used for scan operators (once per pipeline).
    InCard,
    /// Size of a tuple scanned by the pipeline (once per pipeline).
    InSize,
    /// Cardinality of output, used for sink operators (once per pipeline).
    OutCard,
    /// Size of a tuple materialized at the end of the pipeline.
    OutSize,
    EmptyOutput,

    // global features once per pipeline (not part of the per-phase layout)
    PipelineScanCard,
    PipelineSinkCard,

    /// Counter for the number of occurrences of each (kind, stage).
    Const,
    /// Share of the pipeline's tuples reaching this operator's input.
    InPercentage,
    /// Share of the pipeline's tuples in this operator's right input.
    RightPercentage,
    /// Share of the pipeline's tuples in this operator's output.
    OutPercentage,
    RightCard,

    // expression features for table scans
    LikeCount,
    LikePercentage,
    CompareCount,
    ComparePercentage,
    InExpressionCount,
    InExpressionPercentage,
    BetweenCount,
    BetweenPercentage,
    OrExpCount,
    OrExpPercentage,
    StartsWithCount,
    StartsWithPercentage,
    JoinFilterCount,
    FalseCount,
}

impl Feature {
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::InCard => "in_card",
            Feature::InSize => "in_size",
            Feature::OutCard => "out_card",
            Feature::OutSize => "out_size",
            Feature::EmptyOutput => "empty_output",
            Feature::PipelineScanCard => "pipeline_scan_card",
            Feature::PipelineSinkCard => "pipeline_sink_card",
            Feature::Const => "const",
            Feature::InPercentage => "in_percentage",
            Feature::RightPercentage => "right_percentage",
            Feature::OutPercentage => "out_percentage",
            Feature::RightCard => "right_card",
            Feature::LikeCount => "like_count",
            Feature::LikePercentage => "like_percentage",
            Feature::CompareCount => "compare_count",
            Feature::ComparePercentage => "compare_percentage",
            Feature::InExpressionCount => "in_expression_count",
            Feature::InExpressionPercentage => "in_expression_percentage",
            Feature::BetweenCount => "between_count",
            Feature::BetweenPercentage => "between_percentage",
            Feature::OrExpCount => "or_exp_count",
            Feature::OrExpPercentage => "or_exp_percentage",
            Feature::StartsWithCount => "starts_with_count",
            Feature::StartsWithPercentage => "starts_with_percentage",
            Feature::JoinFilterCount => "join_filter_count",
            Feature::FalseCount => "false_count",
        }
    }
}

/// Groups of features declared together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureDim {
    Scan,
    Sink,
    Input,
    Out,
    Right,
    RightCard,
    InputCard,
    Expressions,
    EmptyOutput,
}

impl FeatureDim {
    pub fn features(self) -> &'static [Feature] {
        match self {
            FeatureDim::Scan => &[Feature::InCard, Feature::InSize],
            FeatureDim::Sink => &[Feature::OutCard, Feature::OutSize],
            FeatureDim::Out => &[Feature::OutPercentage],
            FeatureDim::Input => &[Feature::InPercentage],
            FeatureDim::Right => &[Feature::RightPercentage],
            FeatureDim::RightCard => &[Feature::RightCard],
            FeatureDim::InputCard => &[Feature::InCard],
            FeatureDim::Expressions => &[
                Feature::LikePercentage,
                Feature::ComparePercentage,
                Feature::InExpressionPercentage,
                Feature::BetweenPercentage,
                Feature::OrExpPercentage,
                Feature::StartsWithPercentage,
            ],
            FeatureDim::EmptyOutput => &[Feature::EmptyOutput],
        }
    }
}

/// One slot of the global layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedFeature {
    pub kind: OperatorType,
    pub stage: OperatorStage,
    pub feature: Feature,
}

impl QualifiedFeature {
    pub fn name(&self) -> String {
        format!(
            "{}_{}_{}",
            self.kind.as_str(),
            self.stage.as_str(),
            self.feature.as_str()
        )
    }
}

type StageDims = (OperatorStage, &'static [FeatureDim]);

/// The feature dimensions applicable per (operator kind, stage).
pub(crate) const PIPELINE_TIME_FEATURES: &[(OperatorType, &[StageDims])] = &[
    (
        OperatorType::TableScan,
        &[(
            OperatorStage::Scan,
            &[
                FeatureDim::Scan,
                FeatureDim::Out,
                FeatureDim::Expressions,
                FeatureDim::EmptyOutput,
            ],
        )],
    ),
    (
        OperatorType::InlineTable,
        &[(OperatorStage::Scan, &[FeatureDim::Scan, FeatureDim::Out])],
    ),
    (
        OperatorType::PipelineBreakerScan,
        &[(OperatorStage::Scan, &[FeatureDim::Scan, FeatureDim::Out])],
    ),
    (
        OperatorType::Temp,
        &[(OperatorStage::Build, &[FeatureDim::Sink, FeatureDim::Input])],
    ),
    (
        OperatorType::EarlyExecution,
        &[(OperatorStage::Scan, &[FeatureDim::Out])],
    ),
    (
        OperatorType::Select,
        &[(
            OperatorStage::PassThrough,
            &[FeatureDim::Input, FeatureDim::Out],
        )],
    ),
    (
        OperatorType::Map,
        &[(
            OperatorStage::PassThrough,
            &[FeatureDim::Input, FeatureDim::Out],
        )],
    ),
    (
        OperatorType::MultiWayJoin,
        &[
            (OperatorStage::Build, &[FeatureDim::Sink, FeatureDim::Input]),
            (OperatorStage::Scan, &[FeatureDim::Scan, FeatureDim::Out]),
        ],
    ),
    (
        OperatorType::HashJoin,
        &[
            (OperatorStage::Build, &[FeatureDim::Sink, FeatureDim::Input]),
            // while probing, the size of the hash table might matter too,
            // but it does not add up across phases
            (
                OperatorStage::Probe,
                &[FeatureDim::InputCard, FeatureDim::Right, FeatureDim::Out],
            ),
        ],
    ),
    (
        OperatorType::IndexNLJoin,
        &[(
            OperatorStage::Probe,
            &[FeatureDim::Input, FeatureDim::RightCard, FeatureDim::Out],
        )],
    ),
    (
        OperatorType::GroupJoin,
        &[
            (OperatorStage::Build, &[FeatureDim::Sink, FeatureDim::Input]),
            (
                OperatorStage::Probe,
                &[FeatureDim::Sink, FeatureDim::Right, FeatureDim::Out],
            ),
            (OperatorStage::Scan, &[FeatureDim::Scan, FeatureDim::Out]),
        ],
    ),
    (
        OperatorType::GroupBy,
        &[
            (OperatorStage::Build, &[FeatureDim::Sink, FeatureDim::Input]),
            // sink features fit the scan side of an aggregation better
            (OperatorStage::Scan, &[FeatureDim::Sink, FeatureDim::Out]),
        ],
    ),
    (
        OperatorType::Sort,
        &[
            (
                OperatorStage::Build,
                &[FeatureDim::Sink, FeatureDim::Input, FeatureDim::Out],
            ),
            (OperatorStage::Scan, &[FeatureDim::Scan, FeatureDim::Out]),
        ],
    ),
    (
        OperatorType::SetOperation,
        &[
            (OperatorStage::Build, &[FeatureDim::Sink, FeatureDim::Input]),
            (OperatorStage::Scan, &[FeatureDim::Scan, FeatureDim::Out]),
            (OperatorStage::PassThrough, &[]),
        ],
    ),
    (
        OperatorType::Window,
        &[
            (OperatorStage::Build, &[FeatureDim::Sink, FeatureDim::Input]),
            (OperatorStage::Scan, &[FeatureDim::Scan, FeatureDim::Out]),
        ],
    ),
    (
        OperatorType::FileOutput,
        &[(OperatorStage::Build, &[FeatureDim::Sink, FeatureDim::Input])],
    ),
    (
        OperatorType::CsvWriter,
        &[(OperatorStage::Build, &[FeatureDim::Sink, FeatureDim::Input])],
    ),
    (
        OperatorType::AssertSingle,
        &[(OperatorStage::PassThrough, &[FeatureDim::Input])],
    ),
    (
        OperatorType::EarlyProbe,
        &[(OperatorStage::PassThrough, &[FeatureDim::Out])],
    ),
];

/// Enumerate every slot of the global layout, in table order: a `const`
/// occurrence counter per (kind, stage), then the declared dimensions.
pub(crate) fn enumerate_features() -> Vec<QualifiedFeature> {
    let mut result = Vec::new();
    for (kind, stages) in PIPELINE_TIME_FEATURES {
        for (stage, dims) in *stages {
            result.push(QualifiedFeature {
                kind: *kind,
                stage: *stage,
                feature: Feature::Const,
            });
            for dim in *dims {
                for feature in dim.features() {
                    result.push(QualifiedFeature {
                        kind: *kind,
                        stage: *stage,
                        feature: *feature,
                    });
                }
            }
        }
    }
    result
}
