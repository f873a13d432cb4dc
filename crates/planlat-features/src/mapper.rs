//! Phase featurization and matrix assembly.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use planlat_pipeline::{ExecutionPhase, OperatorStage, Pipeline};
use planlat_plan::{OperatorType, QueryPlan};

use crate::error::{Error, Result};
use crate::taxonomy::{enumerate_features, Feature, QualifiedFeature};

static GLOBAL: Lazy<FeatureMapper> = Lazy::new(FeatureMapper::new);

/// Maps execution phases into the global feature-vector layout.
pub struct FeatureMapper {
    features: Vec<QualifiedFeature>,
    lookup: HashMap<(OperatorType, OperatorStage), Vec<usize>>,
}

impl Default for FeatureMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureMapper {
    pub fn new() -> Self {
        let features = enumerate_features();
        let mut lookup: HashMap<(OperatorType, OperatorStage), Vec<usize>> = HashMap::new();
        for (index, qf) in features.iter().enumerate() {
            lookup.entry((qf.kind, qf.stage)).or_default().push(index);
        }
        Self { features, lookup }
    }

    /// The process-wide mapper; the layout is deterministic, so every
    /// instance is identical.
    pub fn global() -> &'static FeatureMapper {
        &GLOBAL
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    pub fn empty_vector(&self) -> Vec<f64> {
        vec![0.0; self.features.len()]
    }

    /// Index of one slot, if it is part of the layout.
    pub fn index_of(&self, qf: &QualifiedFeature) -> Option<usize> {
        self.lookup
            .get(&(qf.kind, qf.stage))?
            .iter()
            .copied()
            .find(|&i| self.features[i].feature == qf.feature)
    }

    /// Feature vector for the phase at `phase_index` of `pipeline`: raw
    /// values gathered from the phase, written into exactly the slots
    /// declared for its (kind, stage); everything else stays zero.
    pub fn phase_vector(
        &self,
        plan: &QueryPlan,
        pipeline: &Pipeline,
        phase_index: usize,
    ) -> Result<Vec<f64>> {
        let phase: &ExecutionPhase = &pipeline.phases[phase_index];
        let op = plan
            .operator(phase.op)
            .ok_or(Error::MissingOperator(phase.op))?;
        let is_last = phase_index + 1 == pipeline.phases.len();

        let mut output_cardinality = phase.effective_output_cardinality(plan, is_last)?;
        let input_cardinality = phase.effective_input_cardinality(plan)?;
        let right_input_cardinality = phase.effective_right_cardinality(plan)?;
        let mut output_size = op.output_tuple_size;
        let input_size = op
            .input_op
            .and_then(|input| plan.operator(input))
            .map(|input| input.output_tuple_size)
            .unwrap_or(0.0);
        let input_percentage = phase.input_percentage(plan, pipeline)?;
        let mut output_percentage = phase.output_percentage(plan, pipeline)?;
        let right_percentage = phase.right_percentage(plan, pipeline)?.unwrap_or(0.0);

        if op.kind == OperatorType::HashJoin && phase.stage == OperatorStage::Build {
            // the build side's "output" is its buffered input
            output_cardinality = input_cardinality;
            output_size = input_size;
            output_percentage = input_percentage;
        }

        let expressions = &op.expressions;
        let declared = self
            .lookup
            .get(&(op.kind, phase.stage))
            .ok_or(Error::NoFeatures {
                kind: op.kind,
                stage: phase.stage,
            })?;

        let mut vector = self.empty_vector();
        for &index in declared {
            vector[index] = match self.features[index].feature {
                Feature::OutCard => output_cardinality,
                Feature::InCard => input_cardinality,
                Feature::OutSize => output_size,
                Feature::InSize => input_size,
                Feature::Const => 1.0,
                Feature::InPercentage => input_percentage,
                Feature::OutPercentage => output_percentage,
                Feature::RightPercentage => right_percentage,
                Feature::RightCard => right_input_cardinality,
                Feature::LikeCount => expressions.like_count as f64,
                Feature::LikePercentage => expressions.like_selectivity,
                Feature::CompareCount => expressions.compare_count as f64,
                Feature::ComparePercentage => expressions.compare_selectivity,
                Feature::InExpressionCount => expressions.in_expression_count as f64,
                Feature::InExpressionPercentage => expressions.in_expression_selectivity,
                Feature::BetweenCount => expressions.between_count as f64,
                Feature::BetweenPercentage => expressions.between_selectivity,
                Feature::OrExpCount => expressions.or_expression_count as f64,
                Feature::OrExpPercentage => expressions.or_selectivity,
                Feature::StartsWithCount => expressions.starts_with_count as f64,
                Feature::StartsWithPercentage => expressions.starts_with_selectivity,
                Feature::JoinFilterCount => expressions.join_filter_count as f64,
                Feature::FalseCount => expressions.false_count as f64,
                Feature::EmptyOutput => {
                    if output_cardinality == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                }
                // per-pipeline globals are not part of the per-phase layout
                Feature::PipelineScanCard | Feature::PipelineSinkCard => 0.0,
            };
        }
        Ok(vector)
    }

    /// One row per execution phase across all pipelines.
    pub fn operator_matrix(
        &self,
        plan: &QueryPlan,
        pipelines: &[Pipeline],
    ) -> Result<Vec<Vec<f64>>> {
        let mut rows = Vec::new();
        for pipeline in pipelines {
            for phase_index in 0..pipeline.phases.len() {
                rows.push(self.phase_vector(plan, pipeline, phase_index)?);
            }
        }
        Ok(rows)
    }

    /// One row per pipeline: phase vectors summed. Emptied pipelines (union
    /// tails) contribute a zero row.
    pub fn pipeline_matrix(
        &self,
        plan: &QueryPlan,
        pipelines: &[Pipeline],
    ) -> Result<Vec<Vec<f64>>> {
        let mut rows = Vec::with_capacity(pipelines.len());
        for pipeline in pipelines {
            let mut row = self.empty_vector();
            for phase_index in 0..pipeline.phases.len() {
                let vector = self.phase_vector(plan, pipeline, phase_index)?;
                for (slot, value) in row.iter_mut().zip(vector) {
                    *slot += value;
                }
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// One matrix per pipeline, one row per phase.
    pub fn pipeline_matrices(
        &self,
        plan: &QueryPlan,
        pipelines: &[Pipeline],
    ) -> Result<Vec<Vec<Vec<f64>>>> {
        let mut matrices = Vec::with_capacity(pipelines.len());
        for pipeline in pipelines {
            let mut rows = Vec::with_capacity(pipeline.phases.len());
            for phase_index in 0..pipeline.phases.len() {
                rows.push(self.phase_vector(plan, pipeline, phase_index)?);
            }
            matrices.push(rows);
        }
        Ok(matrices)
    }

    /// The whole-query vector: sum over every phase of every pipeline.
    pub fn query_vector(&self, plan: &QueryPlan, pipelines: &[Pipeline]) -> Result<Vec<f64>> {
        let mut total = self.empty_vector();
        for row in self.operator_matrix(plan, pipelines)? {
            for (slot, value) in total.iter_mut().zip(row) {
                *slot += value;
            }
        }
        Ok(total)
    }

    pub fn pipeline_scan_sizes(
        plan: &QueryPlan,
        pipelines: &[Pipeline],
    ) -> Result<Vec<f64>> {
        pipelines
            .iter()
            .map(|p| Ok(p.scan_cardinality(plan)?))
            .collect()
    }

    /// Human-readable slot names, in layout order.
    pub fn names(&self) -> Vec<String> {
        self.features.iter().map(QualifiedFeature::name).collect()
    }

    /// The stable `operator_type -> stage -> feature -> index` encoding
    /// shared with stored models. Lower-cased JSON; byte-for-byte stable
    /// across runs.
    pub fn portable_encoding(&self) -> Result<String> {
        let mut encoding: BTreeMap<&str, BTreeMap<&str, BTreeMap<&str, usize>>> = BTreeMap::new();
        for (index, qf) in self.features.iter().enumerate() {
            encoding
                .entry(qf.kind.as_str())
                .or_default()
                .entry(qf.stage.as_str())
                .or_default()
                .insert(qf.feature.as_str(), index);
        }
        Ok(serde_json::to_string(&encoding)?.to_lowercase())
    }
}
