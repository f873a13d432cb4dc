//! One benchmarked query: analyzed plan + repeated runtime samples, with the
//! runtime-attribution algorithm that reconciles engine timing telemetry
//! with the externally measured end-to-end runtime.

use std::collections::BTreeSet;

use once_cell::sync::OnceCell;
use planlat_core::{median, q_error, OpId};
use planlat_features::FeatureMapper;
use planlat_pipeline::Pipeline;
use planlat_plan::{OperatorType, QueryPlan};

use crate::category::QueryCategory;
use crate::error::{Error, Result};

/// The attributed pipeline runtimes must reproduce the measured total within
/// this bound (seconds); the normalization makes that true up to round-off.
const ATTRIBUTION_TOLERANCE_SECS: f64 = 0.0005;

/// A benchmarked query. Everything is fixed at construction except the two
/// lazily-populated caches.
pub struct BenchmarkedQuery {
    plan: QueryPlan,
    pipelines: Vec<Pipeline>,
    total_runtimes: Vec<f64>,
    name: String,
    query_text: String,
    category: QueryCategory,

    feature_matrix: OnceCell<Vec<Vec<f64>>>,
    pipeline_runtimes: OnceCell<Vec<f64>>,
}

impl BenchmarkedQuery {
    pub fn new(
        plan: QueryPlan,
        pipelines: Vec<Pipeline>,
        total_runtimes: Vec<f64>,
        name: impl Into<String>,
        query_text: impl Into<String>,
        category: QueryCategory,
    ) -> Self {
        Self {
            plan,
            pipelines,
            total_runtimes,
            name: name.into(),
            query_text: query_text.into(),
            category,
            feature_matrix: OnceCell::new(),
            pipeline_runtimes: OnceCell::new(),
        }
    }

    pub fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    pub fn pipelines(&self) -> &[Pipeline] {
        &self.pipelines
    }

    pub fn total_runtimes(&self) -> &[f64] {
        &self.total_runtimes
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn category(&self) -> QueryCategory {
        self.category
    }

    /// The trusted end-to-end runtime: median of the repeated measurements,
    /// in seconds.
    pub fn total_runtime(&self) -> f64 {
        median(&self.total_runtimes)
    }

    /// Wall-clock span of the analyze-plan pipelines, converted from engine
    /// microseconds to seconds. A degenerate span counts as one microsecond.
    pub fn analyze_plan_runtime(&self) -> f64 {
        let mut start = f64::INFINITY;
        let mut stop = f64::NEG_INFINITY;
        for pipeline in &self.pipelines {
            for t in [pipeline.start, pipeline.stop] {
                start = start.min(t);
                stop = stop.max(t);
            }
        }
        if start >= stop {
            return 1e-6;
        }
        (stop - start) / 1_000_000.0
    }

    /// Per-pipeline share of the measured total runtime (seconds). Computed
    /// once and cached. Invariant: the shares sum to the total within 0.5 ms.
    pub fn pipeline_runtimes(&self) -> Result<&[f64]> {
        self.pipeline_runtimes
            .get_or_try_init(|| self.attribute_runtimes())
            .map(Vec::as_slice)
    }

    /// Attributed runtime divided by the pipeline's scan cardinality; a
    /// pipeline scanning nothing keeps its unscaled runtime.
    pub fn per_tuple_pipeline_runtimes(&self) -> Result<Vec<f64>> {
        let runtimes = self.pipeline_runtimes()?;
        self.pipelines
            .iter()
            .zip(runtimes)
            .map(|(pipeline, &runtime)| {
                let scan = pipeline.scan_cardinality(&self.plan)?;
                Ok(if scan == 0.0 { runtime } else { runtime / scan })
            })
            .collect()
    }

    /// Per-pipeline feature matrix (one summed row per pipeline). Computed
    /// once and cached.
    pub fn feature_matrix(&self, mapper: &FeatureMapper) -> Result<&Vec<Vec<f64>>> {
        self.feature_matrix.get_or_try_init(|| {
            mapper
                .pipeline_matrix(&self.plan, &self.pipelines)
                .map_err(Error::from)
        })
    }

    /// Training/inference pairs: per-pipeline feature row → attributed
    /// pipeline runtime.
    pub fn pipeline_runtime_data(
        &self,
        mapper: &FeatureMapper,
    ) -> Result<Vec<(Vec<f64>, f64)>> {
        let features = self.feature_matrix(mapper)?;
        let targets = self.pipeline_runtimes()?;
        Ok(features
            .iter()
            .cloned()
            .zip(targets.iter().copied())
            .collect())
    }

    /// Training/inference pairs with per-scanned-tuple targets.
    pub fn per_tuple_pipeline_runtime_data(
        &self,
        mapper: &FeatureMapper,
    ) -> Result<Vec<(Vec<f64>, f64)>> {
        let features = self.feature_matrix(mapper)?;
        let targets = self.per_tuple_pipeline_runtimes()?;
        Ok(features.iter().cloned().zip(targets).collect())
    }

    /// Whole-query pair: summed feature vector → total runtime.
    pub fn runtime_data(&self, mapper: &FeatureMapper) -> Result<(Vec<f64>, f64)> {
        let vector = mapper.query_vector(&self.plan, &self.pipelines)?;
        Ok((vector, self.total_runtime()))
    }

    /// Resolve pipeline time-range overlaps on a scratch copy of the ranges.
    /// An overlap explained by exactly one shared set operation is the
    /// visible symptom of the union-all misreporting: clamp the earlier
    /// range. Anything else is a data-integrity warning.
    fn resolve_overlaps(&self) -> Vec<(f64, f64)> {
        let mut ranges: Vec<(f64, f64)> = self
            .pipelines
            .iter()
            .map(|p| (p.start, p.stop))
            .collect();
        let mut order: Vec<usize> = (0..ranges.len()).collect();
        order.sort_by(|&a, &b| {
            ranges[a]
                .0
                .total_cmp(&ranges[b].0)
                .then(ranges[a].1.total_cmp(&ranges[b].1))
        });

        for pair in order.windows(2) {
            let (i, j) = (pair[0], pair[1]);
            if ranges[i].1 <= ranges[j].0 {
                continue;
            }
            let ops_i: BTreeSet<OpId> =
                self.pipelines[i].phases.iter().map(|p| p.op).collect();
            let ops_j: BTreeSet<OpId> =
                self.pipelines[j].phases.iter().map(|p| p.op).collect();
            let common: Vec<OpId> = ops_i.intersection(&ops_j).copied().collect();
            if common.is_empty() {
                tracing::warn!(query = %self.name, "pipelines overlap without common op");
            }
            let single_set_operation = common.len() == 1
                && self
                    .plan
                    .operator(common[0])
                    .map(|op| op.kind == OperatorType::SetOperation)
                    .unwrap_or(false);
            if single_set_operation {
                // set operations do not report their pipeline window correctly
                ranges[i].1 = ranges[j].0;
                ranges[j].1 = ranges[j].1.max(ranges[i].1);
            } else {
                tracing::warn!(
                    query = %self.name,
                    common = ?common,
                    "pipelines overlap"
                );
            }
        }
        ranges
    }

    fn attribute_runtimes(&self) -> Result<Vec<f64>> {
        let total_time = self.total_runtime();
        let analyze_runtime = self.analyze_plan_runtime();
        if q_error(total_time, analyze_runtime) >= 2.0 && total_time > 1e-5 {
            tracing::warn!(query = %self.name, "pipeline times seem off");
        }

        let ranges = self.resolve_overlaps();
        let mut result: Vec<f64> = ranges
            .iter()
            .map(|(start, stop)| (stop - start) / (analyze_runtime * 1_000_000.0) * total_time)
            .collect();

        let raw_sum: f64 = result.iter().sum();
        if (raw_sum - total_time).abs() > (total_time * 0.25).max(ATTRIBUTION_TOLERANCE_SECS) {
            tracing::warn!(
                query = %self.name,
                raw_sum,
                total_time,
                "pipeline times do not add up"
            );
        }

        if raw_sum == 0.0 {
            let share = total_time / result.len() as f64;
            result = vec![share; result.len()];
        } else {
            let correction = total_time / raw_sum;
            for runtime in &mut result {
                *runtime *= correction;
            }
        }

        let sum: f64 = result.iter().sum();
        if (sum - total_time).abs() >= ATTRIBUTION_TOLERANCE_SECS {
            return Err(Error::Attribution {
                sum,
                total: total_time,
            });
        }
        Ok(result)
    }
}
