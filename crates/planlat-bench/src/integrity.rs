//! Soft data-integrity checks over benchmarked queries.
//!
//! Failures here are reported and counted, never fatal: the caller's retry
//! policy decides whether to re-fetch telemetry or accept the discrepancy.

use planlat_core::{abs_error, median_element, q_error, EstimatorConfig};
use serde::Serialize;

use crate::query::BenchmarkedQuery;

/// The runtime samples must contain enough non-outlier runs: a sample is an
/// outlier when it is both more than the q-error limit and more than the
/// absolute floor away from the median run.
pub fn check_runtimes_integrity(query: &BenchmarkedQuery, config: &EstimatorConfig) -> bool {
    let runs = query.total_runtimes();
    let n_runs = runs.len();
    if n_runs < config.min_runs {
        tracing::warn!(
            query = %query.name(),
            n_runs,
            expected = config.min_runs,
            "too few benchmark runs"
        );
        return false;
    }

    let reference = median_element(runs);
    let n_outliers = runs
        .iter()
        .filter(|&&t| {
            q_error(reference, t) > config.runtime_q_error_limit
                && abs_error(reference, t) >= config.runtime_absolute_error_floor
        })
        .count();
    let n_non_outliers = n_runs - n_outliers;
    let required = config
        .min_non_outliers
        .max(((1.0 - config.max_outlier_fraction) * n_runs as f64) as usize);
    if n_non_outliers < required {
        tracing::warn!(
            query = %query.name(),
            n_non_outliers,
            required,
            ?runs,
            "insufficient number of non-outlier runs"
        );
        return false;
    }
    true
}

/// The analyze-plan-derived duration must be plausible against the measured
/// median runtime.
pub fn check_analyze_plan_duration_integrity(
    query: &BenchmarkedQuery,
    config: &EstimatorConfig,
) -> bool {
    let measured = query.total_runtime();
    let analyze = query.analyze_plan_runtime();
    let error = q_error(measured, analyze);
    if error > config.analyze_duration_q_error_limit {
        tracing::warn!(
            query = %query.name(),
            measured,
            analyze,
            q_error = error,
            "analyze plan duration is way off of benchmarked time"
        );
        return false;
    }
    true
}

pub fn check_single_integrity(query: &BenchmarkedQuery, config: &EstimatorConfig) -> bool {
    let runtimes_ok = check_runtimes_integrity(query, config);
    let duration_ok = check_analyze_plan_duration_integrity(query, config);
    runtimes_ok && duration_ok
}

/// Failure counts for data-quality reporting.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IntegrityStats {
    pub checked: usize,
    pub runtime_failures: usize,
    pub duration_failures: usize,
}

impl IntegrityStats {
    pub fn record(&mut self, query: &BenchmarkedQuery, config: &EstimatorConfig) {
        self.checked += 1;
        if !check_runtimes_integrity(query, config) {
            self.runtime_failures += 1;
        }
        if !check_analyze_plan_duration_integrity(query, config) {
            self.duration_failures += 1;
        }
    }

    pub fn all_passed(&self) -> bool {
        self.runtime_failures == 0 && self.duration_failures == 0
    }
}

/// Check a whole batch, accumulating counts.
pub fn check_batch<'a>(
    queries: impl IntoIterator<Item = &'a BenchmarkedQuery>,
    config: &EstimatorConfig,
) -> IntegrityStats {
    let mut stats = IntegrityStats::default();
    for query in queries {
        stats.record(query, config);
    }
    stats
}
