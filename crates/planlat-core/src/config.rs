//! Estimator configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Use the optimizer's predicted cardinalities instead of the measured
    /// analyze-plan cardinalities when featurizing.
    pub predicted_cardinalities: bool,

    /// Soft check: analyze-plan-derived duration vs. measured median runtime.
    pub analyze_duration_q_error_limit: f64,

    /// Soft check: runtime samples more than this q-error off the median run
    /// are outlier candidates.
    pub runtime_q_error_limit: f64,

    /// Deviations below this absolute bound (seconds) are never outliers.
    pub runtime_absolute_error_floor: f64,

    /// Minimum number of runtime samples per benchmarked query.
    pub min_runs: usize,

    /// At most this fraction of the samples may be outliers.
    pub max_outlier_fraction: f64,

    /// Never accept fewer non-outlier samples than this.
    pub min_non_outliers: usize,

    /// Capacity of the benchmark-collection memo cache.
    pub cache_capacity: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            predicted_cardinalities: false,
            analyze_duration_q_error_limit: 1.2,
            runtime_q_error_limit: 1.10,
            runtime_absolute_error_floor: 0.002,
            min_runs: 3,
            max_outlier_fraction: 1.0 / 3.0,
            min_non_outliers: 2,
            cache_capacity: 100,
        }
    }
}

impl EstimatorConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `PLANLAT_PREDICTED_CARDINALITIES`: "1"/"true" to featurize estimates
    /// - `PLANLAT_ANALYZE_Q_ERROR_LIMIT`: analyze-duration plausibility bound
    /// - `PLANLAT_RUNTIME_Q_ERROR_LIMIT`: runtime-sample outlier bound
    /// - `PLANLAT_CACHE_CAPACITY`: collection cache capacity
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("PLANLAT_PREDICTED_CARDINALITIES") {
            cfg.predicted_cardinalities = matches!(s.as_str(), "1" | "true" | "yes");
        }

        if let Ok(s) = std::env::var("PLANLAT_ANALYZE_Q_ERROR_LIMIT") {
            if let Ok(v) = s.parse::<f64>() {
                cfg.analyze_duration_q_error_limit = v;
            }
        }

        if let Ok(s) = std::env::var("PLANLAT_RUNTIME_Q_ERROR_LIMIT") {
            if let Ok(v) = s.parse::<f64>() {
                cfg.runtime_q_error_limit = v;
            }
        }

        if let Ok(s) = std::env::var("PLANLAT_CACHE_CAPACITY") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.cache_capacity = v;
            }
        }

        cfg
    }
}
