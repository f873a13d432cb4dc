//! Estimation accuracy metrics.
//!
//! The q-error is the symmetric relative error used throughout the integrity
//! checks and the (external) estimator evaluation.

/// Values at or below this are clamped before forming the ratio.
pub const Q_ERROR_CUTOFF: f64 = 1e-10;

/// `max(real/estimate, estimate/real)`, both sides clamped to the cutoff.
pub fn q_error(real: f64, estimate: f64) -> f64 {
    debug_assert!(real >= 0.0, "real runtime should be >= 0 but is {real}");
    debug_assert!(estimate >= 0.0);
    let real = real.max(Q_ERROR_CUTOFF);
    let estimate = estimate.max(Q_ERROR_CUTOFF);
    (real / estimate).max(estimate / real)
}

pub fn abs_error(real: f64, estimate: f64) -> f64 {
    (real - estimate).max(estimate - real)
}

/// Interpolated median: mean of the two middle elements for even counts.
pub fn median(samples: &[f64]) -> f64 {
    debug_assert!(!samples.is_empty());
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// The lower-median *element*: for even counts the smaller of the two
/// middles. Used where a reference sample (not an interpolated value) is
/// needed, e.g. outlier detection over runtime samples.
pub fn median_element(samples: &[f64]) -> f64 {
    debug_assert!(!samples.is_empty());
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted[(sorted.len() - 1) / 2]
}
