#![forbid(unsafe_code)]
//! planlat-bench: pairs an analyzed plan with its measured runtimes.
//!
//! Responsibilities:
//! - `BenchmarkedQuery`: a query plan, its pipelines, and the repeated
//!   wall-clock runtime samples, with lazily-computed runtime-attribution
//!   and feature-matrix caches (`query`).
//! - Reconcile the engine's per-pipeline timing with the externally measured
//!   end-to-end runtime so the attribution sums exactly to the total.
//! - Soft data-integrity checks over runtime samples and analyze durations,
//!   surfaced as warnings and counts, never aborts (`integrity`).
//! - The benchmark-collection layer: read stored benchmark records through a
//!   bounded FIFO memo cache (`collect`).

pub mod category;
pub mod collect;
pub mod error;
pub mod integrity;
pub mod query;

pub use category::QueryCategory;
pub use collect::{read_analyzed_plan, DataCollector};
pub use error::{Error, Result};
pub use integrity::{
    check_analyze_plan_duration_integrity, check_batch, check_runtimes_integrity,
    check_single_integrity, IntegrityStats,
};
pub use query::BenchmarkedQuery;
