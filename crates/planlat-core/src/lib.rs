#![forbid(unsafe_code)]
//! planlat-core: shared leaf types for the plan-latency estimator.
//!
//! Responsibilities:
//! - Typed identifiers for telemetry operators and analyze-plan steps.
//! - Estimation metrics (q-error) used by the integrity checks.
//! - Table row-count statistics consumed by the plan parser.
//! - A bounded FIFO memo cache for the benchmark-collection layer.
//! - Estimator configuration (thresholds, cache capacity).
//!
//! **No I/O, no async** here. Everything in this crate is a pure value type.

pub mod cache;
pub mod config;
pub mod error;
pub mod id;
pub mod metrics;
pub mod schema;

pub use cache::FifoCache;
pub use config::EstimatorConfig;
pub use error::{Error, Result};
pub use id::{OpId, StepId};
pub use metrics::{abs_error, median, median_element, q_error};
pub use schema::{Schema, TableStats, TableStatsSource};
