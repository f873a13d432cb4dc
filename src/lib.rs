#![forbid(unsafe_code)]
//! planlat: estimate a SQL query's latency from its analyze-plan telemetry.
//!
//! Facade over the workspace crates: parse the engine's nested plan record
//! into a typed operator arena, partition it into classified pipelines,
//! reconcile pipeline timing with the measured end-to-end runtime, and
//! derive fixed-width feature vectors for the learned cost model.

pub use planlat_bench as bench;
pub use planlat_core as core;
pub use planlat_features as features;
pub use planlat_pipeline as pipeline;
pub use planlat_plan as plan;
