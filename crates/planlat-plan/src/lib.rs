#![forbid(unsafe_code)]
//! planlat-plan: from raw analyze-plan telemetry → typed operator arena.
//!
//! Responsibilities:
//! - Deserialize the engine's nested analyze-plan record into typed nodes
//!   (`raw`), each declaring exactly its expected child fields.
//! - Classify operator kinds and compute per-operator cardinalities, tuple
//!   widths, and scan-predicate statistics (`operator`, `expr`).
//! - Recursively build the id-indexed operator arena with parent/child links
//!   resolved by operator identity, deduplicating shared nodes (`parse`).
//!
//! **No I/O, no async** here. The pipeline crate consumes the arena.

pub mod error;
pub mod expr;
pub mod operator;
pub mod parse;
pub mod raw;

pub use error::{Error, Result};
pub use operator::{Expressions, Operator, OperatorType};
pub use parse::QueryPlan;
pub use raw::{ExprNode, IuRef, PlanNode, PlanTelemetry, RawPipeline};
