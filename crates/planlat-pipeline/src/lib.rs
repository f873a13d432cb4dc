#![forbid(unsafe_code)]
//! planlat-pipeline: from the operator arena + raw pipeline telemetry →
//! ordered pipelines of classified execution phases.
//!
//! Responsibilities:
//! - Classify each operator's role within its pipeline (`stage`).
//! - Order each pipeline's operators by data-flow precedence and build one
//!   `ExecutionPhase` per operator (`build`).
//! - Apply the union-all fix-up: the engine misreports which pipeline a
//!   union-all's downstream work belongs to; the fix-up redistributes the
//!   misattributed tail across the contributing branches, scaled by each
//!   branch's share of the union's output (`build::fix_union_all`).

pub mod build;
pub mod error;
pub mod phase;
pub mod stage;

pub use build::{build_pipelines, fix_union_all};
pub use error::{Error, Result};
pub use phase::{ExecutionPhase, Pipeline};
pub use stage::{classify, OperatorStage};
