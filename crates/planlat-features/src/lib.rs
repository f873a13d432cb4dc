#![forbid(unsafe_code)]
//! planlat-features: execution phases → fixed-width numeric feature vectors.
//!
//! The set of (operator kind, stage, feature) triples is a closed,
//! declarative table (`taxonomy`); enumerating it in declaration order
//! yields the global vector layout, identical for every query. The mapper
//! fills the declared slots per phase and assembles per-operator,
//! per-pipeline, and whole-query matrices (`mapper`).

pub mod error;
pub mod mapper;
pub mod taxonomy;

pub use error::{Error, Result};
pub use mapper::FeatureMapper;
pub use taxonomy::{Feature, FeatureDim, QualifiedFeature};
