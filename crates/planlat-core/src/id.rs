//! Strongly-typed identifiers used across the estimator.
//!
//! Downstream crates (plan, pipeline, features, bench) should *not* use raw
//! integers for telemetry ids.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! new_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(v: u64) -> Self {
                Self(v)
            }
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

// OpId is the telemetry `operatorId`, unique per query plan. StepId is the
// telemetry `analyzePlanId`, the key pipeline records reference operators by.
new_id!(OpId);
new_id!(StepId);
