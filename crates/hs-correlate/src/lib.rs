//! Correlation of HS codes between nomenclature versions.
//!
//! The engine never turns a declared split or merge into a one-to-one
//! mapping: ambiguity that comes from the nomenclature itself is reported as
//! [`Confidence::Split`] or [`Confidence::Merge`], heuristic ambiguity as
//! [`Confidence::Uncertain`].

mod engine;
mod error;
mod path;

pub use engine::CorrelationEngine;
pub use error::{CorrelateError, Result};

pub use hs_model::{Alternative, Confidence, Conversion, FallbackLevel};
