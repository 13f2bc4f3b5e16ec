//! Inspection and validation of evaluation records: questions, answer
//! choices, model predictions and gold answers.
//!
//! The library loads a records file once, then runs single-pass analyses
//! over the in-memory rows. The binaries under `src/bin` are thin front ends.

pub mod analyzer;
pub mod compare;
pub mod config;
pub mod distribution;
pub mod error;
pub mod export;
pub mod logging;
pub mod path;
pub mod report;
pub mod source;

pub use analyzer::{
    analyze, canonicalize, traverse, validate_membership, AllowedSet, AnalysisResult, Bucket,
    CanonicalKey, Extracted, ValidationResult, Violation,
};
pub use error::{InspectError, Result};
pub use path::FieldPath;
