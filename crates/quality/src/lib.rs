//! Case validation.
//!
//! Completeness, educational quality, and medical accuracy checks, and the
//! engine that combines them into a scored report.

#![warn(missing_docs)]

pub mod accuracy;
pub mod completeness;
pub mod educational;
pub mod engine;
pub mod report;

pub use accuracy::AccuracyChecker;
pub use completeness::{CompletenessChecker, CompletenessOutcome, RequiredSection};
pub use educational::{CheckOutcome, QualityChecker};
pub use engine::{parse_content_lenient, ValidationEngine};
pub use report::render_report;
