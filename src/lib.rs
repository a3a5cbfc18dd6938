//! Core of the geomagnetic survey correction viewer.
//!
//! The numeric pipeline lives here, independent of any UI toolkit:
//!
//! ```text
//!  workbook / grid ──► SurveyTable ──► valid rows
//!                                         │
//!        auxiliary: detect_outliers ──► weighted_average ──► reference
//!        main:      correct_vectors(reference, blend_factor)
//!                                         │
//!                                         ▼
//!                                 CorrectionReport (3 vector fields)
//! ```

pub mod config;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod pipeline;

pub use config::PipelineConfig;
pub use diagnostics::{Diagnostic, DiagnosticSink, Severity};
pub use error::{Dataset, SurveyError};
pub use pipeline::{CorrectionReport, Orchestrator, RunOutcome};
