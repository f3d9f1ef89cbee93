#![forbid(unsafe_code)]
//! wsi-anon-exec: drives one anonymization run.
//!
//! `BatchPipeline` loads and validates records, hands each eligible one to a
//! `SlideAnonymizer`, and feeds outcomes to a `ResultReporter` as they arrive.
//! The external redaction tool sits behind the `Redactor` trait.

pub mod anonymizer;
pub mod metrics;
pub mod pipeline;
pub mod redactor;
pub mod reporter;
pub mod scheduler;

pub use anonymizer::SlideAnonymizer;
pub use pipeline::{BatchPipeline, ExecError, RunReport, RunState, RunStats};
pub use redactor::{CommandRedactor, RedactError, Redactor};
pub use reporter::ResultReporter;
