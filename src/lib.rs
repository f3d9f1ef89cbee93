#![forbid(unsafe_code)]
//! wsi-anonymize: manifest-driven label removal for whole-slide images.
//!
//! Facade over the workspace crates; the binary lives in `wsi-anon-cli`.

pub use wsi_anon_core::prelude::*;
pub use wsi_anon_exec::{
    BatchPipeline, CommandRedactor, RedactError, Redactor, ResultReporter, RunReport, RunState,
};
pub use wsi_anon_io::{OutputLayout, StatusPayload};
