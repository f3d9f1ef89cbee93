#![forbid(unsafe_code)]
//! wsi-anon-core: error taxonomy, manifest records, run logs, and config.
//!
//! Pure data only. Reading manifests and writing artifacts lives in
//! `wsi-anon-io`; driving the external redaction tool lives in `wsi-anon-exec`.

pub mod config;
pub mod error;
pub mod prelude;
pub mod record;
pub mod runlog;
pub mod schema;
pub mod taxonomy;

/// Crate version string, stamped into run summaries.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
