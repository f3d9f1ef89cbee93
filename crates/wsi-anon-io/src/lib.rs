#![forbid(unsafe_code)]
//! wsi-anon-io: manifest readers, artifact writers, and the per-record output layout.
//!
//! Readers report domain failures (unreadable manifest, malformed rows) as
//! taxonomy entries so the caller can log them verbatim. Writers report
//! infrastructure failures through [`error::Error`].

pub mod error;
pub mod layout;
pub mod readers;
pub mod writers;

pub use layout::OutputLayout;
pub use readers::manifest::{load_batch, ManifestTable};
pub use readers::single::{load_single, InlineRecord};
pub use writers::csv::OutputManifestWriter;
pub use writers::json::{write_error_log, StatusPayload};
