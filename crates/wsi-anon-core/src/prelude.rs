//! Convenient re-exports for downstream crates.

pub use crate::config::{AnonymizeConfig, RunMode};
pub use crate::error::{Error, Result};
pub use crate::record::{AnonymizationOutcome, ManifestRecord};
pub use crate::runlog::{ErrorEntry, RunLog};
pub use crate::schema::{ManifestSchema, BATCH_REQUIRED_COLUMNS, OUTPUT_COLUMNS, SINGLE_REQUIRED_COLUMNS};
pub use crate::taxonomy::{ErrorKind, NO_ERROR_CODE};
