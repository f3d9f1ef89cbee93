//! Column contracts for manifests. Pure data; no CSV dependency here.

use serde::{Deserialize, Serialize};

use crate::runlog::RunLog;
use crate::taxonomy::ErrorKind;

/// Columns a batch manifest must carry.
pub const BATCH_REQUIRED_COLUMNS: &[&str] = &[
    "path",
    "file_uuid",
    "manifest_error_code",
    "manifest_error_msg",
    "file_ext",
];

/// Keys a single-record payload must carry.
pub const SINGLE_REQUIRED_COLUMNS: &[&str] = &["path", "file_uuid", "file_ext"];

/// Header of the output manifest, in write order.
pub const OUTPUT_COLUMNS: [&str; 4] = [
    "file_uuid",
    "anonymized_filename",
    "anonymize_error_code",
    "anonymize_error_msg",
];

/// Column names as they appear in the input, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSchema {
    pub columns: Vec<String>,
}

impl ManifestSchema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// One `missing_columns` entry per absent required column, in `required` order.
    pub fn validate(&self, required: &[&str]) -> RunLog {
        let mut log = RunLog::new();
        for col in required.iter().filter(|c| !self.contains(c)) {
            log.push_error(ErrorKind::MissingColumns.entry_with(col));
        }
        log
    }
}
