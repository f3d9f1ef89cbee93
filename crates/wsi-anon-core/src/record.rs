//! Manifest rows in, anonymization outcomes out.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::runlog::ErrorEntry;
use crate::taxonomy::NO_ERROR_CODE;

/// One row of the input manifest. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    /// Slide path relative to the input directory.
    pub path: String,
    pub file_uuid: String,
    /// Extension including the leading dot, e.g. `.svs`.
    pub file_ext: String,
    /// Upstream error code. `None` when the cell was blank.
    #[serde(default)]
    pub manifest_error_code: Option<i64>,
    #[serde(default)]
    pub manifest_error_msg: String,
}

impl ManifestRecord {
    /// Record with no upstream error, as built in single-record mode.
    pub fn new(
        path: impl Into<String>,
        file_uuid: impl Into<String>,
        file_ext: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            file_uuid: file_uuid.into(),
            file_ext: file_ext.into(),
            manifest_error_code: Some(NO_ERROR_CODE),
            manifest_error_msg: String::new(),
        }
    }

    /// Only rows whose upstream code is exactly zero are anonymized. A blank
    /// code was never cleared upstream and is skipped like any other.
    pub fn is_eligible(&self) -> bool {
        self.manifest_error_code == Some(NO_ERROR_CODE)
    }

    /// Name of the anonymized copy: `file_uuid + file_ext`.
    pub fn output_file_name(&self) -> String {
        format!("{}{}", self.file_uuid, self.file_ext)
    }

    /// Parse a `manifest_error_code` cell. A blank cell yields `None`.
    pub fn parse_error_code(raw: &str) -> Result<Option<i64>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse::<i64>().map(Some).map_err(|e| Error::Field {
            field: "manifest_error_code",
            reason: format!("'{trimmed}': {e}"),
        })
    }
}

/// Result of anonymizing one record; one output-manifest row.
///
/// Field names on the wire follow the output-manifest header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizationOutcome {
    pub file_uuid: String,
    #[serde(rename = "anonymized_filename")]
    pub anonymized_path: String,
    #[serde(rename = "anonymize_error_code")]
    pub error_code: i64,
    #[serde(rename = "anonymize_error_msg")]
    pub error_msg: String,
}

impl AnonymizationOutcome {
    pub fn new(
        file_uuid: impl Into<String>,
        anonymized_path: impl Into<String>,
        entry: &ErrorEntry,
    ) -> Self {
        Self {
            file_uuid: file_uuid.into(),
            anonymized_path: anonymized_path.into(),
            error_code: entry.code,
            error_msg: entry.msg.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_code == NO_ERROR_CODE
    }
}
