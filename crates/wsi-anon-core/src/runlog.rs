//! Error entries and the per-run error/warning log.

use serde::{Deserialize, Serialize};

use crate::taxonomy::NO_ERROR_CODE;

/// One taxonomy occurrence, optionally bound to a manifest row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub code: i64,
    pub msg: String,

    /// 0-based position in the input manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_idx: Option<usize>,

    /// Relative path of the source slide as written in the manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_uuid: Option<String>,
}

impl ErrorEntry {
    pub fn new(code: i64, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            row_idx: None,
            filename: None,
            file_uuid: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.code != NO_ERROR_CODE
    }

    /// Bind this occurrence to a manifest row.
    pub fn at_row(
        mut self,
        row_idx: usize,
        filename: impl Into<String>,
        file_uuid: impl Into<String>,
    ) -> Self {
        self.row_idx = Some(row_idx);
        self.filename = Some(filename.into());
        self.file_uuid = Some(file_uuid.into());
        self
    }
}

/// Errors and warnings accumulated over one run. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLog {
    #[serde(rename = "error", default)]
    pub errors: Vec<ErrorEntry>,

    /// Reserved; nothing in this stage emits warnings yet.
    #[serde(rename = "warning", default)]
    pub warnings: Vec<ErrorEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log holding a single error, used by the fatal early-exit paths.
    pub fn with_error(entry: ErrorEntry) -> Self {
        let mut log = Self::new();
        log.push_error(entry);
        log
    }

    pub fn push_error(&mut self, entry: ErrorEntry) {
        self.errors.push(entry);
    }

    pub fn push_warning(&mut self, entry: ErrorEntry) {
        self.warnings.push(entry);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
