//! Error-log file and the single-record status payload.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use wsi_anon_core::record::AnonymizationOutcome;
use wsi_anon_core::runlog::RunLog;

/// Write the run log as one JSON document `{"error": [...], "warning": [...]}`.
pub fn write_error_log(path: &Path, log: &RunLog) -> Result<()> {
    let f = File::create(path)?;
    let mut writer = BufWriter::new(f);
    serde_json::to_writer(&mut writer, log)?;
    writer.flush()?;
    Ok(())
}

/// What single-record mode hands back instead of files. Both fields carry
/// JSON text, so the payload nests as strings when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: String,
    pub output: String,
}

impl StatusPayload {
    pub fn new(log: &RunLog, outcomes: &[AnonymizationOutcome]) -> Result<Self> {
        Ok(Self {
            status: serde_json::to_string(log)?,
            output: serde_json::to_string(outcomes)?,
        })
    }

    pub fn status_log(&self) -> Result<RunLog> {
        Ok(serde_json::from_str(&self.status)?)
    }

    pub fn outcomes(&self) -> Result<Vec<AnonymizationOutcome>> {
        Ok(serde_json::from_str(&self.output)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
