//! Where a run's results go.
//!
//! Batch mode persists the output manifest (row by row, while the run is in
//! progress) and the error log. Single-record mode writes nothing and hands
//! back a [`StatusPayload`] instead.

use std::fs::{self, File};
use std::path::PathBuf;

use tracing::info;

use wsi_anon_core::config::{AnonymizeConfig, RunMode};
use wsi_anon_core::record::AnonymizationOutcome;
use wsi_anon_core::runlog::RunLog;
use wsi_anon_io::writers::csv::OutputManifestWriter;
use wsi_anon_io::writers::json::{write_error_log, StatusPayload};

use crate::pipeline::ExecError;

pub enum ResultReporter {
    Files {
        output_dir: PathBuf,
        manifest_path: PathBuf,
        error_log_path: PathBuf,
        writer: Option<OutputManifestWriter<File>>,
    },
    Inline,
}

impl ResultReporter {
    pub fn for_config(cfg: &AnonymizeConfig) -> Self {
        match cfg.mode() {
            RunMode::Batch => ResultReporter::Files {
                output_dir: cfg.output_dir.clone(),
                manifest_path: cfg.output_manifest_path(),
                error_log_path: cfg.error_log_path(),
                writer: None,
            },
            RunMode::Single => ResultReporter::Inline,
        }
    }

    /// Make sure the output directory exists before anything is written.
    pub fn prepare(&mut self) -> Result<(), ExecError> {
        if let ResultReporter::Files { output_dir, .. } = self {
            fs::create_dir_all(&*output_dir).map_err(|source| ExecError::OutputDir {
                path: output_dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Open the output manifest. Called only once validation has passed.
    pub fn begin(&mut self) -> Result<(), ExecError> {
        if let ResultReporter::Files {
            manifest_path,
            writer,
            ..
        } = self
        {
            *writer = Some(OutputManifestWriter::to_path(manifest_path)?);
        }
        Ok(())
    }

    /// Flush one outcome as soon as it is known.
    pub fn record(&mut self, outcome: &AnonymizationOutcome) -> Result<(), ExecError> {
        if let ResultReporter::Files {
            writer: Some(writer),
            ..
        } = self
        {
            writer.write_outcome(outcome)?;
        }
        Ok(())
    }

    /// Close the manifest and persist the log (batch), or build the payload (single).
    pub fn finish(
        self,
        log: &RunLog,
        outcomes: &[AnonymizationOutcome],
    ) -> Result<Option<StatusPayload>, ExecError> {
        match self {
            ResultReporter::Files {
                manifest_path,
                error_log_path,
                writer,
                ..
            } => {
                if let Some(writer) = writer {
                    let rows = writer.rows_written();
                    writer.into_inner()?;
                    info!(path = %manifest_path.display(), rows, "output manifest written");
                }
                write_error_log(&error_log_path, log)?;
                info!(path = %error_log_path.display(), errors = log.errors.len(), "error log written");
                Ok(None)
            }
            ResultReporter::Inline => Ok(Some(StatusPayload::new(log, outcomes)?)),
        }
    }
}
