//! Run configuration that downstream crates can serialize/deserialize.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizeConfig {
    /// Input manifest file name, resolved under `input_dir`.
    pub input_manifest: String,

    /// Output manifest file name, resolved under `output_dir`.
    pub output_manifest: String,

    /// Error log file name, resolved under `output_dir`.
    pub error_log: String,

    pub input_dir: PathBuf,
    pub output_dir: PathBuf,

    /// Inline single-record JSON. A non-empty value selects single-record mode.
    pub slide: Option<String>,

    /// Redaction tool command line; the copied slide path is appended as the last argument.
    pub redactor: String,

    /// Per-file redaction deadline in seconds. 0 waits forever.
    pub redact_timeout_secs: u64,

    /// Rows redacted concurrently. 1 keeps the strictly sequential loop, and
    /// a repeated `file_uuid` among eligible rows forces it.
    pub max_parallel: usize,
}

/// Which entry point a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Batch,
    Single,
}

impl Default for AnonymizeConfig {
    fn default() -> Self {
        Self {
            input_manifest: "quip_manifest.csv".to_string(),
            output_manifest: "quip_manifest.csv".to_string(),
            error_log: "quip_wsi_error_log.json".to_string(),
            input_dir: PathBuf::from("/data/images"),
            output_dir: PathBuf::from("/data/output"),
            slide: None,
            redactor: "python anonymize-slide/anonymize-slide.py".to_string(),
            redact_timeout_secs: 3600,
            max_parallel: 1,
        }
    }
}

impl AnonymizeConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `WSI_ANON_INPUT_MANIFEST`, `WSI_ANON_OUTPUT_MANIFEST`, `WSI_ANON_ERROR_LOG`
    /// - `WSI_ANON_INPUT_DIR`, `WSI_ANON_OUTPUT_DIR`
    /// - `WSI_ANON_REDACTOR`: redaction command line
    /// - `WSI_ANON_REDACT_TIMEOUT_SECS`: per-file deadline
    /// - `WSI_ANON_MAX_PARALLEL`: concurrent rows
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("WSI_ANON_INPUT_MANIFEST") {
            cfg.input_manifest = s;
        }

        if let Ok(s) = std::env::var("WSI_ANON_OUTPUT_MANIFEST") {
            cfg.output_manifest = s;
        }

        if let Ok(s) = std::env::var("WSI_ANON_ERROR_LOG") {
            cfg.error_log = s;
        }

        if let Ok(s) = std::env::var("WSI_ANON_INPUT_DIR") {
            cfg.input_dir = PathBuf::from(s);
        }

        if let Ok(s) = std::env::var("WSI_ANON_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(s);
        }

        if let Ok(s) = std::env::var("WSI_ANON_REDACTOR") {
            cfg.redactor = s;
        }

        if let Ok(s) = std::env::var("WSI_ANON_REDACT_TIMEOUT_SECS") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.redact_timeout_secs = v;
            }
        }

        if let Ok(s) = std::env::var("WSI_ANON_MAX_PARALLEL") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_parallel = v;
            }
        }

        cfg
    }

    /// Reject settings no run can proceed with.
    pub fn validate(&self) -> Result<()> {
        if self.max_parallel == 0 {
            return Err(Error::Config("max_parallel must be at least 1".into()));
        }
        if self.redactor_argv().is_empty() {
            return Err(Error::Config("redactor command is empty".into()));
        }
        Ok(())
    }

    pub fn mode(&self) -> RunMode {
        match self.slide.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => RunMode::Single,
            _ => RunMode::Batch,
        }
    }

    pub fn input_manifest_path(&self) -> PathBuf {
        self.input_dir.join(&self.input_manifest)
    }

    pub fn output_manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_manifest)
    }

    pub fn error_log_path(&self) -> PathBuf {
        self.output_dir.join(&self.error_log)
    }

    /// Whitespace-split redactor command line.
    pub fn redactor_argv(&self) -> Vec<String> {
        self.redactor.split_whitespace().map(str::to_string).collect()
    }

    pub fn redact_timeout(&self) -> Option<Duration> {
        match self.redact_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
