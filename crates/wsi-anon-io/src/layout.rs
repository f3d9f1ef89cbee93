//! Per-record output layout: `<root>/<file_uuid>/<file_uuid><file_ext>`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use wsi_anon_core::record::ManifestRecord;

/// Output directory tree rooted at the host filesystem.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn record_dir(&self, record: &ManifestRecord) -> PathBuf {
        self.root.join(&record.file_uuid)
    }

    /// Where the anonymized copy of `record` lives.
    pub fn record_path(&self, record: &ManifestRecord) -> PathBuf {
        self.record_dir(record).join(record.output_file_name())
    }

    /// Create the record directory (if needed) and copy `source` into it byte for byte.
    ///
    /// Nothing is cleaned up on failure.
    pub fn stage_copy(&self, source: &Path, record: &ManifestRecord) -> io::Result<PathBuf> {
        fs::create_dir_all(self.record_dir(record))?;
        let dest = self.record_path(record);
        fs::copy(source, &dest)?;
        Ok(dest)
    }
}
