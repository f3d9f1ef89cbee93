//! Incremental output-manifest writer.
//!
//! The header goes out with the first row; every row is flushed as soon as it
//! is written so a crashed run still leaves a readable prefix on disk.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use ::csv::{Writer, WriterBuilder};

use crate::error::Result;
use wsi_anon_core::record::AnonymizationOutcome;
use wsi_anon_core::schema::OUTPUT_COLUMNS;

pub struct OutputManifestWriter<W: Write> {
    writer: Writer<W>,
    header_written: bool,
    rows: usize,
}

impl OutputManifestWriter<File> {
    /// Create (or truncate) the destination file.
    pub fn to_path(path: &Path) -> Result<Self> {
        let f = File::create(path)?;
        Ok(Self::to_writer(f))
    }
}

impl<W: Write> OutputManifestWriter<W> {
    pub fn to_writer(writer: W) -> Self {
        Self {
            writer: WriterBuilder::new().has_headers(false).from_writer(writer),
            header_written: false,
            rows: 0,
        }
    }

    /// Append one outcome row, writing the header first if this is the first row.
    pub fn write_outcome(&mut self, outcome: &AnonymizationOutcome) -> Result<()> {
        if !self.header_written {
            self.writer.write_record(OUTPUT_COLUMNS)?;
            self.header_written = true;
        }
        self.writer.serialize(outcome)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::Error::Io(e.into_error()))
    }
}
