//! Copy-then-redact for a single slide.

use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use wsi_anon_core::record::ManifestRecord;
use wsi_anon_core::runlog::ErrorEntry;
use wsi_anon_core::taxonomy::ErrorKind;
use wsi_anon_io::layout::OutputLayout;

use crate::redactor::Redactor;

pub struct SlideAnonymizer<R: Redactor> {
    layout: OutputLayout,
    redactor: R,
}

impl<R: Redactor> SlideAnonymizer<R> {
    pub fn new(layout: OutputLayout, redactor: R) -> Self {
        Self { layout, redactor }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Copy `source` to `<root>/<uuid>/<uuid><ext>` and redact the copy in place.
    ///
    /// Always returns the destination path. The entry is `no_error` only if
    /// both the copy and the redactor succeeded; partial files are left as-is.
    pub fn anonymize(&self, source: &Path, record: &ManifestRecord) -> (PathBuf, ErrorEntry) {
        let dest = match self.layout.stage_copy(source, record) {
            Ok(dest) => dest,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !source.exists() => {
                warn!(file_uuid = %record.file_uuid, source = %source.display(), "source slide missing");
                return (
                    self.layout.record_path(record),
                    ErrorKind::MissingFile.entry_with(&record.path),
                );
            }
            Err(e) => {
                warn!(file_uuid = %record.file_uuid, error = %e, "staging copy failed");
                return (self.layout.record_path(record), ErrorKind::AnonymizeError.entry());
            }
        };

        match self.redactor.redact(&dest) {
            Ok(()) => (dest, ErrorKind::NoError.entry()),
            Err(e) => {
                warn!(file_uuid = %record.file_uuid, error = %e, "redaction failed");
                (dest, ErrorKind::AnonymizeError.entry())
            }
        }
    }
}
