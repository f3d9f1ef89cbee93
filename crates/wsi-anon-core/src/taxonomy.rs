//! Fixed catalog of error kinds with stable numeric codes.
//!
//! The catalog is a process-wide constant table. A kind only ever hands out
//! owned [`ErrorEntry`] values, so attaching a suffix or row context to one
//! occurrence can never leak into another.

use std::fmt;

use crate::runlog::ErrorEntry;

/// Code carried by every "success" entry and by eligible manifest rows.
pub const NO_ERROR_CODE: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoError,
    AnonymizeError,
    MissingFile,
    FileFormat,
    MissingColumns,
    ShowinfFailed,
    FconvertFailed,
    VipsFailed,
    ManifestErrors,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 9] = [
        ErrorKind::NoError,
        ErrorKind::AnonymizeError,
        ErrorKind::MissingFile,
        ErrorKind::FileFormat,
        ErrorKind::MissingColumns,
        ErrorKind::ShowinfFailed,
        ErrorKind::FconvertFailed,
        ErrorKind::VipsFailed,
        ErrorKind::ManifestErrors,
    ];

    pub const fn code(self) -> i64 {
        match self {
            ErrorKind::NoError => NO_ERROR_CODE,
            ErrorKind::AnonymizeError => 701,
            ErrorKind::MissingFile => 702,
            ErrorKind::FileFormat => 703,
            ErrorKind::MissingColumns => 704,
            ErrorKind::ShowinfFailed => 705,
            ErrorKind::FconvertFailed => 706,
            ErrorKind::VipsFailed => 707,
            ErrorKind::ManifestErrors => 708,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            ErrorKind::NoError => "no-error",
            ErrorKind::AnonymizeError => "error_with_anonymization",
            ErrorKind::MissingFile => "input-file-missing",
            ErrorKind::FileFormat => "file-format-error",
            ErrorKind::MissingColumns => "missing-columns",
            ErrorKind::ShowinfFailed => "showinf-failed",
            ErrorKind::FconvertFailed => "fconvert-failed",
            ErrorKind::VipsFailed => "vips-failed",
            ErrorKind::ManifestErrors => "manifest-errors",
        }
    }

    /// Fresh copy of the template.
    pub fn entry(self) -> ErrorEntry {
        ErrorEntry::new(self.code(), self.message())
    }

    /// Fresh copy with `": {detail}"` appended to the message.
    pub fn entry_with(self, detail: impl fmt::Display) -> ErrorEntry {
        ErrorEntry::new(self.code(), format!("{}: {}", self.message(), detail))
    }
}
