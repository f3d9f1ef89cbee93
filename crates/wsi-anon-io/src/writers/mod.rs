//! Run artifacts: the output manifest and the error log.

pub mod csv;
pub mod json;
