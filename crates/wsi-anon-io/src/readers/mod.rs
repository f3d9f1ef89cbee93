//! Record sources: a CSV manifest on disk, or one inline JSON record.

pub mod manifest;
pub mod single;
