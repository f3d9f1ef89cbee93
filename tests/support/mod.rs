//! Shared fixtures for workspace integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use wsi_anonymize::AnonymizeConfig;

pub const HEADER: &str = "path,file_uuid,manifest_error_code,manifest_error_msg,file_ext\n";

/// Config rooted in `tmp` with `in/` created and default artifact names.
pub fn config_in(tmp: &Path) -> AnonymizeConfig {
    let cfg = AnonymizeConfig {
        input_dir: tmp.join("in"),
        output_dir: tmp.join("out"),
        ..Default::default()
    };
    fs::create_dir_all(&cfg.input_dir).expect("create input dir");
    cfg
}

/// Write slide files (content = their path) and a manifest with the given rows.
pub fn write_batch(cfg: &AnonymizeConfig, rows: &[(&str, &str, i64, &str)]) {
    let mut body = HEADER.to_string();
    for (path, uuid, code, ext) in rows {
        body.push_str(&format!("{path},{uuid},{code},,{ext}\n"));
        let slide = cfg.input_dir.join(path);
        if let Some(parent) = slide.parent() {
            fs::create_dir_all(parent).expect("create slide dir");
        }
        fs::write(&slide, path.as_bytes()).expect("write slide");
    }
    fs::write(cfg.input_manifest_path(), body).expect("write manifest");
}

pub fn read_log(cfg: &AnonymizeConfig) -> serde_json::Value {
    let text = fs::read_to_string(cfg.error_log_path()).expect("error log exists");
    serde_json::from_str(&text).expect("error log is json")
}
