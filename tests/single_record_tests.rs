//! Single-record mode: inline JSON in, status payload out, no artifacts on disk.

mod support;

use std::fs;
use std::path::Path;

use support::config_in;
use wsi_anonymize::{BatchPipeline, RedactError};

fn no_op(_: &Path) -> Result<(), RedactError> {
    Ok(())
}

#[test]
fn test_inline_record_is_anonymized_and_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = config_in(tmp.path());
    fs::write(cfg.input_dir.join("a.svs"), b"slide").unwrap();
    cfg.slide = Some(r#"{"path": "a.svs", "file_uuid": "u1", "file_ext": ".svs"}"#.into());

    let report = BatchPipeline::new(cfg.clone(), no_op).run().unwrap();
    let payload = report.payload.expect("single mode returns a payload");

    let status: serde_json::Value = serde_json::from_str(&payload.status).unwrap();
    assert_eq!(status, serde_json::json!({"error": [], "warning": []}));

    let output: serde_json::Value = serde_json::from_str(&payload.output).unwrap();
    assert_eq!(output[0]["file_uuid"], "u1");
    assert_eq!(output[0]["anonymize_error_code"], 0);
    assert_eq!(output[0]["anonymize_error_msg"], "no-error");
    assert!(cfg.output_dir.join("u1/u1.svs").exists());
    assert!(!cfg.error_log_path().exists());
}

#[test]
fn test_upstream_error_fields_are_ignored_inline() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = config_in(tmp.path());
    fs::write(cfg.input_dir.join("a.svs"), b"slide").unwrap();
    cfg.slide = Some(
        r#"{"path":"a.svs","file_uuid":"u1","file_ext":".svs","manifest_error_code":708}"#.into(),
    );

    let report = BatchPipeline::new(cfg, no_op).run().unwrap();
    assert_eq!(report.outcomes.len(), 1);
    assert!(report.outcomes[0].is_success());
}

#[test]
fn test_failed_redaction_is_in_status_with_row_zero() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = config_in(tmp.path());
    fs::write(cfg.input_dir.join("a.svs"), b"slide").unwrap();
    cfg.slide = Some(r#"{"path":"a.svs","file_uuid":"u1","file_ext":".svs"}"#.into());

    let report = BatchPipeline::new(cfg, |_: &Path| -> Result<(), RedactError> {
        Err(RedactError::Failed("unsupported vendor".into()))
    })
    .run()
    .unwrap();
    assert_eq!(report.exit_code(), 0);

    let status = report.payload.unwrap().status_log().unwrap();
    assert_eq!(status.errors.len(), 1);
    assert_eq!(status.errors[0].code, 701);
    assert_eq!(status.errors[0].row_idx, Some(0));
    assert_eq!(status.errors[0].file_uuid.as_deref(), Some("u1"));
}

#[test]
fn test_non_object_payload_is_file_format() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = config_in(tmp.path());
    cfg.slide = Some(r#"["a.svs"]"#.into());

    let report = BatchPipeline::new(cfg, no_op).run().unwrap();
    assert!(report.is_aborted());
    let status = report.payload.unwrap().status_log().unwrap();
    assert_eq!(status.errors[0].code, 703);
    assert!(report.outcomes.is_empty());
}
