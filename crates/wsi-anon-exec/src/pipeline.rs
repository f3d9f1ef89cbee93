//! Manifest-driven row pipeline.
//!
//! `Start -> Validating -> (Aborted | Processing) -> Finalizing -> Done`.
//! Loading or schema failures abort before any row is touched. Once
//! processing starts, every eligible row is attempted; a row's failure only
//! ever shows up as its own outcome and log entry.

use std::collections::HashSet;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use wsi_anon_core::config::{AnonymizeConfig, RunMode};
use wsi_anon_core::record::{AnonymizationOutcome, ManifestRecord};
use wsi_anon_core::runlog::{ErrorEntry, RunLog};
use wsi_anon_core::schema::{BATCH_REQUIRED_COLUMNS, SINGLE_REQUIRED_COLUMNS};
use wsi_anon_core::taxonomy::ErrorKind;
use wsi_anon_io::layout::OutputLayout;
use wsi_anon_io::readers::{manifest, single};
use wsi_anon_io::writers::json::StatusPayload;

use crate::anonymizer::SlideAnonymizer;
use crate::metrics::emit_span;
use crate::redactor::Redactor;
use crate::reporter::ResultReporter;
use crate::scheduler::{for_each_ordered, TaskResult};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("artifact i/o: {0}")]
    Io(#[from] wsi_anon_io::error::Error),
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    Validating,
    Aborted,
    Processing,
    Finalizing,
    Done,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Records loaded from the manifest or payload.
    pub rows: usize,
    /// Rows skipped for carrying an upstream error.
    pub skipped: usize,
    pub processed: usize,
    pub failed: usize,
}

impl RunStats {
    fn key_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("version", wsi_anon_core::VERSION.to_string()),
            ("rows", self.rows.to_string()),
            ("skipped", self.skipped.to_string()),
            ("processed", self.processed.to_string()),
            ("failed", self.failed.to_string()),
        ]
    }
}

/// Everything a finished (or aborted) run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: RunMode,
    /// `Done` or `Aborted`.
    pub state: RunState,
    pub log: RunLog,
    pub outcomes: Vec<AnonymizationOutcome>,
    pub stats: RunStats,
    /// Set in single-record mode only.
    pub payload: Option<StatusPayload>,
}

impl RunReport {
    pub fn is_aborted(&self) -> bool {
        self.state == RunState::Aborted
    }

    /// Process exit status: 1 only for an aborted batch run. Single-record
    /// runs report through their payload.
    pub fn exit_code(&self) -> i32 {
        match (self.mode, self.state) {
            (RunMode::Batch, RunState::Aborted) => 1,
            _ => 0,
        }
    }
}

pub struct BatchPipeline<R: Redactor> {
    cfg: AnonymizeConfig,
    anonymizer: SlideAnonymizer<R>,
}

impl<R: Redactor> BatchPipeline<R> {
    pub fn new(cfg: AnonymizeConfig, redactor: R) -> Self {
        let layout = OutputLayout::new(cfg.output_dir.clone());
        Self {
            anonymizer: SlideAnonymizer::new(layout, redactor),
            cfg,
        }
    }

    /// Execute one run in the mode the config selects.
    ///
    /// `Err` means an artifact could not be written; everything else,
    /// including fatal manifest problems, comes back in the report.
    pub fn run(&self) -> Result<RunReport, ExecError> {
        let mode = self.cfg.mode();
        let mut state = RunState::Start;
        let mut reporter = ResultReporter::for_config(&self.cfg);
        reporter.prepare()?;

        let records = self.load(mode);
        transition(&mut state, RunState::Validating);
        let records = match records {
            Ok(records) => records,
            Err(log) => {
                transition(&mut state, RunState::Aborted);
                for e in &log.errors {
                    warn!(code = e.code, msg = %e.msg, "run aborted");
                }
                let payload = reporter.finish(&log, &[])?;
                return Ok(RunReport {
                    mode,
                    state,
                    log,
                    outcomes: Vec::new(),
                    stats: RunStats::default(),
                    payload,
                });
            }
        };

        transition(&mut state, RunState::Processing);
        reporter.begin()?;

        let eligible: Vec<(usize, &ManifestRecord)> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| mode == RunMode::Single || r.is_eligible())
            .collect();

        let mut stats = RunStats {
            rows: records.len(),
            skipped: records.len() - eligible.len(),
            ..Default::default()
        };
        let mut log = RunLog::new();
        let mut outcomes = Vec::with_capacity(eligible.len());

        for_each_ordered(
            &eligible,
            effective_parallelism(&eligible, self.cfg.max_parallel),
            |(idx, record)| self.process_row(*idx, record),
            |(idx, record), result| -> Result<(), ExecError> {
                let (outcome, entry) = self.settle(record, result);
                reporter.record(&outcome)?;
                stats.processed += 1;
                if entry.is_error() {
                    stats.failed += 1;
                    log.push_error(entry.at_row(*idx, &record.path, &record.file_uuid));
                }
                outcomes.push(outcome);
                Ok(())
            },
        )?;

        transition(&mut state, RunState::Finalizing);
        let payload = reporter.finish(&log, &outcomes)?;
        emit_span("run_finished", &stats.key_values());
        info!(
            rows = stats.rows,
            processed = stats.processed,
            skipped = stats.skipped,
            failed = stats.failed,
            "run complete"
        );
        transition(&mut state, RunState::Done);

        Ok(RunReport {
            mode,
            state,
            log,
            outcomes,
            stats,
            payload,
        })
    }

    /// Load and validate records. `Err` holds the fatal log.
    fn load(&self, mode: RunMode) -> Result<Vec<ManifestRecord>, RunLog> {
        match mode {
            RunMode::Batch => {
                let table = manifest::load_batch(&self.cfg.input_manifest_path())
                    .map_err(RunLog::with_error)?;
                check(table.schema.validate(BATCH_REQUIRED_COLUMNS))?;
                table.records().map_err(RunLog::with_error)
            }
            RunMode::Single => {
                let payload = self.cfg.slide.as_deref().unwrap_or_default();
                let inline = single::load_single(payload).map_err(RunLog::with_error)?;
                check(inline.schema.validate(SINGLE_REQUIRED_COLUMNS))?;
                Ok(vec![inline.record()])
            }
        }
    }

    fn process_row(&self, idx: usize, record: &ManifestRecord) -> (AnonymizationOutcome, ErrorEntry) {
        info!(row = idx, file_uuid = %record.file_uuid, "Processing: {}", record.path);
        let source = self.cfg.input_dir.join(&record.path);
        let (path, entry) = self.anonymizer.anonymize(&source, record);
        let outcome = AnonymizationOutcome::new(&record.file_uuid, path.display().to_string(), &entry);
        (outcome, entry)
    }

    /// A panicked worker becomes that row's `anonymize_error`.
    fn settle(
        &self,
        record: &ManifestRecord,
        result: TaskResult<(AnonymizationOutcome, ErrorEntry)>,
    ) -> (AnonymizationOutcome, ErrorEntry) {
        result.unwrap_or_else(|_| {
            warn!(file_uuid = %record.file_uuid, "row worker panicked");
            let entry = ErrorKind::AnonymizeError.entry();
            let path = self.anonymizer.layout().record_path(record);
            let outcome =
                AnonymizationOutcome::new(&record.file_uuid, path.display().to_string(), &entry);
            (outcome, entry)
        })
    }
}

/// Rows sharing a `file_uuid` share a destination file, so they must not
/// run concurrently. Any duplicate drops the whole run to one worker.
fn effective_parallelism(rows: &[(usize, &ManifestRecord)], max_parallel: usize) -> usize {
    if max_parallel <= 1 {
        return max_parallel;
    }
    let mut seen = HashSet::with_capacity(rows.len());
    for (idx, record) in rows {
        if !seen.insert(record.file_uuid.as_str()) {
            warn!(row = idx, file_uuid = %record.file_uuid, "duplicate file_uuid, processing rows sequentially");
            return 1;
        }
    }
    max_parallel
}

fn check(log: RunLog) -> Result<(), RunLog> {
    if log.has_errors() {
        Err(log)
    } else {
        Ok(())
    }
}

fn transition(state: &mut RunState, next: RunState) {
    tracing::trace!(from = ?*state, to = ?next, "run state");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redactor::RedactError;
    use std::fs;
    use std::path::Path;

    const HEADER: &str = "path,file_uuid,manifest_error_code,manifest_error_msg,file_ext\n";

    fn cfg_in(tmp: &Path) -> AnonymizeConfig {
        let cfg = AnonymizeConfig {
            input_dir: tmp.join("in"),
            output_dir: tmp.join("out"),
            input_manifest: "manifest.csv".into(),
            output_manifest: "anonymized.csv".into(),
            error_log: "errors.json".into(),
            ..Default::default()
        };
        fs::create_dir_all(&cfg.input_dir).unwrap();
        cfg
    }

    fn ok_redactor(_: &Path) -> Result<(), RedactError> {
        Ok(())
    }

    #[test]
    fn upstream_error_rows_are_skipped_silently() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = cfg_in(tmp.path());
        fs::write(cfg.input_dir.join("a.svs"), b"a").unwrap();
        fs::write(
            cfg.input_manifest_path(),
            format!("{HEADER}a.svs,u1,0,,.svs\nb.svs,u2,708,upstream,.svs\n"),
        )
        .unwrap();

        let report = BatchPipeline::new(cfg, ok_redactor).run().unwrap();
        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].file_uuid, "u1");
        assert!(report.log.errors.is_empty());
        assert_eq!(report.stats.skipped, 1);
    }

    #[test]
    fn failing_rows_get_row_context_and_do_not_stop_the_run() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = cfg_in(tmp.path());
        for name in ["a.svs", "b.svs", "c.svs"] {
            fs::write(cfg.input_dir.join(name), name).unwrap();
        }
        fs::write(
            cfg.input_manifest_path(),
            format!("{HEADER}a.svs,u1,0,,.svs\nskip.svs,u0,708,,.svs\nb.svs,u2,0,,.svs\nc.svs,u3,0,,.svs\n"),
        )
        .unwrap();

        let redactor = |p: &Path| -> Result<(), RedactError> {
            if p.ends_with("u2.svs") {
                Err(RedactError::Failed("label not found".into()))
            } else {
                Ok(())
            }
        };
        let report = BatchPipeline::new(cfg, redactor).run().unwrap();

        let codes: Vec<i64> = report.outcomes.iter().map(|o| o.error_code).collect();
        assert_eq!(codes, vec![0, 701, 0]);
        assert_eq!(report.log.errors.len(), 1);
        let err = &report.log.errors[0];
        assert_eq!(err.code, 701);
        assert_eq!(err.row_idx, Some(2));
        assert_eq!(err.filename.as_deref(), Some("b.svs"));
        assert_eq!(err.file_uuid.as_deref(), Some("u2"));
        assert_eq!(report.stats.failed, 1);
    }

    #[test]
    fn missing_manifest_aborts_with_one_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = cfg_in(tmp.path());
        let report = BatchPipeline::new(cfg.clone(), ok_redactor).run().unwrap();
        assert!(report.is_aborted());
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.log.errors.len(), 1);
        assert_eq!(report.log.errors[0].code, 702);
        assert!(report.log.errors[0].msg.contains("manifest.csv"));
        assert!(cfg.error_log_path().exists());
        assert!(!cfg.output_manifest_path().exists());
    }

    #[test]
    fn single_mode_processes_the_inline_record_without_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = cfg_in(tmp.path());
        fs::write(cfg.input_dir.join("a.svs"), b"a").unwrap();
        cfg.slide = Some(r#"{"path":"a.svs","file_uuid":"u1","file_ext":".svs"}"#.into());

        let report = BatchPipeline::new(cfg.clone(), ok_redactor).run().unwrap();
        assert_eq!(report.mode, RunMode::Single);
        assert_eq!(report.exit_code(), 0);
        let payload = report.payload.unwrap();
        let outcomes = payload.outcomes().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(
            outcomes[0].anonymized_path,
            cfg.output_dir.join("u1").join("u1.svs").display().to_string()
        );
        assert!(!cfg.error_log_path().exists());
        assert!(!cfg.output_manifest_path().exists());
    }

    #[test]
    fn single_mode_schema_failure_is_reported_in_the_payload() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = cfg_in(tmp.path());
        cfg.slide = Some(r#"{"path":"a.svs","file_ext":".svs"}"#.into());

        let report = BatchPipeline::new(cfg, ok_redactor).run().unwrap();
        assert!(report.is_aborted());
        assert_eq!(report.exit_code(), 0);
        let status = report.payload.unwrap().status_log().unwrap();
        assert_eq!(status.errors[0].msg, "missing-columns: file_uuid");
    }

    #[test]
    fn panicking_redactor_is_contained_to_its_row() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = cfg_in(tmp.path());
        cfg.max_parallel = 2;
        for name in ["a.svs", "b.svs"] {
            fs::write(cfg.input_dir.join(name), name).unwrap();
        }
        fs::write(
            cfg.input_manifest_path(),
            format!("{HEADER}a.svs,u1,0,,.svs\nb.svs,u2,0,,.svs\n"),
        )
        .unwrap();

        let redactor = |p: &Path| -> Result<(), RedactError> {
            if p.ends_with("u1.svs") {
                panic!("redactor crashed");
            }
            Ok(())
        };
        let report = BatchPipeline::new(cfg, redactor).run().unwrap();
        let codes: Vec<i64> = report.outcomes.iter().map(|o| o.error_code).collect();
        assert_eq!(codes, vec![701, 0]);
        assert_eq!(report.log.errors[0].row_idx, Some(0));
    }

    #[test]
    fn blank_upstream_code_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = cfg_in(tmp.path());
        for name in ["a.svs", "b.svs"] {
            fs::write(cfg.input_dir.join(name), name).unwrap();
        }
        fs::write(
            cfg.input_manifest_path(),
            format!("{HEADER}a.svs,u1,0,,.svs\nb.svs,u2,,,.svs\n"),
        )
        .unwrap();

        let report = BatchPipeline::new(cfg.clone(), ok_redactor).run().unwrap();
        let uuids: Vec<&str> = report.outcomes.iter().map(|o| o.file_uuid.as_str()).collect();
        assert_eq!(uuids, vec!["u1"]);
        assert_eq!(report.stats.skipped, 1);
        assert!(!cfg.output_dir.join("u2").exists());
    }

    #[test]
    fn staging_failure_is_row_level_and_later_rows_still_run() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = cfg_in(tmp.path());
        for name in ["a.svs", "b.svs", "c.svs"] {
            fs::write(cfg.input_dir.join(name), name).unwrap();
        }
        fs::create_dir_all(&cfg.output_dir).unwrap();
        fs::write(cfg.output_dir.join("u2"), b"in the way").unwrap();
        fs::write(
            cfg.input_manifest_path(),
            format!("{HEADER}a.svs,u1,0,,.svs\nb.svs,u2,0,,.svs\nc.svs,u3,0,,.svs\n"),
        )
        .unwrap();

        let report = BatchPipeline::new(cfg.clone(), ok_redactor).run().unwrap();
        let codes: Vec<i64> = report.outcomes.iter().map(|o| o.error_code).collect();
        assert_eq!(codes, vec![0, 701, 0]);
        assert_eq!(
            report.outcomes[1].anonymized_path,
            cfg.output_dir.join("u2").join("u2.svs").display().to_string()
        );
        assert_eq!(report.log.errors.len(), 1);
        assert_eq!(report.log.errors[0].row_idx, Some(1));
        assert!(cfg.output_dir.join("u3").join("u3.svs").exists());
    }

    #[test]
    fn duplicate_uuids_never_run_concurrently() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::thread;
        use std::time::Duration;

        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = cfg_in(tmp.path());
        cfg.max_parallel = 4;
        for name in ["a.svs", "b.svs", "c.svs"] {
            fs::write(cfg.input_dir.join(name), name).unwrap();
        }
        fs::write(
            cfg.input_manifest_path(),
            format!("{HEADER}a.svs,u1,0,,.svs\nb.svs,u1,0,,.svs\nc.svs,u3,0,,.svs\n"),
        )
        .unwrap();

        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let redactor = |_: &Path| -> Result<(), RedactError> {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            active.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        };
        let report = BatchPipeline::new(cfg.clone(), redactor).run().unwrap();
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        let uuids: Vec<&str> = report.outcomes.iter().map(|o| o.file_uuid.as_str()).collect();
        assert_eq!(uuids, vec!["u1", "u1", "u3"]);
        // Last writer wins, same as a sequential run.
        assert_eq!(fs::read(cfg.output_dir.join("u1/u1.svs")).unwrap(), b"b.svs");
    }

    #[test]
    fn distinct_uuids_keep_the_configured_parallelism() {
        let a = ManifestRecord::new("a.svs", "u1", ".svs");
        let b = ManifestRecord::new("b.svs", "u2", ".svs");
        let dup = ManifestRecord::new("c.svs", "u1", ".svs");
        assert_eq!(effective_parallelism(&[(0, &a), (1, &b)], 4), 4);
        assert_eq!(effective_parallelism(&[(0, &a), (1, &b), (2, &dup)], 4), 1);
        assert_eq!(effective_parallelism(&[(0, &a), (1, &dup)], 1), 1);
    }
}
