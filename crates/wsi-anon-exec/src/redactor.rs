//! The external redaction tool.
//!
//! A redactor rewrites one slide file in place. `CommandRedactor` runs a
//! subprocess with the slide path as its last argument, discards its output,
//! and treats anything other than a clean exit 0 within the deadline as a
//! failure.

use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use wsi_anon_core::config::AnonymizeConfig;

#[derive(Debug, Error)]
pub enum RedactError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with {status}")]
    Exit { program: String, status: ExitStatus },

    #[error("'{program}' still running after {timeout:?}; killed")]
    Timeout { program: String, timeout: Duration },

    #[error("waiting on '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("redaction failed: {0}")]
    Failed(String),
}

/// Strips label imagery from one slide file, in place.
pub trait Redactor: Send + Sync {
    fn redact(&self, slide: &Path) -> Result<(), RedactError>;
}

impl<F> Redactor for F
where
    F: Fn(&Path) -> Result<(), RedactError> + Send + Sync,
{
    fn redact(&self, slide: &Path) -> Result<(), RedactError> {
        self(slide)
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct CommandRedactor {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandRedactor {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: None,
        }
    }

    /// `None` waits for the tool indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from the configured command line and deadline.
    pub fn from_config(cfg: &AnonymizeConfig) -> Option<Self> {
        let mut argv = cfg.redactor_argv().into_iter();
        let program = argv.next()?;
        Some(Self::new(program, argv).with_timeout(cfg.redact_timeout()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, RedactError> {
        let wait_err = |source: io::Error| RedactError::Wait {
            program: self.program.clone(),
            source,
        };

        let Some(timeout) = self.timeout else {
            return child.wait().map_err(wait_err);
        };

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait().map_err(wait_err)? {
                return Ok(status);
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }

        // Past the deadline: kill, then reap so no zombie is left behind.
        if let Err(e) = child.kill() {
            debug!(program = %self.program, error = %e, "kill after timeout failed");
        }
        match child.wait() {
            Ok(status) => debug!(program = %self.program, %status, "reaped timed-out redactor"),
            Err(e) => debug!(program = %self.program, error = %e, "timed-out redactor could not be reaped"),
        }
        Err(RedactError::Timeout {
            program: self.program.clone(),
            timeout,
        })
    }
}

impl Redactor for CommandRedactor {
    fn redact(&self, slide: &Path) -> Result<(), RedactError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(slide)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| RedactError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        debug!(program = %self.program, pid = child.id(), slide = %slide.display(), "redactor spawned");

        let status = self.wait(&mut child)?;
        debug!(program = %self.program, %status, "redactor exited");
        if status.success() {
            Ok(())
        } else {
            Err(RedactError::Exit {
                program: self.program.clone(),
                status,
            })
        }
    }
}
