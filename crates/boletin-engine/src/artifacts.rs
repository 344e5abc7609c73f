//! Run-scoped log sinks and best-effort artifact capture.
//!
//! Every write here is best-effort: a failed capture or log append is
//! recorded (and traced) but never aborts the workflow.

use crate::backend::Backend;
use crate::workflow::RunContext;
use boletin_core::artifact::{self, ArtifactKind, ArtifactRecord};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Append-only human-readable trace file.
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Create (truncating) the log file.
    pub fn create(path: PathBuf) -> std::io::Result<Self> {
        std::fs::write(&path, "")?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line. Failures are traced and swallowed.
    pub fn append(&self, line: &str) {
        let result = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .and_then(|mut f| writeln!(f, "{}", line));
        if let Err(e) = result {
            debug!(path = %self.path.display(), error = %e, "log append failed");
        }
    }
}

pub struct ArtifactWriter;

impl ArtifactWriter {
    /// Capture a full-page screenshot into `filename` under the run's output
    /// directory. Always returns a record; on failure the record carries the
    /// error and the run continues.
    pub async fn write_screenshot<B: Backend + ?Sized>(
        backend: &mut B,
        ctx: &mut RunContext,
        filename: &str,
        reason: &str,
    ) -> ArtifactRecord {
        let path = ctx.output_dir.join(filename);
        let created = Local::now().naive_local();
        let record = match backend.screenshot(true).await {
            Ok(bytes) => match std::fs::write(&path, &bytes) {
                Ok(()) => {
                    ctx.log(&format!("Screenshot saved: {} ({})", path.display(), reason));
                    ArtifactRecord::written(ArtifactKind::Screenshot, path, created, reason)
                }
                Err(e) => Self::write_failed(ctx, ArtifactKind::Screenshot, path, created, reason, e),
            },
            Err(e) => Self::write_failed(ctx, ArtifactKind::Screenshot, path, created, reason, e),
        };
        ctx.artifacts.push(record.clone());
        record
    }

    /// Render the current page to PDF and persist it. Same best-effort
    /// contract as screenshots.
    pub async fn write_pdf<B: Backend + ?Sized>(
        backend: &mut B,
        ctx: &mut RunContext,
        filename: &str,
        reason: &str,
    ) -> ArtifactRecord {
        let path = ctx.output_dir.join(filename);
        let created = Local::now().naive_local();
        let record = match backend.pdf().await {
            Ok(bytes) => match std::fs::write(&path, &bytes) {
                Ok(()) => {
                    ctx.log(&format!("PDF saved: {} ({})", path.display(), reason));
                    ArtifactRecord::written(ArtifactKind::Pdf, path, created, reason)
                }
                Err(e) => Self::write_failed(ctx, ArtifactKind::Pdf, path, created, reason, e),
            },
            Err(e) => Self::write_failed(ctx, ArtifactKind::Pdf, path, created, reason, e),
        };
        ctx.artifacts.push(record.clone());
        record
    }

    /// Diagnostic capture for a failed step, named `debug_<step>_<ts>.png`.
    pub async fn write_debug<B: Backend + ?Sized>(
        backend: &mut B,
        ctx: &mut RunContext,
        step_name: &str,
    ) -> ArtifactRecord {
        let filename = artifact::debug_capture_filename(step_name, Local::now().naive_local());
        Self::write_screenshot(backend, ctx, &filename, "diagnostic capture").await
    }

    fn write_failed(
        ctx: &RunContext,
        kind: ArtifactKind,
        path: PathBuf,
        created: chrono::NaiveDateTime,
        reason: &str,
        error: impl std::fmt::Display,
    ) -> ArtifactRecord {
        warn!(path = %path.display(), error = %error, "artifact write failed");
        ctx.log_error(&format!(
            "Artifact write failed for {}: {}",
            path.display(),
            error
        ));
        ArtifactRecord::failed(kind, path, created, reason, error.to_string())
    }
}
