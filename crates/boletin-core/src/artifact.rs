//! Artifact records and deterministic filename derivation.
//!
//! Filenames combine the sanitized identity with the local timestamp at
//! second granularity. Collisions are acceptably rare rather than guarded
//! against.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Screenshot,
    Pdf,
    Log,
}

/// Append-only record of one artifact produced during a run. A failed write
/// still produces a record, with `error` set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub created: NaiveDateTime,
    pub reason: String,
    pub error: Option<String>,
}

impl ArtifactRecord {
    pub fn written(kind: ArtifactKind, path: PathBuf, created: NaiveDateTime, reason: &str) -> Self {
        Self {
            kind,
            path,
            created,
            reason: reason.to_string(),
            error: None,
        }
    }

    pub fn failed(
        kind: ArtifactKind,
        path: PathBuf,
        created: NaiveDateTime,
        reason: &str,
        error: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            path,
            created,
            reason: reason.to_string(),
            error: Some(error.into()),
        }
    }

    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// `<identity>_<dd-mm-yyyy>_<hh-mm-ss>.png` — the conditional zero-value
/// evidence capture.
pub fn zero_capture_filename(sanitized_identity: &str, ts: NaiveDateTime) -> String {
    format!(
        "{}_{}.png",
        sanitized_identity,
        ts.format("%d-%m-%Y_%H-%M-%S")
    )
}

/// `boletas_honorarios_<yyyy-mm-dd>_<hh-mm-ss>.pdf` — the generated report.
pub fn report_pdf_filename(ts: NaiveDateTime) -> String {
    format!("boletas_honorarios_{}.pdf", ts.format("%Y-%m-%d_%H-%M-%S"))
}

/// `debug_<step>_<timestamp>.png` — best-effort diagnostic captures. The step
/// name is slugged so it is filesystem-safe.
pub fn debug_capture_filename(step: &str, ts: NaiveDateTime) -> String {
    let slug: String = step
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("debug_{}_{}.png", slug, ts.format("%Y%m%d%H%M%S"))
}

/// `boletas_recibidas_<yyyy-mm-dd>_<hh-mm-ss>.png` — zero evidence for the
/// received-receipts pass.
pub fn received_capture_filename(ts: NaiveDateTime) -> String {
    format!("boletas_recibidas_{}.png", ts.format("%Y-%m-%d_%H-%M-%S"))
}

/// `sii_final_<timestamp>.png` — the unconditional end-of-run record.
pub fn final_capture_filename(ts: NaiveDateTime) -> String {
    format!("sii_final_{}.png", ts.format("%d-%m-%Y_%H_%M_%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    #[test]
    fn zero_capture_filename_is_deterministic() {
        let name = zero_capture_filename("123456789", ts());
        assert_eq!(name, "123456789_02-03-2024_09-05-07.png");
    }

    #[test]
    fn sanitized_token_carries_no_original_punctuation() {
        let name = zero_capture_filename("123456789", ts());
        let token = name.split('_').next().unwrap();
        assert_eq!(token, "123456789");
        assert!(!token.contains('.'));
        assert!(!token.contains('-'));
    }

    #[test]
    fn report_pdf_filename_is_deterministic() {
        assert_eq!(
            report_pdf_filename(ts()),
            "boletas_honorarios_2024-03-02_09-05-07.pdf"
        );
    }

    #[test]
    fn debug_filename_slugs_the_step_name() {
        let name = debug_capture_filename("open honorarios menu", ts());
        assert_eq!(name, "debug_open_honorarios_menu_20240302090507.png");
    }
}
