//! Result types: per-file outcomes and the batch report.

use crate::error::ConvertError;
use crate::pipeline::classify::PathClassification;
use serde::Serialize;
use std::path::PathBuf;

/// What a successful conversion produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionSummary {
    pub pdf: PathBuf,
    /// `None` when the intermediate DOCX was removed.
    pub docx: Option<PathBuf>,
    pub markdown_path: PathBuf,
    pub markdown_bytes: usize,
    /// The Markdown itself, only when `echo_markdown` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
}

impl ConversionSummary {
    /// Human-readable one-liner naming the produced artifacts.
    pub fn message(&self) -> String {
        match &self.docx {
            Some(docx) => format!(
                "{} → {} + {}",
                self.pdf.display(),
                docx.display(),
                self.markdown_path.display()
            ),
            None => format!("{} → {}", self.pdf.display(), self.markdown_path.display()),
        }
    }
}

/// Per-file result of [`crate::Converter::pdf_to_markdown`].
#[derive(Debug)]
pub enum ConversionOutcome {
    Converted(ConversionSummary),
    Failed(ConvertError),
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Converted(_))
    }
}

/// Final status of one attempted file in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Converted,
    Failed,
    Cancelled,
}

/// One line of the batch report.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub pdf: PathBuf,
    pub status: FileStatus,
    /// Success message or error category + text.
    pub detail: String,
    /// Produced Markdown, only when `echo_markdown` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
}

/// Everything a batch run did.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub input: String,
    pub classification: PathClassification,
    /// PDFs found by the directory walk; `None` for single-file input.
    pub pdfs_found: Option<usize>,
    pub attempted: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub cancelled: bool,
    /// Why nothing was attempted, for not-exist / invalid input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_error: Option<String>,
    pub outcomes: Vec<FileReport>,
}

impl BatchReport {
    pub(crate) fn new(input: &str, classification: PathClassification) -> Self {
        Self {
            input: input.to_string(),
            classification,
            pdfs_found: None,
            attempted: 0,
            success_count: 0,
            error_count: 0,
            cancelled: false,
            input_error: None,
            outcomes: Vec::new(),
        }
    }

    /// Counts are only meaningful once at least one file was attempted.
    pub fn has_attempts(&self) -> bool {
        self.attempted > 0
    }

    pub(crate) fn record(&mut self, pdf: PathBuf, status: FileStatus, detail: String) {
        self.attempted += 1;
        match status {
            FileStatus::Converted => self.success_count += 1,
            FileStatus::Failed | FileStatus::Cancelled => self.error_count += 1,
        }
        self.outcomes.push(FileReport {
            pdf,
            status,
            detail,
            markdown: None,
        });
    }

    pub(crate) fn record_converted(&mut self, summary: ConversionSummary) {
        let detail = summary.message();
        self.record(summary.pdf, FileStatus::Converted, detail);
        if let Some(last) = self.outcomes.last_mut() {
            last.markdown = summary.markdown;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_updates_counters() {
        let mut r = BatchReport::new("/in", PathClassification::Directory);
        assert!(!r.has_attempts());
        r.record("a.pdf".into(), FileStatus::Converted, "ok".into());
        r.record("b.pdf".into(), FileStatus::Failed, "bad".into());
        r.record("c.pdf".into(), FileStatus::Cancelled, "stop".into());
        assert_eq!((r.attempted, r.success_count, r.error_count), (3, 1, 2));
        assert!(r.has_attempts());
    }

    #[test]
    fn report_serialises() {
        let mut r = BatchReport::new("x.pdf", PathClassification::File);
        r.record("x.pdf".into(), FileStatus::Converted, "done".into());
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains(r#""classification":"file""#), "{json}");
        assert!(json.contains(r#""status":"converted""#), "{json}");
        assert!(!json.contains("markdown"), "{json}");
    }

    #[test]
    fn converted_summary_carries_markdown() {
        let mut r = BatchReport::new("a.pdf", PathClassification::File);
        r.record_converted(ConversionSummary {
            pdf: "a.pdf".into(),
            docx: None,
            markdown_path: "a.md".into(),
            markdown_bytes: 4,
            markdown: Some("# A\n".into()),
        });
        assert_eq!(r.success_count, 1);
        assert_eq!(r.outcomes[0].markdown.as_deref(), Some("# A\n"));
        assert!(r.outcomes[0].detail.contains("a.md"));
    }

    #[test]
    fn summary_message_names_artifacts() {
        let s = ConversionSummary {
            pdf: "a.pdf".into(),
            docx: Some("a.docx".into()),
            markdown_path: "a.md".into(),
            markdown_bytes: 10,
            markdown: None,
        };
        let msg = s.message();
        assert!(msg.contains("a.docx") && msg.contains("a.md"));
    }
}
