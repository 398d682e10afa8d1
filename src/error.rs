//! Error types for the pdfmd-batch library.
//!
//! Two distinct types reflect two distinct propagation rules:
//!
//! * [`ConvertError`] — **Per-file**: anything that stops one PDF from
//!   becoming Markdown (missing input, corrupt PDF, empty extraction, write
//!   failure). These never escape a stage function; they are folded into
//!   [`crate::output::ConversionOutcome::Failed`] so a batch keeps going.
//!
//! * [`Cancelled`] — **Batch-wide**: the operator interrupted the run. This is
//!   the only condition stage functions return as `Err`, so the batch loop can
//!   stop immediately and report partial progress.

use crate::pipeline::engine::{EngineError, EngineErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Every way a single file's conversion can fail.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The path string could not be interpreted as a filesystem path.
    #[error("Invalid path '{input}': {reason}")]
    InvalidPath { input: String, reason: String },

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Input file exists but has zero bytes.
    #[error("PDF file is empty: '{path}'")]
    EmptyFile { path: PathBuf },

    /// Input does not carry the case-sensitive `.pdf` suffix.
    #[error("Not a PDF (expected a '.pdf' suffix): '{path}'")]
    NotApplicable { path: PathBuf },

    // ── PDF → DOCX errors ─────────────────────────────────────────────────
    /// PDF is corrupt, encrypted, or not a PDF at all.
    #[error("PDF '{path}' cannot be read (corrupt, password-protected or invalid format): {detail}")]
    UnreadableSource { path: PathBuf, detail: String },

    /// The engine ran out of memory or another resource.
    #[error("Ran out of memory converting '{path}': {detail}\nTry closing other programs or splitting the PDF.")]
    ResourceExhausted { path: PathBuf, detail: String },

    /// Any other engine failure.
    #[error("Conversion of '{path}' failed: {detail}")]
    ConversionFailed { path: PathBuf, detail: String },

    /// Stage one reported success but the DOCX is missing or empty.
    #[error("Intermediate DOCX '{path}' is missing or empty")]
    IntermediateMissing { path: PathBuf },

    // ── DOCX → Markdown errors ────────────────────────────────────────────
    /// The DOCX yielded no usable content.
    #[error("No content could be extracted from '{path}'")]
    ExtractionEmpty { path: PathBuf },

    /// Text in the DOCX could not be decoded.
    #[error("Text decoding failed for '{path}': {detail}")]
    Encoding { path: PathBuf, detail: String },

    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Control flow ──────────────────────────────────────────────────────
    /// The operator interrupted the run.
    #[error("Conversion cancelled by user")]
    Cancelled,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If the auto-download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (including a panicking engine).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// `true` only for [`ConvertError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ConvertError::Cancelled)
    }

    /// Attach a file path to an engine failure, keeping its category.
    pub fn from_engine(path: &Path, err: EngineError) -> Self {
        let path = path.to_path_buf();
        let detail = err.message;
        match err.kind {
            EngineErrorKind::UnreadableSource => ConvertError::UnreadableSource { path, detail },
            EngineErrorKind::ResourceExhausted => ConvertError::ResourceExhausted { path, detail },
            EngineErrorKind::Encoding => ConvertError::Encoding { path, detail },
            EngineErrorKind::Failed => ConvertError::ConversionFailed { path, detail },
        }
    }

    /// Short machine-friendly category name, used in JSON reports.
    pub fn category(&self) -> &'static str {
        match self {
            ConvertError::InvalidPath { .. } => "path-invalid",
            ConvertError::FileNotFound { .. } => "path-not-found",
            ConvertError::EmptyFile { .. } => "file-empty",
            ConvertError::NotApplicable { .. } => "not-applicable",
            ConvertError::UnreadableSource { .. } => "engine-unreadable-source",
            ConvertError::ResourceExhausted { .. } => "engine-resource-exhaustion",
            ConvertError::ConversionFailed { .. } => "engine-generic-failure",
            ConvertError::IntermediateMissing { .. } => "intermediate-missing",
            ConvertError::ExtractionEmpty { .. } => "extraction-empty",
            ConvertError::Encoding { .. } => "encoding-error",
            ConvertError::OutputWriteFailed { .. } => "write-failure",
            ConvertError::Cancelled => "user-cancelled",
            ConvertError::InvalidConfig(_) => "config-invalid",
            ConvertError::PdfiumBindingFailed(_) => "engine-binding",
            ConvertError::Internal(_) => "internal",
        }
    }
}

/// The operator interrupted the batch; the only error stages propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Conversion cancelled by user")]
pub struct Cancelled;

impl From<Cancelled> for ConvertError {
    fn from(_: Cancelled) -> Self {
        ConvertError::Cancelled
    }
}
