//! Capability interfaces for the three conversion engines.
//!
//! The orchestration in [`crate::convert`] only ever talks to these traits.
//! Engines report failures as an [`EngineError`] carrying a coarse
//! [`EngineErrorKind`]; callers branch on the kind, never on message text.
//! Engines that can only surface free-form text (e.g. a C library's debug
//! string) use [`EngineErrorKind::classify`] at their own boundary.

use std::fmt;
use std::path::Path;

/// Coarse failure category reported by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// Source is corrupt, password-protected, or not in the expected format.
    UnreadableSource,
    /// Memory (or another resource) ran out.
    ResourceExhausted,
    /// Text could not be decoded.
    Encoding,
    /// Anything else.
    Failed,
}

const UNREADABLE_KEYWORDS: &[&str] = &[
    "corrupt", "damaged", "password", "encrypt", "security", "invalid", "format", "xref",
    "not a pdf", "header",
];

const EXHAUSTION_KEYWORDS: &[&str] = &["memory", "alloc", "oom", "capacity overflow"];

impl EngineErrorKind {
    /// Best-effort classification of an engine's free-form error text.
    ///
    /// Unreadable-source keywords win over memory keywords.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if UNREADABLE_KEYWORDS.iter().any(|k| lower.contains(k)) {
            EngineErrorKind::UnreadableSource
        } else if EXHAUSTION_KEYWORDS.iter().any(|k| lower.contains(k)) {
            EngineErrorKind::ResourceExhausted
        } else {
            EngineErrorKind::Failed
        }
    }
}

/// A failure reported by one of the engines.
#[derive(Debug, Clone)]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build an error whose kind is inferred from the message.
    pub fn classified(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: EngineErrorKind::classify(&message),
            message,
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for EngineError {}

/// PDF → DOCX engine.
///
/// `convert` must translate the whole document (no page range) and write a
/// DOCX package at `docx`. Any handle the engine opens must be released
/// before `convert` returns, on success and failure alike.
pub trait PdfToDocx: Send + Sync {
    fn convert(&self, pdf: &Path, docx: &Path) -> Result<(), EngineError>;
}

/// DOCX → HTML extraction engine.
pub trait DocxToHtml: Send + Sync {
    fn to_html(&self, docx: &[u8]) -> Result<String, EngineError>;
}

/// HTML → Markdown transformer. Headings must come out in ATX style.
pub trait HtmlToMarkdown: Send + Sync {
    fn to_markdown(&self, html: &str) -> Result<String, EngineError>;
}
