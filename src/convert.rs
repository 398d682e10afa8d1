//! Per-file conversion: PDF → DOCX → HTML → Markdown.
//!
//! [`Converter`] owns the three engines and drives them in order. Every
//! failure except cancellation is logged and folded into the returned value;
//! cancellation surfaces as `Err(Cancelled)` so the caller can stop.
//!
//! ```text
//! name.pdf ──PdfToDocx──▶ name.docx ──DocxToHtml──▶ HTML ──HtmlToMarkdown──▶ name.md
//! ```

use crate::cancel::CancelFlag;
use crate::config::ConversionConfig;
use crate::error::{Cancelled, ConvertError};
use crate::output::{ConversionOutcome, ConversionSummary};
use crate::pipeline::artifacts::ArtifactPaths;
use crate::pipeline::engine::{DocxToHtml, HtmlToMarkdown, PdfToDocx};
use crate::pipeline::html::DocxHtmlExtractor;
use crate::pipeline::markdown::Html2MdTransformer;
use crate::pipeline::pdf::PdfiumDocxEngine;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Drives the conversion stages for one file at a time.
pub struct Converter {
    pdf: Box<dyn PdfToDocx>,
    html: Box<dyn DocxToHtml>,
    markdown: Box<dyn HtmlToMarkdown>,
    config: ConversionConfig,
    cancel: CancelFlag,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Converter {
    /// Converter with the default engines (pdfium, quick-xml, html2md).
    ///
    /// Downloads the pdfium library on first use.
    pub fn new(config: ConversionConfig) -> Result<Self, ConvertError> {
        let pdf = PdfiumDocxEngine::new(&config)?;
        Ok(Self::with_engines(
            config,
            pdf,
            DocxHtmlExtractor,
            Html2MdTransformer,
        ))
    }

    /// Converter with caller-supplied engines.
    pub fn with_engines(
        config: ConversionConfig,
        pdf: impl PdfToDocx + 'static,
        html: impl DocxToHtml + 'static,
        markdown: impl HtmlToMarkdown + 'static,
    ) -> Self {
        Self {
            pdf: Box::new(pdf),
            html: Box::new(html),
            markdown: Box::new(markdown),
            config,
            cancel: CancelFlag::new(),
        }
    }

    /// Share an externally owned cancellation flag (e.g. a Ctrl-C handler's).
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Stage one: convert `pdf` to a sibling `.docx`.
    ///
    /// Returns `Ok(None)` (after logging why) for non-PDF input, a missing or
    /// empty file, or an engine failure. The engine is not invoked when a
    /// precondition fails.
    pub fn pdf_to_docx(&self, pdf: &Path) -> Result<Option<PathBuf>, Cancelled> {
        let result = ArtifactPaths::for_pdf(pdf)
            .ok_or_else(|| ConvertError::NotApplicable {
                path: pdf.to_path_buf(),
            })
            .and_then(|paths| self.stage_one(&paths).map(|()| paths.docx));

        match result {
            Ok(docx) => Ok(Some(docx)),
            Err(ConvertError::Cancelled) => Err(Cancelled),
            Err(e) => {
                log_failure(&e);
                Ok(None)
            }
        }
    }

    /// Stage two: convert `pdf` all the way to a sibling `.md`.
    ///
    /// Overwrites any existing Markdown file. Never fails except on
    /// cancellation; every other problem becomes
    /// [`ConversionOutcome::Failed`].
    pub fn pdf_to_markdown(&self, pdf: &Path) -> Result<ConversionOutcome, Cancelled> {
        match self.try_pdf_to_markdown(pdf) {
            Ok(summary) => {
                info!("Converted {}", summary.message());
                Ok(ConversionOutcome::Converted(summary))
            }
            Err(ConvertError::Cancelled) => {
                warn!("Cancelled while converting '{}'", pdf.display());
                Err(Cancelled)
            }
            Err(e) => {
                log_failure(&e);
                Ok(ConversionOutcome::Failed(e))
            }
        }
    }

    fn try_pdf_to_markdown(&self, pdf: &Path) -> Result<ConversionSummary, ConvertError> {
        let paths = ArtifactPaths::for_pdf(pdf).ok_or_else(|| ConvertError::NotApplicable {
            path: pdf.to_path_buf(),
        })?;

        // The engine may already have written the DOCX when stage one reports
        // a failure or a cancellation, so cleanup runs on every path.
        let result = self
            .stage_one(&paths)
            .and_then(|()| check_intermediate(&paths.docx))
            .and_then(|()| self.docx_to_markdown(&paths));
        if !self.config.keep_intermediate {
            remove_best_effort(&paths.docx);
        }
        result
    }

    /// Preconditions, then the PDF engine.
    fn stage_one(&self, paths: &ArtifactPaths) -> Result<(), ConvertError> {
        self.cancel.check()?;

        let meta = std::fs::metadata(&paths.pdf).map_err(|_| ConvertError::FileNotFound {
            path: paths.pdf.clone(),
        })?;
        if !meta.is_file() {
            return Err(ConvertError::FileNotFound {
                path: paths.pdf.clone(),
            });
        }
        if meta.len() == 0 {
            return Err(ConvertError::EmptyFile {
                path: paths.pdf.clone(),
            });
        }

        debug!(
            "PDF → DOCX: {} → {}",
            paths.pdf.display(),
            paths.docx.display()
        );
        self.pdf
            .convert(&paths.pdf, &paths.docx)
            .map_err(|e| ConvertError::from_engine(&paths.pdf, e))?;

        self.cancel.check()?;
        Ok(())
    }

    fn docx_to_markdown(&self, paths: &ArtifactPaths) -> Result<ConversionSummary, ConvertError> {
        let bytes = std::fs::read(&paths.docx).map_err(|_| ConvertError::IntermediateMissing {
            path: paths.docx.clone(),
        })?;

        let html = self
            .html
            .to_html(&bytes)
            .map_err(|e| ConvertError::from_engine(&paths.docx, e))?;
        if html.trim().is_empty() {
            return Err(ConvertError::ExtractionEmpty {
                path: paths.docx.clone(),
            });
        }
        self.cancel.check()?;

        let markdown = self
            .markdown
            .to_markdown(&html)
            .map_err(|e| ConvertError::from_engine(&paths.docx, e))?;
        if markdown.trim().is_empty() {
            return Err(ConvertError::ExtractionEmpty {
                path: paths.docx.clone(),
            });
        }
        self.cancel.check()?;

        write_replacing(&paths.markdown, &markdown)?;

        Ok(ConversionSummary {
            pdf: paths.pdf.clone(),
            docx: self.config.keep_intermediate.then(|| paths.docx.clone()),
            markdown_path: paths.markdown.clone(),
            markdown_bytes: markdown.len(),
            markdown: self.config.echo_markdown.then_some(markdown),
        })
    }
}

/// The DOCX must exist and be non-empty; a hollow one is removed.
fn check_intermediate(docx: &Path) -> Result<(), ConvertError> {
    let ok = std::fs::metadata(docx)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false);
    if ok {
        Ok(())
    } else {
        remove_best_effort(docx);
        Err(ConvertError::IntermediateMissing {
            path: docx.to_path_buf(),
        })
    }
}

/// Write UTF-8 text to `path` atomically: temp file, then rename.
///
/// A reader (or an interrupted run) never sees a half-written file.
fn write_replacing(path: &Path, text: &str) -> Result<(), ConvertError> {
    let tmp_path = path.with_extension("md.tmp");
    std::fs::write(&tmp_path, text.as_bytes()).map_err(|e| ConvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        remove_best_effort(&tmp_path);
        ConvertError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

fn remove_best_effort(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove '{}': {}", path.display(), e),
    }
}

fn log_failure(err: &ConvertError) {
    match err {
        ConvertError::NotApplicable { path } => {
            info!("Skipping '{}': not a .pdf file", path.display())
        }
        ConvertError::FileNotFound { .. } | ConvertError::EmptyFile { .. } => {
            warn!("Precondition failed: {err}")
        }
        ConvertError::UnreadableSource { .. } => {
            warn!("Source PDF is corrupt, encrypted or not a PDF: {err}")
        }
        ConvertError::ResourceExhausted { .. } => error!("Out of memory: {err}"),
        ConvertError::ConversionFailed { .. } => warn!("PDF engine failed: {err}"),
        ConvertError::Encoding { .. } => warn!("Decoding failed: {err}"),
        ConvertError::ExtractionEmpty { .. } => warn!("Nothing extracted: {err}"),
        ConvertError::OutputWriteFailed { .. } => error!("Write failed: {err}"),
        _ => warn!("{err}"),
    }
}
