//! # pdfmd-batch
//!
//! Batch-convert PDF documents to Markdown by way of an intermediate DOCX.
//!
//! Point it at a single `.pdf` file or at a directory tree. Every PDF found is
//! converted in place: `report.pdf` gains a sibling `report.docx` (optional)
//! and `report.md`. A corrupt or empty file is reported and skipped; the
//! rest of the batch carries on.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input path
//!  │
//!  ├─ 1. Classify  file / directory / not-exist / invalid
//!  ├─ 2. Discover  recursive walk, keep `*.pdf` (case-sensitive), sorted
//!  ├─ 3. PDF→DOCX  pdfium text + font sizes → headings and paragraphs
//!  ├─ 4. DOCX→HTML WordprocessingML reader (quick-xml)
//!  ├─ 5. HTML→MD   html2md + ATX headings + whitespace cleanup
//!  └─ 6. Write     atomic replace of `name.md`, optional DOCX removal
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfmd_batch::{run_batch, ConversionConfig, Converter};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .keep_intermediate(false)
//!         .build()?;
//!     // Downloads pdfium on first use.
//!     let converter = Converter::new(config)?;
//!     let report = run_batch("./policies", &converter, None);
//!     eprintln!(
//!         "{} converted, {} failed",
//!         report.success_count, report.error_count
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfmd` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdfmd-batch = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod cancel;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{run_batch, run_batch_async};
pub use cancel::CancelFlag;
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::Converter;
pub use error::{Cancelled, ConvertError};
pub use output::{BatchReport, ConversionOutcome, ConversionSummary, FileReport, FileStatus};
pub use pipeline::artifacts::ArtifactPaths;
pub use pipeline::classify::{classify_path, PathClassification};
pub use pipeline::docx::{DocxBlock, DocxDocument};
pub use pipeline::engine::{
    DocxToHtml, EngineError, EngineErrorKind, HtmlToMarkdown, PdfToDocx,
};
pub use pipeline::html::DocxHtmlExtractor;
pub use pipeline::markdown::Html2MdTransformer;
pub use pipeline::pdf::PdfiumDocxEngine;
pub use pipeline::walk::{collect_files, collect_pdfs};
pub use progress::{BatchProgressCallback, NoopProgress, ProgressCallback};
