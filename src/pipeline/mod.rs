//! Pipeline stages for PDF-to-Markdown conversion.
//!
//! Each submodule implements one step. Engines sit behind the traits in
//! [`engine`], so the orchestration in [`crate::convert`] can be tested with
//! scripted doubles and a backend can be swapped without touching the rest.
//!
//! ## Data Flow
//!
//! ```text
//! path ──▶ classify ──▶ walk ──▶ pdf ──▶ html ──▶ markdown ──▶ postprocess
//!         (file/dir)   (*.pdf)  (DOCX)  (XML)    (html2md)    (cleanup)
//! ```
//!
//! 1. [`classify`]  — file, directory, not-exist or invalid
//! 2. [`walk`]      — recursive, sorted discovery of `.pdf` files
//! 3. [`artifacts`] — sibling `.docx` / `.md` paths for a PDF
//! 4. [`pdf`]       — pdfium text extraction written out as DOCX via [`docx`];
//!    pdfium is not async-safe and runs on the blocking pool
//! 5. [`html`]      — WordprocessingML → HTML
//! 6. [`markdown`]  — HTML → Markdown, then [`postprocess`] rules

pub mod artifacts;
pub mod classify;
pub mod docx;
pub mod engine;
pub mod html;
pub mod markdown;
pub mod pdf;
pub mod postprocess;
pub mod walk;
