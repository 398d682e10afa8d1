//! PDF → DOCX via pdfium text extraction.
//!
//! ## How structure is recovered
//!
//! PDFs carry no semantic headings, only positioned glyphs. We take each
//! page's text (pdfium already orders it and inserts line breaks) and the
//! font size of every text object. The most common size, weighted by
//! character count, is body text; runs set noticeably larger become headings,
//! ranked by size (largest → level 1). Remaining lines are re-flowed into
//! paragraphs: wrapped lines are joined and end-of-line hyphens removed.
//!
//! ## Handle lifetime
//!
//! The pdfium binding and the opened document are locals of
//! [`PdfiumDocxEngine::convert`]; `Drop` closes the document and unbinds the
//! library on every exit path, including `?` early returns. Nothing is
//! cached between files.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::pipeline::docx::{DocxBlock, DocxDocument};
use crate::pipeline::engine::{EngineError, EngineErrorKind, PdfToDocx};
use pdfium_render::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default [`PdfToDocx`] engine backed by pdfium.
#[derive(Debug, Clone)]
pub struct PdfiumDocxEngine {
    library: PathBuf,
    password: Option<String>,
    heading_ratio: f32,
}

impl PdfiumDocxEngine {
    /// Locate (downloading on first use) the pdfium library.
    pub fn new(config: &ConversionConfig) -> Result<Self, ConvertError> {
        let library = pdfium_auto::ensure_pdfium_library(None)
            .map_err(|e| ConvertError::PdfiumBindingFailed(e.to_string()))?;
        info!("Using pdfium library at {}", library.display());
        Ok(Self::with_library(library, config))
    }

    /// Use an explicit pdfium shared library.
    pub fn with_library(library: PathBuf, config: &ConversionConfig) -> Self {
        Self {
            library,
            password: config.password.clone(),
            heading_ratio: config.heading_ratio,
        }
    }
}

impl PdfToDocx for PdfiumDocxEngine {
    fn convert(&self, pdf: &Path, docx: &Path) -> Result<(), EngineError> {
        let pdfium = pdfium_auto::bind_pdfium_from_path(&self.library)
            .map_err(|e| EngineError::new(EngineErrorKind::Failed, e.to_string()))?;

        let document = pdfium
            .load_pdf_from_file(pdf, self.password.as_deref())
            .map_err(|e| EngineError::classified(format!("{e:?}")))?;

        let mut out = DocxDocument::new();
        for (idx, page) in document.pages().iter().enumerate() {
            let text = page
                .text()
                .map_err(|e| EngineError::classified(format!("page {}: {e:?}", idx + 1)))?
                .all();

            let runs: Vec<TextRun> = page
                .objects()
                .iter()
                .filter_map(|obj| {
                    obj.as_text_object().map(|t| TextRun {
                        text: t.text(),
                        size: t.scaled_font_size().value,
                    })
                })
                .collect();

            let blocks = page_blocks(&text, &heading_levels(&runs, self.heading_ratio));
            debug!("Page {}: {} blocks", idx + 1, blocks.len());
            out.extend(blocks);
        }

        out.write_to(docx)
            .map_err(|e| EngineError::classified(format!("writing {}: {e}", docx.display())))
    }
}

/// A text object and the size it is set in.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TextRun {
    pub text: String,
    pub size: f32,
}

fn normalise(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Round to half a point so near-identical sizes compare equal.
fn size_key(size: f32) -> i32 {
    (size * 2.0).round() as i32
}

/// Map normalised heading text to a heading level.
///
/// Consecutive runs of the same size are merged first, since pdfium often
/// splits one visual line into several text objects.
pub(crate) fn heading_levels(runs: &[TextRun], ratio: f32) -> HashMap<String, u8> {
    let mut weight: HashMap<i32, usize> = HashMap::new();
    for run in runs {
        *weight.entry(size_key(run.size)).or_default() += run.text.chars().count();
    }
    let Some(body) = weight
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(k, _)| *k)
    else {
        return HashMap::new();
    };

    let threshold = (body as f32 * ratio).ceil() as i32;
    let mut sizes: Vec<i32> = weight.keys().copied().filter(|k| *k >= threshold).collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));

    let mut merged: Vec<(i32, String)> = Vec::new();
    for run in runs {
        let key = size_key(run.size);
        match merged.last_mut() {
            Some((k, text)) if *k == key => {
                text.push(' ');
                text.push_str(&run.text);
            }
            _ => merged.push((key, run.text.clone())),
        }
    }

    let mut levels = HashMap::new();
    for (key, text) in merged {
        if let Some(rank) = sizes.iter().position(|s| *s == key) {
            let text = normalise(&text);
            if !text.is_empty() {
                levels.entry(text).or_insert((rank + 1).min(6) as u8);
            }
        }
    }
    levels
}

/// Level of the heading `line` is, or starts, if any.
fn heading_for(line: &str, headings: &HashMap<String, u8>) -> Option<u8> {
    if let Some(level) = headings.get(line) {
        return Some(*level);
    }
    let len = line.chars().count();
    headings
        .iter()
        .filter(|(text, _)| text.starts_with(line) && len * 3 >= text.chars().count())
        .map(|(_, level)| *level)
        .min()
}

/// Split one page of text into heading and paragraph blocks.
pub(crate) fn page_blocks(page_text: &str, headings: &HashMap<String, u8>) -> Vec<DocxBlock> {
    let mut blocks = Vec::new();
    let mut para = String::new();

    let flush = |para: &mut String, blocks: &mut Vec<DocxBlock>| {
        if !para.is_empty() {
            blocks.push(DocxBlock::Paragraph(std::mem::take(para)));
        }
    };

    for raw in page_text.lines() {
        let line = normalise(raw);
        if line.is_empty() {
            flush(&mut para, &mut blocks);
            continue;
        }

        // Continuation of a heading that wrapped onto several lines.
        if para.is_empty() {
            if let Some(DocxBlock::Heading { text, .. }) = blocks.last_mut() {
                if !headings.contains_key(text.as_str()) {
                    let joined = format!("{text} {line}");
                    if headings.keys().any(|h| h.starts_with(&joined)) {
                        *text = joined;
                        continue;
                    }
                }
            }
        }

        if let Some(level) = heading_for(&line, headings) {
            flush(&mut para, &mut blocks);
            blocks.push(DocxBlock::Heading { level, text: line });
            continue;
        }

        if para.is_empty() {
            para = line;
        } else if para.ends_with('-') && !para.ends_with(" -") {
            para.pop();
            para.push_str(&line);
        } else {
            para.push(' ');
            para.push_str(&line);
        }
    }
    flush(&mut para, &mut blocks);
    blocks
}
