//! HTML → Markdown transformation.
//!
//! `html2md` does the structural work; [`postprocess::clean_markdown`] then
//! rewrites its setext `h1`/`h2` underlines and closed `### h3 ###` headings
//! into plain ATX `#` markers and normalises whitespace.

use crate::pipeline::engine::{EngineError, HtmlToMarkdown};
use crate::pipeline::postprocess;

/// Default [`HtmlToMarkdown`] engine, always producing ATX headings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Html2MdTransformer;

impl HtmlToMarkdown for Html2MdTransformer {
    fn to_markdown(&self, html: &str) -> Result<String, EngineError> {
        let raw = html2md::parse_html(html);
        Ok(postprocess::clean_markdown(&raw))
    }
}
