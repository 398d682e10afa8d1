//! DOCX → HTML extraction.
//!
//! Streams `word/document.xml` with quick-xml and emits a small, flat HTML
//! vocabulary: `h1`..`h6`, `p`, `strong`, `em`, `br`, `ul/li` and simple
//! tables. Text is copied through still XML-escaped, which is also valid
//! HTML, so nothing is unescaped and re-escaped on the way.

use crate::pipeline::engine::{DocxToHtml, EngineError, EngineErrorKind};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tracing::debug;

const DOCUMENT_PART: &str = "word/document.xml";

/// Default [`DocxToHtml`] engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxHtmlExtractor;

impl DocxToHtml for DocxHtmlExtractor {
    fn to_html(&self, docx: &[u8]) -> Result<String, EngineError> {
        let xml = read_document_part(docx)?;
        let html = document_xml_to_html(&xml)?;
        debug!("Extracted {} bytes of HTML", html.len());
        Ok(html)
    }
}

/// Pull `word/document.xml` out of a DOCX package.
pub fn read_document_part(docx: &[u8]) -> Result<Vec<u8>, EngineError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).map_err(|e| {
        EngineError::new(
            EngineErrorKind::UnreadableSource,
            format!("not a DOCX package: {e}"),
        )
    })?;

    let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| {
        EngineError::new(
            EngineErrorKind::UnreadableSource,
            format!("missing {DOCUMENT_PART}: {e}"),
        )
    })?;

    let mut xml = Vec::with_capacity(prealloc_hint(part.size()));
    part.read_to_end(&mut xml)
        .map_err(|e| EngineError::classified(format!("reading {DOCUMENT_PART}: {e}")))?;
    Ok(xml)
}

/// Upper bound on the up-front buffer; the zip header's size is untrusted.
const MAX_PREALLOC: u64 = 8 * 1024 * 1024;

fn prealloc_hint(declared: u64) -> usize {
    declared.min(MAX_PREALLOC) as usize
}

#[derive(Default)]
struct Paragraph {
    style: Option<String>,
    outline: Option<u8>,
    numbered: bool,
    content: String,
}

impl Paragraph {
    fn heading_level(&self) -> Option<u8> {
        if let Some(style) = self.style.as_deref() {
            if style.eq_ignore_ascii_case("title") {
                return Some(1);
            }
            let lower = style.to_ascii_lowercase();
            if let Some(rest) = lower.strip_prefix("heading") {
                if let Ok(n) = rest.trim().parse::<u8>() {
                    return Some(n.clamp(1, 6));
                }
            }
        }
        // outlineLvl 9 means "body text".
        self.outline.filter(|l| *l < 6).map(|l| l + 1)
    }
}

#[derive(Default)]
struct Run {
    bold: bool,
    italic: bool,
    text: String,
}

/// Convert WordprocessingML body markup into HTML.
pub fn document_xml_to_html(xml: &[u8]) -> Result<String, EngineError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut html = String::with_capacity(xml.len() / 2);
    let mut para: Option<Paragraph> = None;
    let mut run: Option<Run> = None;
    let mut in_text = false;
    let mut in_rpr = false;
    let mut in_list = false;
    let mut table_depth = 0usize;
    let mut cell_has_content = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => para = Some(Paragraph::default()),
                b"r" => run = Some(Run::default()),
                b"rPr" => in_rpr = true,
                b"t" => in_text = true,
                b"tbl" => {
                    close_list(&mut html, &mut in_list);
                    table_depth += 1;
                    html.push_str("<table>");
                }
                b"tr" if table_depth > 0 => html.push_str("<tr>"),
                b"tc" if table_depth > 0 => {
                    html.push_str("<td>");
                    cell_has_content = false;
                }
                _ => apply_property(&e, para.as_mut(), run.as_mut(), in_rpr),
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"br" | b"cr" => {
                    if let Some(p) = para.as_mut() {
                        flush_run(p, run.as_mut());
                        p.content.push_str("<br />");
                    }
                }
                b"tab" => {
                    if let Some(r) = run.as_mut() {
                        r.text.push(' ');
                    }
                }
                _ => apply_property(&e, para.as_mut(), run.as_mut(), in_rpr),
            },
            Ok(Event::Text(t)) if in_text => {
                let text = std::str::from_utf8(&t).map_err(|e| {
                    EngineError::new(EngineErrorKind::Encoding, format!("invalid UTF-8 in text: {e}"))
                })?;
                if let Some(r) = run.as_mut() {
                    r.text.push_str(text);
                }
            }
            Ok(Event::GeneralRef(r)) if in_text => {
                let name = std::str::from_utf8(&r).map_err(|e| {
                    EngineError::new(EngineErrorKind::Encoding, format!("invalid UTF-8 in entity: {e}"))
                })?;
                if let Some(run) = run.as_mut() {
                    run.text.push('&');
                    run.text.push_str(name);
                    run.text.push(';');
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"rPr" => in_rpr = false,
                b"r" => {
                    if let Some(p) = para.as_mut() {
                        flush_run(p, run.as_mut());
                    }
                    run = None;
                }
                b"p" => {
                    if let Some(p) = para.take() {
                        if table_depth > 0 {
                            push_cell_paragraph(&mut html, &p, &mut cell_has_content);
                        } else {
                            push_paragraph(&mut html, &p, &mut in_list);
                        }
                    }
                }
                b"tc" if table_depth > 0 => html.push_str("</td>"),
                b"tr" if table_depth > 0 => html.push_str("</tr>\n"),
                b"tbl" if table_depth > 0 => {
                    table_depth -= 1;
                    html.push_str("</table>\n");
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(EngineError::new(
                    EngineErrorKind::UnreadableSource,
                    format!("malformed {DOCUMENT_PART}: {e}"),
                ))
            }
            _ => {}
        }
    }

    close_list(&mut html, &mut in_list);
    Ok(html)
}

fn apply_property(
    e: &BytesStart<'_>,
    para: Option<&mut Paragraph>,
    run: Option<&mut Run>,
    in_rpr: bool,
) {
    match e.local_name().as_ref() {
        b"pStyle" => {
            if let (Some(p), Some(v)) = (para, attr_val(e)) {
                p.style = Some(v);
            }
        }
        b"outlineLvl" => {
            if let (Some(p), Some(v)) = (para, attr_val(e)) {
                p.outline = v.parse().ok();
            }
        }
        b"numPr" => {
            if let Some(p) = para {
                p.numbered = true;
            }
        }
        b"b" if in_rpr => {
            if let Some(r) = run {
                r.bold = toggle_on(e);
            }
        }
        b"i" if in_rpr => {
            if let Some(r) = run {
                r.italic = toggle_on(e);
            }
        }
        _ => {}
    }
}

fn attr_val(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == b"val")
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// `<w:b/>` is on; `<w:b w:val="0"/>` / `"false"` is off.
fn toggle_on(e: &BytesStart<'_>) -> bool {
    !matches!(attr_val(e).as_deref(), Some("0") | Some("false") | Some("off"))
}

fn flush_run(p: &mut Paragraph, run: Option<&mut Run>) {
    let Some(r) = run else { return };
    if r.text.is_empty() {
        return;
    }
    let text = std::mem::take(&mut r.text);
    if text.trim().is_empty() {
        p.content.push_str(&text);
        return;
    }
    match (r.bold, r.italic) {
        (true, true) => p.content.push_str(&format!("<strong><em>{text}</em></strong>")),
        (true, false) => p.content.push_str(&format!("<strong>{text}</strong>")),
        (false, true) => p.content.push_str(&format!("<em>{text}</em>")),
        (false, false) => p.content.push_str(&text),
    }
}

fn push_paragraph(html: &mut String, p: &Paragraph, in_list: &mut bool) {
    let content = p.content.trim();
    if content.is_empty() {
        return;
    }

    if let Some(level) = p.heading_level() {
        close_list(html, in_list);
        html.push_str(&format!("<h{level}>{content}</h{level}>\n"));
    } else if p.numbered {
        if !*in_list {
            html.push_str("<ul>\n");
            *in_list = true;
        }
        html.push_str(&format!("<li>{content}</li>\n"));
    } else {
        close_list(html, in_list);
        html.push_str(&format!("<p>{content}</p>\n"));
    }
}

fn push_cell_paragraph(html: &mut String, p: &Paragraph, has_content: &mut bool) {
    let content = p.content.trim();
    if content.is_empty() {
        return;
    }
    if *has_content {
        html.push(' ');
    }
    html.push_str(content);
    *has_content = true;
}

fn close_list(html: &mut String, in_list: &mut bool) {
    if *in_list {
        html.push_str("</ul>\n");
        *in_list = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::docx::DocxDocument;

    fn body(inner: &str) -> Vec<u8> {
        format!(
            r#"<?xml version="1.0"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{inner}</w:body></w:document>"#
        )
        .into_bytes()
    }

    #[test]
    fn headings_and_paragraphs() {
        let xml = body(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Scope</w:t></w:r></w:p>
               <w:p><w:r><w:t>Plain text.</w:t></w:r></w:p>"#,
        );
        let html = document_xml_to_html(&xml).unwrap();
        assert!(html.contains("<h2>Scope</h2>"), "got: {html}");
        assert!(html.contains("<p>Plain text.</p>"), "got: {html}");
    }

    #[test]
    fn title_style_and_outline_level() {
        let xml = body(
            r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Doc</w:t></w:r></w:p>
               <w:p><w:pPr><w:outlineLvl w:val="2"/></w:pPr><w:r><w:t>Sub</w:t></w:r></w:p>
               <w:p><w:pPr><w:outlineLvl w:val="9"/></w:pPr><w:r><w:t>Body</w:t></w:r></w:p>"#,
        );
        let html = document_xml_to_html(&xml).unwrap();
        assert!(html.contains("<h1>Doc</h1>"));
        assert!(html.contains("<h3>Sub</h3>"));
        assert!(html.contains("<p>Body</p>"));
    }

    #[test]
    fn bold_italic_runs() {
        let xml = body(
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>bold</w:t></w:r><w:r><w:t xml:space="preserve"> and </w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>it</w:t></w:r><w:r><w:rPr><w:b w:val="0"/></w:rPr><w:t>!</w:t></w:r></w:p>"#,
        );
        let html = document_xml_to_html(&xml).unwrap();
        assert_eq!(html, "<p><strong>bold</strong> and <em>it</em>!</p>\n");
    }

    #[test]
    fn entities_pass_through_escaped() {
        let xml = body(r#"<w:p><w:r><w:t>a &amp; b &lt; c</w:t></w:r></w:p>"#);
        let html = document_xml_to_html(&xml).unwrap();
        assert!(html.contains("a &amp; b &lt; c"), "got: {html}");
    }

    #[test]
    fn numbered_paragraphs_become_list() {
        let xml = body(
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>one</w:t></w:r></w:p>
               <w:p><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>two</w:t></w:r></w:p>
               <w:p><w:r><w:t>after</w:t></w:r></w:p>"#,
        );
        let html = document_xml_to_html(&xml).unwrap();
        assert_eq!(
            html,
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n<p>after</p>\n"
        );
    }

    #[test]
    fn simple_table() {
        let xml = body(
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>B</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );
        let html = document_xml_to_html(&xml).unwrap();
        assert!(html.contains("<table><tr><td>A</td><td>B</td></tr>"), "got: {html}");
    }

    #[test]
    fn empty_body_gives_empty_html() {
        let html = document_xml_to_html(&body("<w:p/><w:p><w:r><w:t> </w:t></w:r></w:p>")).unwrap();
        assert!(html.trim().is_empty());
    }

    #[test]
    fn written_package_round_trips_to_html() {
        let bytes = DocxDocument::new()
            .heading(1, "Policy")
            .paragraph("Rules & regulations")
            .to_bytes()
            .unwrap();
        let html = DocxHtmlExtractor.to_html(&bytes).unwrap();
        assert!(html.contains("<h1>Policy</h1>"));
        assert!(html.contains("<p>Rules &amp; regulations</p>"));
    }

    #[test]
    fn garbage_is_unreadable() {
        let err = DocxHtmlExtractor.to_html(b"definitely not a zip").unwrap_err();
        assert_eq!(err.kind, EngineErrorKind::UnreadableSource);
    }

    #[test]
    fn declared_part_size_does_not_drive_allocation() {
        assert_eq!(prealloc_hint(4096), 4096);
        assert_eq!(prealloc_hint(u64::MAX), MAX_PREALLOC as usize);
    }
}
