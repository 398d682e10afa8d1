//! Minimal DOCX package writer.
//!
//! Produces a WordprocessingML package with just enough parts for Word,
//! LibreOffice and [`crate::pipeline::html`] to open it: content types,
//! package relationships, the main document and a style sheet defining
//! `Title` and `Heading1`..`Heading6`.

use std::fmt::Write as FmtWrite;
use std::io::{self, Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One block-level element of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocxBlock {
    /// Heading with level 1..=6.
    Heading { level: u8, text: String },
    Paragraph(String),
}

/// An in-memory document that can be written as a `.docx` package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxDocument {
    blocks: Vec<DocxBlock>,
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Heading font sizes in half-points, Heading1 first.
const HEADING_SIZES: [u32; 6] = [32, 28, 26, 24, 22, 22];

impl DocxDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a heading; `level` is clamped to 1..=6.
    pub fn heading(mut self, level: u8, text: impl Into<String>) -> Self {
        self.push(DocxBlock::Heading {
            level: level.clamp(1, 6),
            text: text.into(),
        });
        self
    }

    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.push(DocxBlock::Paragraph(text.into()));
        self
    }

    pub fn push(&mut self, block: DocxBlock) {
        self.blocks.push(block);
    }

    pub fn extend(&mut self, blocks: impl IntoIterator<Item = DocxBlock>) {
        self.blocks.extend(blocks);
    }

    pub fn blocks(&self) -> &[DocxBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Render `word/document.xml`.
    pub fn document_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.blocks.len() * 96);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        let _ = write!(xml, r#"<w:document xmlns:w="{W_NS}"><w:body>"#);

        for block in &self.blocks {
            match block {
                DocxBlock::Heading { level, text } => {
                    let _ = write!(
                        xml,
                        r#"<w:p><w:pPr><w:pStyle w:val="Heading{level}"/></w:pPr>{}</w:p>"#,
                        run_xml(text)
                    );
                }
                DocxBlock::Paragraph(text) => {
                    let _ = write!(xml, "<w:p>{}</w:p>", run_xml(text));
                }
            }
        }

        xml.push_str(r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#);
        xml
    }

    /// Render the whole package into memory.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, String); 5] = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
            ("word/styles.xml", styles_xml()),
            ("word/document.xml", self.document_xml()),
        ];

        for (name, body) in parts {
            writer.start_file(name, options).map_err(io::Error::other)?;
            writer.write_all(body.as_bytes())?;
        }

        let cursor = writer.finish().map_err(io::Error::other)?;
        Ok(cursor.into_inner())
    }

    /// Write the package to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_bytes()?)
    }
}

fn run_xml(text: &str) -> String {
    let space = if text.starts_with(' ') || text.ends_with(' ') {
        r#" xml:space="preserve""#
    } else {
        ""
    };
    format!("<w:r><w:t{space}>{}</w:t></w:r>", escape_xml(text))
}

fn styles_xml() -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    let _ = write!(xml, r#"<w:styles xmlns:w="{W_NS}">"#);
    xml.push_str(
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
    );
    xml.push_str(
        r#"<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:rPr><w:b/><w:sz w:val="40"/></w:rPr></w:style>"#,
    );
    for (i, size) in HEADING_SIZES.iter().enumerate() {
        let level = i + 1;
        let _ = write!(
            xml,
            r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/><w:pPr><w:outlineLvl w:val="{i}"/></w:pPr><w:rPr><w:b/><w:sz w:val="{size}"/></w:rPr></w:style>"#
        );
    }
    xml.push_str("</w:styles>");
    xml
}

/// Escape XML special characters.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            // Control characters other than tab/newline are not allowed in XML 1.0.
            c if (c as u32) < 0x20 && c != '\t' && c != '\n' => {}
            c => out.push(c),
        }
    }
    out
}
