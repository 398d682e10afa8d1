//! Sibling artifact paths derived from an input PDF.
//!
//! `report.pdf` → `report.docx` + `report.md` in the same directory. Only the
//! trailing `.pdf` of the file name is replaced; `.pdf` appearing anywhere else
//! in the path is left alone.

use crate::pipeline::walk::has_pdf_suffix;
use std::path::{Path, PathBuf};

/// Input PDF plus the intermediate and final paths derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub pdf: PathBuf,
    pub docx: PathBuf,
    pub markdown: PathBuf,
}

impl ArtifactPaths {
    /// Derive artifact paths, or `None` if `pdf` has no `.pdf` suffix.
    pub fn for_pdf(pdf: &Path) -> Option<Self> {
        if !has_pdf_suffix(pdf) {
            return None;
        }
        let name = pdf.file_name()?.to_str()?;
        let stem = name.strip_suffix(".pdf")?;

        Some(Self {
            pdf: pdf.to_path_buf(),
            docx: pdf.with_file_name(format!("{stem}.docx")),
            markdown: pdf.with_file_name(format!("{stem}.md")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_sibling_paths() {
        let a = ArtifactPaths::for_pdf(Path::new("/data/report.pdf")).unwrap();
        assert_eq!(a.docx, PathBuf::from("/data/report.docx"));
        assert_eq!(a.markdown, PathBuf::from("/data/report.md"));
    }

    #[test]
    fn only_trailing_suffix_is_replaced() {
        let a = ArtifactPaths::for_pdf(Path::new("/in.pdf/scan.pdf.pdf")).unwrap();
        assert_eq!(a.docx, PathBuf::from("/in.pdf/scan.pdf.docx"));
        assert_eq!(a.markdown, PathBuf::from("/in.pdf/scan.pdf.md"));
    }

    #[test]
    fn relative_and_unicode_names() {
        let a = ArtifactPaths::for_pdf(Path::new("docs/制度 汇编.pdf")).unwrap();
        assert_eq!(a.markdown, PathBuf::from("docs/制度 汇编.md"));
    }

    #[test]
    fn non_pdf_is_rejected() {
        assert!(ArtifactPaths::for_pdf(Path::new("a.PDF")).is_none());
        assert!(ArtifactPaths::for_pdf(Path::new("a.txt")).is_none());
        assert!(ArtifactPaths::for_pdf(Path::new("/")).is_none());
    }
}
