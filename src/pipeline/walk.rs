//! Recursive directory enumeration.
//!
//! Entries are visited depth-first and sorted by file name at every level,
//! so the same tree always yields the same list. Traversal errors (an
//! unreadable subtree, a vanished entry) are logged and skipped; the walk
//! returns everything it could reach.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// All files reachable under `dir`, excluding the directories themselves.
///
/// Symlinks are not descended into, but a symlink that resolves to a regular
/// file is listed.
pub fn collect_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under '{}': {}", dir.display(), e);
                continue;
            }
        };

        let ft = entry.file_type();
        if ft.is_file() || (ft.is_symlink() && entry.path().is_file()) {
            files.push(entry.into_path());
        }
    }

    debug!("Found {} files under '{}'", files.len(), dir.display());
    files
}

/// `true` when the final path component ends in `.pdf` (case-sensitive).
pub fn has_pdf_suffix(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".pdf"))
}

/// [`collect_files`] filtered to `.pdf`-suffixed paths.
pub fn collect_pdfs(dir: &Path) -> Vec<PathBuf> {
    collect_files(dir)
        .into_iter()
        .filter(|p| has_pdf_suffix(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn walks_recursively_files_only() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.pdf"));
        touch(&dir.path().join("sub/b.txt"));
        touch(&dir.path().join("sub/deeper/c.pdf"));
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();

        let files = collect_files(dir.path());
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|f| f.is_file()));
    }

    #[test]
    fn order_is_sorted_and_stable() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("b.pdf"));
        touch(&dir.path().join("a.pdf"));
        touch(&dir.path().join("c/z.pdf"));

        let names: Vec<_> = collect_files(dir.path())
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.pdf"),
                PathBuf::from("b.pdf"),
                PathBuf::from("c/z.pdf")
            ]
        );
        assert_eq!(collect_files(dir.path()), collect_files(dir.path()));
    }

    #[test]
    fn pdf_filter_ignores_other_files() {
        let dir = TempDir::new().unwrap();
        for name in ["one.pdf", "two.pdf", "x/three.pdf", "notes.txt", "UPPER.PDF", "a.pdf.bak"] {
            touch(&dir.path().join(name));
        }
        let pdfs = collect_pdfs(dir.path());
        assert_eq!(pdfs.len(), 3, "got {pdfs:?}");
    }

    #[test]
    fn suffix_is_case_sensitive() {
        assert!(has_pdf_suffix(Path::new("/x/doc.pdf")));
        assert!(!has_pdf_suffix(Path::new("/x/doc.PDF")));
        assert!(!has_pdf_suffix(Path::new("/x/doc.pdf.txt")));
        assert!(!has_pdf_suffix(Path::new("/x.pdf/doc")));
    }

    #[test]
    fn missing_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(collect_files(&dir.path().join("missing")).is_empty());
    }
}
