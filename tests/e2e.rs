//! End-to-end tests through the real pdfium engine.
//!
//! Fixtures are small text-only PDFs generated on the fly, so no files need
//! downloading. `Converter::new` locates (and on first use downloads) the
//! pdfium library, so these tests are gated behind `E2E_ENABLED`.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use pdfmd_batch::{run_batch, ConversionConfig, Converter, FileStatus};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set; otherwise build a converter.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        Converter::new(ConversionConfig::default()).expect("pdfium library available")
    }};
}

/// A one-page PDF: `title` in 24pt Helvetica above `body` lines in 11pt.
fn text_pdf(title: &str, body: &[&str]) -> Vec<u8> {
    let mut content = format!("BT /F1 24 Tf 72 700 Td ({title}) Tj ET\n");
    for (i, line) in body.iter().enumerate() {
        let y = 660 - 16 * i;
        content.push_str(&format!("BT /F1 11 Tf 72 {y} Td ({line}) Tj ET\n"));
    }

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref = pdf.len();
    let mut table = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for off in offsets {
        table.push_str(&format!("{off:010} 00000 n \n"));
    }
    table.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
        objects.len() + 1
    ));
    pdf.extend_from_slice(table.as_bytes());
    pdf
}

fn write_pdf(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let p = dir.join(name);
    if let Some(parent) = p.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&p, bytes).unwrap();
    p
}

const BODY: &[&str] = &[
    "The board met four times during the financial year under review.",
    "Revenue grew steadily across every region in which we operate.",
    "Staff numbers were stable and no new offices were opened.",
];

fn fixture_tree(dir: &Path) {
    write_pdf(dir, "annual.pdf", &text_pdf("Annual Report", BODY));
    write_pdf(dir, "sub/minutes.pdf", &text_pdf("Board Minutes", BODY));
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn test_convert_generated_tree() {
    let converter = e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    fixture_tree(dir.path());

    let report = run_batch(&dir.path().to_string_lossy(), &converter, None);

    assert_eq!(report.pdfs_found, Some(2));
    assert_eq!((report.success_count, report.error_count), (2, 0), "{report:#?}");
    for (pdf, title) in [("annual", "Annual Report"), ("sub/minutes", "Board Minutes")] {
        let md = std::fs::read_to_string(dir.path().join(format!("{pdf}.md"))).unwrap();
        println!("── {pdf}.md ──\n{md}");
        assert!(md.ends_with('\n'), "[{pdf}] missing final newline");
        assert!(
            md.lines().any(|l| l.starts_with("# ") && l.contains(title)),
            "[{pdf}] no level-1 heading for {title:?}"
        );
        assert!(md.contains("Revenue grew steadily"), "[{pdf}] body text lost");
        assert!(!dir.path().join(format!("{pdf}.docx")).exists());
    }
}

#[test]
fn test_corrupt_pdf_is_unreadable_source() {
    let converter = e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    let bad = write_pdf(dir.path(), "broken.pdf", b"%PDF-1.7\nthis is not a pdf body\n");

    let report = run_batch(&bad.to_string_lossy(), &converter, None);

    assert_eq!((report.success_count, report.error_count), (0, 1));
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, FileStatus::Failed);
    assert!(
        outcome.detail.contains("engine-unreadable-source"),
        "unexpected detail: {}",
        outcome.detail
    );
    assert!(!dir.path().join("broken.md").exists());
    assert!(!dir.path().join("broken.docx").exists());
}

#[test]
fn test_rerun_is_byte_identical() {
    let converter = e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    fixture_tree(dir.path());
    let input = dir.path().to_string_lossy().into_owned();

    let first = run_batch(&input, &converter, None);
    assert_eq!(first.success_count, 2);
    let before = std::fs::read(dir.path().join("annual.md")).unwrap();

    let second = run_batch(&input, &converter, None);
    assert_eq!(second.success_count, 2);
    let after = std::fs::read(dir.path().join("annual.md")).unwrap();

    assert_eq!(before, after);
}
