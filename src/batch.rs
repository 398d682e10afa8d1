//! Batch orchestration: classify the input, discover PDFs, convert each.
//!
//! ```text
//! Classifying ─▶ file ───────────────┐
//!             ├▶ directory ─▶ walk ──┼─▶ Converting(i) ─▶ … ─▶ Done
//!             └▶ not-exist / invalid ┴─▶ Done (nothing attempted)
//!                           Converting(i) ─ cancel ─▶ Done (partial)
//! ```
//!
//! One file's failure never stops the batch; only cancellation does.

use crate::convert::Converter;
use crate::error::{Cancelled, ConvertError};
use crate::output::{BatchReport, ConversionOutcome, FileStatus};
use crate::pipeline::classify::{classify_path, invalid_reason, PathClassification};
use crate::pipeline::walk::collect_pdfs;
use crate::progress::{BatchProgressCallback, NoopProgress, ProgressCallback};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Run the whole batch for `input` (a file or directory path).
///
/// Blocking: engines do synchronous file and CPU work. From async code use
/// [`run_batch_async`].
pub fn run_batch(
    input: &str,
    converter: &Converter,
    progress: Option<&dyn BatchProgressCallback>,
) -> BatchReport {
    let noop = NoopProgress;
    let progress = progress.unwrap_or(&noop);

    let classification = classify_path(input);
    let mut report = BatchReport::new(input, classification);
    info!("Input '{}' classified as {}", input, classification);

    let files: Vec<PathBuf> = match classification {
        PathClassification::File => vec![PathBuf::from(input)],
        PathClassification::Directory => {
            let pdfs = collect_pdfs(Path::new(input));
            info!("Found {} PDF file(s) under '{}'", pdfs.len(), input);
            report.pdfs_found = Some(pdfs.len());
            pdfs
        }
        PathClassification::NotExist => {
            let err = ConvertError::FileNotFound {
                path: PathBuf::from(input),
            };
            warn!("Path does not exist: {err}");
            report.input_error = Some(format!("[{}] {}", err.category(), err));
            Vec::new()
        }
        PathClassification::Invalid => {
            let err = ConvertError::InvalidPath {
                input: input.to_string(),
                reason: invalid_reason(input).to_string(),
            };
            warn!("Not a usable file or directory path: {err}");
            report.input_error = Some(format!("[{}] {}", err.category(), err));
            Vec::new()
        }
    };

    let total = files.len();
    progress.on_batch_start(total);

    for (i, pdf) in files.into_iter().enumerate() {
        let index = i + 1;
        progress.on_file_start(index, total, &pdf);

        match convert_guarded(converter, &pdf) {
            Ok(ConversionOutcome::Converted(summary)) => {
                progress.on_file_complete(index, total, &summary.message());
                report.record_converted(summary);
            }
            Ok(ConversionOutcome::Failed(err)) => {
                let detail = format!("[{}] {}", err.category(), err);
                progress.on_file_error(index, total, &detail);
                report.record(pdf, FileStatus::Failed, detail);
            }
            Err(Cancelled) => {
                warn!(
                    "Batch cancelled at file {}/{}; {} file(s) not attempted",
                    index,
                    total,
                    total - index
                );
                let detail = format!("[{}] {}", ConvertError::Cancelled.category(), Cancelled);
                progress.on_file_error(index, total, &detail);
                report.record(pdf, FileStatus::Cancelled, detail);
                report.cancelled = true;
                break;
            }
        }
    }

    info!(
        "Batch finished: {} attempted, {} converted, {} failed{}",
        report.attempted,
        report.success_count,
        report.error_count,
        if report.cancelled { " (cancelled)" } else { "" }
    );
    progress.on_batch_complete(report.success_count, report.error_count, report.cancelled);
    report
}

/// [`run_batch`] on tokio's blocking pool.
pub async fn run_batch_async(
    input: String,
    converter: Arc<Converter>,
    progress: Option<ProgressCallback>,
) -> Result<BatchReport, ConvertError> {
    tokio::task::spawn_blocking(move || run_batch(&input, &converter, progress.as_deref()))
        .await
        .map_err(|e| ConvertError::Internal(format!("Batch task panicked: {e}")))
}

/// A panicking engine fails its file instead of the whole batch.
fn convert_guarded(converter: &Converter, pdf: &Path) -> Result<ConversionOutcome, Cancelled> {
    catch_unwind(AssertUnwindSafe(|| converter.pdf_to_markdown(pdf))).unwrap_or_else(|panic| {
        let msg = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        warn!("Engine panicked on '{}': {}", pdf.display(), msg);
        Ok(ConversionOutcome::Failed(ConvertError::Internal(format!(
            "engine panicked: {msg}"
        ))))
    })
}
