//! Progress-callback trait for per-file batch events.
//!
//! Pass an implementation to [`crate::run_batch`] to receive events as each
//! PDF is processed. The library never prints; the CLI renders these events
//! as a progress bar plus one ✓/✗ line per file.
//!
//! # Example
//!
//! ```rust
//! use pdfmd_batch::BatchProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct Counter(AtomicUsize);
//!
//! impl BatchProgressCallback for Counter {
//!     fn on_file_complete(&self, index: usize, total: usize, message: &str) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("[{index}/{total}] {message}");
//!     }
//! }
//! ```

/// Called by the batch orchestrator as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is 1-based.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after discovery, before the first file.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    fn on_file_start(&self, index: usize, total: usize, pdf: &std::path::Path) {
        let _ = (index, total, pdf);
    }

    /// Called when a file converted successfully.
    fn on_file_complete(&self, index: usize, total: usize, message: &str) {
        let _ = (index, total, message);
    }

    /// Called when a file failed; the batch continues.
    fn on_file_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once at the end, including after a cancellation.
    fn on_batch_complete(&self, success: usize, errors: usize, cancelled: bool) {
        let _ = (success, errors, cancelled);
    }
}

/// Shared-ownership form, convenient for the CLI.
pub type ProgressCallback = std::sync::Arc<dyn BatchProgressCallback>;

/// A no-op implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl BatchProgressCallback for NoopProgress {}
