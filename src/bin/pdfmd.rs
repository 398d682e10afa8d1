//! CLI binary for pdfmd-batch.
//!
//! A thin shim over the library crate: maps CLI flags to
//! `ConversionConfig`, runs the batch and prints the report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfmd_batch::{
    run_batch_async, BatchProgressCallback, BatchReport, CancelFlag, ConversionConfig, Converter,
    DocxHtmlExtractor, FileStatus, Html2MdTransformer, PathClassification, PdfiumDocxEngine,
    ProgressCallback,
};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Live progress bar plus one ✓/✗ line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start time of the file currently being converted.
    started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Looking for PDF files…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_files as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    fn on_file_start(&self, _index: usize, _total: usize, pdf: &Path) {
        if let Ok(mut s) = self.started.lock() {
            *s = Some(Instant::now());
        }
        let name = pdf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(name);
    }

    fn on_file_complete(&self, index: usize, total: usize, message: &str) {
        let secs = self.elapsed_secs();
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index,
            total,
            message,
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs();

        // Keep the log to one line per file.
        let first_line = error.lines().next().unwrap_or_default();
        let msg = match first_line.char_indices().nth(100) {
            Some((cut, _)) => format!("{}\u{2026}", &first_line[..cut]),
            None => first_line.to_string(),
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _success: usize, _errors: usize, _cancelled: bool) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Prompt for a path interactively
  pdfmd

  # Convert one file (writes report.docx and report.md next to it)
  pdfmd report.pdf

  # Convert every PDF under a folder, without keeping the DOCX files
  pdfmd --discard-docx ./policies

  # Machine-readable report
  pdfmd --json ./policies > report.json

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium — skips auto-download
  PDFIUM_AUTO_CACHE_DIR   Override the default pdfium cache directory
  RUST_LOG                Override the log filter (e.g. pdfmd_batch=debug)

  PDFium (~30 MB) is downloaded automatically on first run and cached.
  Press Ctrl-C to stop after the current conversion step; files already
  written are kept.
"#;

/// Batch-convert PDF files to Markdown (via DOCX).
#[derive(Parser, Debug)]
#[command(
    name = "pdfmd",
    version,
    about = "Batch-convert PDF files to Markdown by way of DOCX",
    long_about = "Convert a PDF file, or every PDF under a directory tree, to Markdown. \
Each name.pdf gains a sibling name.docx (unless --discard-docx) and name.md. \
Files that fail are reported and skipped; the rest of the batch continues.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// File or directory to convert. Prompted for when omitted.
    input: Option<String>,

    /// Delete each intermediate .docx after its Markdown is written.
    #[arg(long, env = "PDFMD_DISCARD_DOCX")]
    discard_docx: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFMD_PASSWORD")]
    password: Option<String>,

    /// Font-size ratio over body text at which a line becomes a heading.
    #[arg(long, env = "PDFMD_HEADING_RATIO", default_value_t = 1.15)]
    heading_ratio: f32,

    /// Print each produced Markdown document to stdout.
    #[arg(long, env = "PDFMD_PRINT")]
    print: bool,

    /// Output the batch report as JSON instead of text.
    #[arg(long, env = "PDFMD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFMD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFMD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFMD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar carries per-file feedback; keep library logs to
    // warnings while it is visible.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Input path ───────────────────────────────────────────────────────
    let input = match cli.input.clone() {
        Some(path) => path,
        None => prompt_for_path().context("Failed to read path from stdin")?,
    };

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ConversionConfig::builder()
        .keep_intermediate(!cli.discard_docx)
        .heading_ratio(cli.heading_ratio)
        .echo_markdown(cli.print);
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Ensure PDFium engine is available ────────────────────────────────
    // First run downloads the library (~30 MB); later runs are a path check.
    let library = if cli.quiet {
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
            .context("Failed to download PDFium engine")?
    } else {
        let dl_bar = ProgressBar::new(0);
        dl_bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {bytes}/{total_bytes}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        dl_bar.set_prefix("PDF engine");
        dl_bar.enable_steady_tick(Duration::from_millis(80));

        let bar = dl_bar.clone();
        let library = tokio::task::block_in_place(|| {
            pdfium_auto::ensure_pdfium_library(Some(&|downloaded, total| {
                if let Some(t) = total {
                    if bar.length().unwrap_or(0) != t {
                        bar.set_length(t);
                    }
                }
                bar.set_position(downloaded);
            }))
        })
        .context("Failed to download PDFium engine")?;
        dl_bar.finish_and_clear();
        library
    };

    let cancel = CancelFlag::new();
    let engine = PdfiumDocxEngine::with_library(library, &config);
    let converter = Converter::with_engines(config, engine, DocxHtmlExtractor, Html2MdTransformer)
        .with_cancel_flag(cancel.clone());
    let converter = Arc::new(converter);

    // ── Ctrl-C → cooperative cancellation ────────────────────────────────
    {
        let cancel = cancel.clone();
        let quiet = cli.quiet;
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if on_interrupt(&cancel) {
                    eprintln!("{} {}", red("✘"), bold("Second interrupt; exiting now"));
                    std::process::exit(130);
                }
                if !quiet {
                    eprintln!(
                        "{} {}",
                        cyan("⚠"),
                        bold("Interrupt received; stopping after the current step… (Ctrl-C again to exit)")
                    );
                }
            }
        });
    }

    // ── Run batch ────────────────────────────────────────────────────────
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let report = run_batch_async(input, converter.clone(), progress)
        .await
        .context("Batch failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        print_report(&report, converter.config().keep_intermediate);
    }

    if cli.print && !cli.json {
        echo_markdown(&report).context("Failed to write to stdout")?;
    }

    Ok(())
}

/// Ask for a path on stdin, stripping the newline and drag-and-drop quotes.
fn prompt_for_path() -> Result<String> {
    eprintln!("如有多个需要转为markdown格式的制度请放置于文件夹内，文件必须是pdf格式");
    eprintln!("请输入一个目录或者文件的路径:");
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(clean_prompt_input(&line))
}

fn clean_prompt_input(line: &str) -> String {
    let trimmed = line.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    trimmed.to_string()
}

/// Cancel on the first interrupt; `true` once a second one should exit.
fn on_interrupt(cancel: &CancelFlag) -> bool {
    if cancel.is_cancelled() {
        return true;
    }
    cancel.cancel();
    false
}

fn print_report(report: &BatchReport, kept_docx: bool) {
    match report.classification {
        PathClassification::NotExist | PathClassification::Invalid => {
            eprintln!("{} 输入有误，请重新输入", red("✘"));
            let why = report
                .input_error
                .clone()
                .unwrap_or_else(|| format!("'{}' is {}", report.input, report.classification));
            eprintln!("   {}", dim(&why));
            return;
        }
        PathClassification::Directory => {
            eprintln!(
                "{} Found {} PDF file(s) in {}",
                cyan("◆"),
                bold(&report.pdfs_found.unwrap_or(0).to_string()),
                report.input
            );
        }
        PathClassification::File => {}
    }

    if report.has_attempts() {
        let icon = if report.error_count == 0 {
            green("✔")
        } else if report.success_count == 0 {
            red("✘")
        } else {
            cyan("⚠")
        };
        eprintln!(
            "{}  {} converted  /  {} failed",
            icon,
            bold(&report.success_count.to_string()),
            if report.error_count == 0 {
                report.error_count.to_string()
            } else {
                red(&report.error_count.to_string())
            },
        );
        if !kept_docx {
            eprintln!("   {}", dim("intermediate .docx files removed"));
        }
    }

    if report.cancelled {
        let total = report.pdfs_found.unwrap_or(report.attempted);
        eprintln!(
            "{} Cancelled after {}/{} file(s); the rest were not attempted",
            cyan("⚠"),
            report.attempted,
            total
        );
    }
}

fn echo_markdown(report: &BatchReport) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for file in report
        .outcomes
        .iter()
        .filter(|f| f.status == FileStatus::Converted)
    {
        let Some(ref markdown) = file.markdown else {
            continue;
        };
        writeln!(handle, "{}", dim(&format!("── {} ──", file.pdf.display())))?;
        handle.write_all(markdown.as_bytes())?;
        if !markdown.ends_with('\n') {
            handle.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_interrupt_exits() {
        let cancel = CancelFlag::new();
        assert!(!on_interrupt(&cancel));
        assert!(cancel.is_cancelled());
        assert!(on_interrupt(&cancel));
    }

    #[test]
    fn prompt_input_loses_quotes() {
        assert_eq!(clean_prompt_input("  '/tmp/a b'\n"), "/tmp/a b");
        assert_eq!(clean_prompt_input("\"C:\\docs\""), "C:\\docs");
        assert_eq!(clean_prompt_input("plain"), "plain");
    }
}
