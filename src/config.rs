//! Configuration types for batch PDF → Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. There is no config file; the CLI maps
//! its flags onto the builder.

use crate::error::ConvertError;
use std::fmt;

/// Configuration for converting one file or a whole directory.
///
/// # Example
/// ```rust
/// use pdfmd_batch::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .keep_intermediate(false)
///     .heading_ratio(1.3)
///     .build()
///     .unwrap();
/// assert!(!config.keep_intermediate);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Keep `name.docx` next to `name.md` after conversion. Default: true.
    ///
    /// When false the DOCX is removed once stage two finishes with it,
    /// whatever the outcome. Removal is best-effort.
    pub keep_intermediate: bool,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Font-size ratio over body text at which a line becomes a heading. Default: 1.15.
    ///
    /// Used by the pdfium engine only. Lower values promote more lines
    /// (e.g. bold-but-barely-larger captions); raise it for documents whose
    /// body text mixes sizes.
    pub heading_ratio: f32,

    /// Hand each produced Markdown document back in the outcome so the
    /// caller can echo it. Default: false.
    pub echo_markdown: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            keep_intermediate: true,
            password: None,
            heading_ratio: 1.15,
            echo_markdown: false,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("keep_intermediate", &self.keep_intermediate)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("heading_ratio", &self.heading_ratio)
            .field("echo_markdown", &self.echo_markdown)
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn keep_intermediate(mut self, keep: bool) -> Self {
        self.config.keep_intermediate = keep;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn heading_ratio(mut self, ratio: f32) -> Self {
        self.config.heading_ratio = ratio;
        self
    }

    pub fn echo_markdown(mut self, v: bool) -> Self {
        self.config.echo_markdown = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let r = self.config.heading_ratio;
        if !r.is_finite() || !(1.0..=4.0).contains(&r) {
            return Err(ConvertError::InvalidConfig(format!(
                "heading ratio must be 1.0–4.0, got {r}"
            )));
        }
        Ok(self.config)
    }
}
