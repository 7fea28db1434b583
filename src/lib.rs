//! Browsershot
//!
//! Render a web page to a PNG, JPEG or PDF file by driving an external
//! headless renderer (PhantomJS or a compatible binary) with a small control
//! script, then optionally crop the captured image to the requested viewport.
//!
//! # Example
//!
//! ```no_run
//! use browsershot::Browsershot;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let output = Browsershot::with_bin_path("/usr/local/bin/phantomjs")
//!     .set_url("https://example.com")?
//!     .set_width(1024)?
//!     .set_height(768)
//!     .set_quality(80)?
//!     .save("example.png")?;
//! println!("wrote {} bytes", output.bytes);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod capture;
pub mod error;
pub mod imaging;
pub mod renderer;
pub mod script;

pub use capture::{CaptureMode, Download, OutputFormat, RenderOutput};
pub use error::{Error, Result};
pub use imaging::{CropRegion, ImageCrop, ImageProcessor};
pub use renderer::{PhantomJs, Renderer, RendererRun};

/// Environment variable consulted for the default renderer location
pub const BIN_PATH_ENV: &str = "BROWSERSHOT_PHANTOMJS";

/// Renderer location used when nothing else names one
pub const DEFAULT_BIN_PATH: &str = "bin/phantomjs";

/// Smallest output file accepted as a successful render.
///
/// Renderers that fail on a page often still exit cleanly and leave an empty
/// or truncated file behind, so anything below this size is treated as a
/// failed capture. Override per capture with [`Browsershot::set_min_output_bytes`].
pub const DEFAULT_MIN_OUTPUT_BYTES: u64 = 1024;

/// Flags handed to the renderer unless replaced
pub const DEFAULT_RENDERER_OPTIONS: [&str; 2] = ["--ssl-protocol=any", "--ignore-ssl-errors=true"];

/// Page margins used in PDF mode, as CSS length strings (`"1cm"`, `"0.5in"`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Margin {
    pub left: String,
    pub right: String,
    pub top: String,
    pub bottom: String,
}

impl Margin {
    /// The same margin on every side
    pub fn uniform(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            left: value.clone(),
            right: value.clone(),
            top: value.clone(),
            bottom: value,
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform("1cm")
    }
}

/// Paper settings applied when the target is a PDF
///
/// Serialized verbatim into the control script, so `format` and
/// `orientation` take whatever the renderer understands (`"A4"`,
/// `"Letter"`, `"portrait"`, `"landscape"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaperSize {
    pub format: String,
    pub orientation: String,
    pub margin: Margin,
}

impl Default for PaperSize {
    fn default() -> Self {
        Self {
            format: "A4".to_string(),
            orientation: "portrait".to_string(),
            margin: Margin::default(),
        }
    }
}

/// Rendering parameters
///
/// Every field has a default, so a JSON configuration file only needs to
/// name what it changes.
///
/// # Examples
///
/// ```
/// let cfg = browsershot::RenderConfig::default();
/// assert_eq!((cfg.width, cfg.height), (640, 480));
/// assert_eq!(cfg.quality, 60);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Page to capture
    pub url: Option<String>,
    /// Viewport width in pixels, always > 0
    pub width: u32,
    /// Viewport height in pixels; 0 captures the full page
    pub height: u32,
    /// Re-encode quality, 1..=100
    pub quality: u8,
    /// Delay between page open and capture, in milliseconds
    pub timeout_ms: u64,
    /// Renderer executable
    pub bin_path: PathBuf,
    /// Flags passed to the renderer ahead of the script path
    pub renderer_options: Vec<String>,
    /// Paper settings for PDF output
    pub paper_size: PaperSize,
    /// Minimum size of a valid output file
    pub min_output_bytes: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            url: None,
            width: 640,
            height: 480,
            quality: 60,
            timeout_ms: 5000,
            bin_path: PathBuf::from(DEFAULT_BIN_PATH),
            renderer_options: DEFAULT_RENDERER_OPTIONS.iter().map(|s| s.to_string()).collect(),
            paper_size: PaperSize::default(),
            min_output_bytes: DEFAULT_MIN_OUTPUT_BYTES,
        }
    }
}

impl RenderConfig {
    /// Load a configuration from a JSON file, then validate it
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let cfg: RenderConfig = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the invariants the setters enforce. The URL is only checked
    /// when present; `save` rejects a missing one.
    pub fn validate(&self) -> Result<()> {
        check_width(self.width)?;
        check_quality(self.quality)?;
        if let Some(url) = &self.url {
            check_url(url)?;
        }
        Ok(())
    }
}

/// `$BROWSERSHOT_PHANTOMJS` when set and non-empty, else [`DEFAULT_BIN_PATH`]
pub fn default_bin_path() -> PathBuf {
    std::env::var_os(BIN_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BIN_PATH))
}

/// Parse a numeric setting that arrived as text (CLI flags, environment).
///
/// Anything that is not a non-negative integer is rejected with
/// [`Error::InvalidInput`] naming the field.
///
/// ```
/// assert_eq!(browsershot::parse_numeric("width", "1024").unwrap(), 1024);
/// assert!(browsershot::parse_numeric("width", "wide").is_err());
/// ```
pub fn parse_numeric(field: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| Error::invalid(format!("{} must be numeric, got `{}`", field, raw)))
}

pub(crate) fn check_width(width: u32) -> Result<()> {
    if width == 0 {
        return Err(Error::invalid("width must be greater than 0"));
    }
    Ok(())
}

pub(crate) fn check_quality(quality: u8) -> Result<()> {
    if !(1..=100).contains(&quality) {
        return Err(Error::invalid(format!(
            "quality must be a numeric value between 1 - 100, got {}",
            quality
        )));
    }
    Ok(())
}

pub(crate) fn check_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(Error::invalid("no url specified"));
    }
    match url::Url::parse(url) {
        Ok(parsed) if !parsed.cannot_be_a_base() => Ok(()),
        Ok(_) => Err(Error::invalid(format!("url is invalid: `{}`", url))),
        Err(e) => Err(Error::invalid(format!("url is invalid: `{}` ({})", url, e))),
    }
}

/// Capture configurator
///
/// Setters consume and return the configurator so calls chain; the ones that
/// validate return `Result<Self>` and chain with `?`. The terminal operations
/// (`save`, `save_with`, `download`) live in [`capture`].
#[derive(Debug, Clone)]
pub struct Browsershot {
    config: RenderConfig,
}

impl Default for Browsershot {
    fn default() -> Self {
        Self::new()
    }
}

impl Browsershot {
    /// Configurator with default settings; the renderer location comes from
    /// [`default_bin_path`]
    pub fn new() -> Self {
        Self {
            config: RenderConfig {
                bin_path: default_bin_path(),
                ..RenderConfig::default()
            },
        }
    }

    /// Configurator with default settings and the given renderer binary
    pub fn with_bin_path(bin_path: impl Into<PathBuf>) -> Self {
        Self::new().set_bin_path(bin_path)
    }

    /// Configurator over an existing configuration, validated first
    pub fn from_config(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Existence is checked when capturing, not here
    pub fn set_bin_path(mut self, bin_path: impl Into<PathBuf>) -> Self {
        self.config.bin_path = bin_path.into();
        self
    }

    pub fn set_width(mut self, width: u32) -> Result<Self> {
        check_width(width)?;
        self.config.width = width;
        Ok(self)
    }

    /// A height of 0 captures the whole page and skips the post-render crop
    pub fn set_height(mut self, height: u32) -> Self {
        self.config.height = height;
        self
    }

    pub fn set_height_to_render_whole_page(self) -> Self {
        self.set_height(0)
    }

    pub fn set_quality(mut self, quality: u8) -> Result<Self> {
        check_quality(quality)?;
        self.config.quality = quality;
        Ok(self)
    }

    pub fn set_url(mut self, url: &str) -> Result<Self> {
        check_url(url)?;
        self.config.url = Some(url.to_string());
        Ok(self)
    }

    /// Delay in milliseconds between the page opening and the capture. This
    /// gives dynamic content time to settle; it does not bound the renderer.
    pub fn set_timeout(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    pub fn set_paper_size(mut self, paper_size: PaperSize) -> Self {
        self.config.paper_size = paper_size;
        self
    }

    /// Replace the default renderer flags
    pub fn set_renderer_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.renderer_options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_min_output_bytes(mut self, bytes: u64) -> Self {
        self.config.min_output_bytes = bytes;
        self
    }
}
