//! Capture invocation: validate, run the renderer, check and post-process
//! the output.

use crate::imaging::{CropRegion, ImageCrop, ImageProcessor};
use crate::renderer::{PhantomJs, Renderer};
use crate::{check_url, script, Browsershot, Error, Result};
use log::{debug, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output file type, from the target extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Pdf,
}

impl OutputFormat {
    /// Case-insensitive match on `png`, `jpg`, `jpeg` and `pdf`
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "pdf" => Some(OutputFormat::Pdf),
            _ => None,
        }
    }

    pub fn mode(self) -> CaptureMode {
        match self {
            OutputFormat::Pdf => CaptureMode::Pdf,
            OutputFormat::Png | OutputFormat::Jpeg => CaptureMode::Raster,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Pdf => "pdf",
        }
    }
}

/// How the page is laid out for capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Viewport-sized screenshot, optionally cropped afterwards
    Raster,
    /// Paginated document using the configured paper size
    Pdf,
}

/// What a successful capture left on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub path: PathBuf,
    pub format: OutputFormat,
    /// File size after post-processing
    pub bytes: u64,
    /// Whether the post-render crop ran
    pub cropped: bool,
}

/// A rendered file ready to hand to an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Browsershot {
    /// Render the configured URL to `target` with PhantomJS and crop raster
    /// output with the `image` crate.
    pub fn save(&self, target: impl AsRef<Path>) -> Result<RenderOutput> {
        self.save_with(target, &PhantomJs, &ImageCrop)
    }

    /// Render the configured URL to `target` using the given collaborators.
    ///
    /// Each call is independent: nothing is retried, and a missing or
    /// undersized output file fails the call even if the renderer exited 0.
    pub fn save_with(
        &self,
        target: impl AsRef<Path>,
        renderer: &dyn Renderer,
        processor: &dyn ImageProcessor,
    ) -> Result<RenderOutput> {
        let target = target.as_ref();
        let config = self.config();

        if target.as_os_str().is_empty() {
            return Err(Error::invalid("target file not set"));
        }
        let format = OutputFormat::from_path(target).ok_or_else(|| {
            Error::invalid(format!(
                "target file extension not valid: `{}` (expected jpeg, jpg, png or pdf)",
                target.display()
            ))
        })?;

        let url = config.url.as_deref().ok_or_else(|| Error::invalid("url not set"))?;
        check_url(url)?;

        if !config.bin_path.exists() {
            return Err(Error::BinaryNotFound(config.bin_path.clone()));
        }

        let mode = format.mode();
        let source = script::control_script(config, url, target, mode)?;

        // Removed when dropped, including when the renderer fails to start
        let mut script_file = tempfile::Builder::new()
            .prefix("browsershot-")
            .suffix(".js")
            .tempfile()?;
        script_file.write_all(source.as_bytes())?;
        script_file.flush()?;
        debug!("wrote control script to {}", script_file.path().display());

        // Only a file written by this run may pass the output check
        match std::fs::remove_file(target) {
            Ok(()) => debug!("removed previous output at {}", target.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let run = renderer.render(&config.bin_path, &config.renderer_options, script_file.path())?;
        drop(script_file);

        if run.status != Some(0) {
            warn!("renderer exited with status {:?}: {}", run.status, run.stderr.trim());
        }

        let size = match std::fs::metadata(target) {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => 0,
        };
        if size < config.min_output_bytes {
            return Err(Error::RenderFailed {
                path: target.to_path_buf(),
                stderr: run.stderr,
            });
        }

        let cropped = mode == CaptureMode::Raster && config.height > 0;
        let bytes = if cropped {
            processor.crop(target, CropRegion::from_origin(config.width, config.height), config.quality)?;
            std::fs::metadata(target)?.len()
        } else {
            size
        };

        info!("captured {} to {} ({} bytes)", url, target.display(), bytes);

        Ok(RenderOutput {
            path: target.to_path_buf(),
            format,
            bytes,
            cropped,
        })
    }

    /// Render to `tmp_path`, read the result back and remove the file.
    ///
    /// `name` becomes the download file name; without one, the name is
    /// derived from the URL host.
    pub fn download(&self, tmp_path: impl AsRef<Path>, name: Option<&str>) -> Result<Download> {
        self.download_with(tmp_path, name, &PhantomJs, &ImageCrop)
    }

    pub fn download_with(
        &self,
        tmp_path: impl AsRef<Path>,
        name: Option<&str>,
        renderer: &dyn Renderer,
        processor: &dyn ImageProcessor,
    ) -> Result<Download> {
        let tmp_path = tmp_path.as_ref();
        let output = self.save_with(tmp_path, renderer, processor)?;
        let body = std::fs::read(&output.path)?;
        if let Err(e) = std::fs::remove_file(&output.path) {
            warn!("could not remove {}: {}", output.path.display(), e);
        }

        let file_name = match name {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => derived_file_name(self.config().url.as_deref(), output.format),
        };

        Ok(Download {
            file_name,
            content_type: output.format.content_type(),
            body,
        })
    }
}

fn derived_file_name(url: Option<&str>, format: OutputFormat) -> String {
    let host = url
        .and_then(|u| url::Url::parse(u).ok())
        .and_then(|u| u.host_str().map(str::to_string))
        .filter(|h| !h.is_empty());
    format!("{}.{}", host.as_deref().unwrap_or("browsershot"), format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.png")), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_path(Path::new("a.JPG")), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_path(Path::new("dir/a.jpeg")), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_path(Path::new("a.Pdf")), Some(OutputFormat::Pdf));
        assert_eq!(OutputFormat::from_path(Path::new("a.gif")), None);
        assert_eq!(OutputFormat::from_path(Path::new("png")), None);
    }

    #[test]
    fn only_pdf_is_pdf_mode() {
        assert_eq!(OutputFormat::Pdf.mode(), CaptureMode::Pdf);
        assert_eq!(OutputFormat::Png.mode(), CaptureMode::Raster);
        assert_eq!(OutputFormat::Jpeg.mode(), CaptureMode::Raster);
    }

    #[test]
    fn file_name_from_host() {
        assert_eq!(derived_file_name(Some("https://spatie.be/en"), OutputFormat::Png), "spatie.be.png");
        assert_eq!(derived_file_name(Some("file:///tmp/x.html"), OutputFormat::Pdf), "browsershot.pdf");
        assert_eq!(derived_file_name(None, OutputFormat::Jpeg), "browsershot.jpg");
    }
}
