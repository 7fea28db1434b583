//! `ImageProcessor` backed by the `image` crate

use crate::imaging::{CropRegion, ImageProcessor};
use crate::Result;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};
use log::{debug, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Crops with `image::DynamicImage::crop_imm` and writes the result back in
/// the format implied by the file extension.
///
/// JPEG output uses `quality` directly. PNG is lossless, so `quality` picks
/// the compression effort instead: lower quality trades CPU for a smaller
/// file.
///
/// A region reaching past the captured image is clamped to the image bounds,
/// so the written file can be smaller than `width x height`. This happens
/// when the page laid out narrower or shorter than the viewport; it is
/// logged at `warn` and is not an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrop;

impl ImageProcessor for ImageCrop {
    fn crop(&self, path: &Path, region: CropRegion, quality: u8) -> Result<()> {
        let format = ImageFormat::from_path(path)?;
        let img = image::open(path)?;
        debug!(
            "cropping {} from {}x{} to {}x{} at ({}, {})",
            path.display(),
            img.width(),
            img.height(),
            region.width,
            region.height,
            region.x,
            region.y
        );

        if !region_fits(region, img.width(), img.height()) {
            warn!(
                "crop region {}x{} at ({}, {}) exceeds {}x{} capture of {}; output will be clamped",
                region.width,
                region.height,
                region.x,
                region.y,
                img.width(),
                img.height(),
                path.display()
            );
        }

        let cropped = img.crop_imm(region.x, region.y, region.width, region.height);
        write_image(&cropped, path, format, quality)
    }
}

fn region_fits(region: CropRegion, width: u32, height: u32) -> bool {
    let right = u64::from(region.x) + u64::from(region.width);
    let bottom = u64::from(region.y) + u64::from(region.height);
    right <= u64::from(width) && bottom <= u64::from(height)
}

fn write_image(img: &DynamicImage, path: &Path, format: ImageFormat, quality: u8) -> Result<()> {
    match format {
        ImageFormat::Jpeg => {
            let mut out = BufWriter::new(File::create(path)?);
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))?;
        }
        ImageFormat::Png => {
            let out = BufWriter::new(File::create(path)?);
            let encoder = PngEncoder::new_with_quality(out, png_compression(quality), FilterType::Adaptive);
            img.write_with_encoder(encoder)?;
        }
        other => img.save_with_format(path, other)?,
    }
    Ok(())
}

fn png_compression(quality: u8) -> CompressionType {
    match quality {
        0..=39 => CompressionType::Best,
        40..=69 => CompressionType::Default,
        _ => CompressionType::Fast,
    }
}
