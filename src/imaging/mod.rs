//! Post-render image processing
//!
//! The renderer captures the whole canvas it laid out, which can be taller
//! than the requested viewport. Raster captures with a fixed height are
//! trimmed back to the viewport and re-encoded at the configured quality.

pub mod crop;

pub use crop::ImageCrop;

use crate::Result;
use std::path::Path;

/// Rectangle to keep, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl CropRegion {
    /// Region of the given size anchored at the top-left corner
    pub fn from_origin(width: u32, height: u32) -> Self {
        Self { width, height, x: 0, y: 0 }
    }
}

/// Crops an image file in place and re-encodes it
pub trait ImageProcessor {
    fn crop(&self, path: &Path, region: CropRegion, quality: u8) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_region() {
        let r = CropRegion::from_origin(100, 200);
        assert_eq!(r, CropRegion { width: 100, height: 200, x: 0, y: 0 });
    }
}
