//! Grayscale image import and export for [`HeightGrid`].

use std::path::Path;

use image::{GrayImage, ImageBuffer, Luma};

use crate::error::HeightFieldError;
use crate::field::HeightGrid;

impl HeightGrid {
    /// Load a height map from an image file.
    ///
    /// The image is converted to 16-bit luminance and each pixel mapped to
    /// `[0, 1]`. Image row 0 becomes grid row 0.
    pub fn from_image(path: &Path) -> Result<Self, HeightFieldError> {
        let img = image::open(path)?.into_luma16();
        let grid = Self::from_luma16(&img)?;
        tracing::info!(
            path = %path.display(),
            width = grid.width(),
            length = grid.length(),
            "loaded height map"
        );
        Ok(grid)
    }

    /// Convert an in-memory 16-bit grayscale image.
    pub fn from_luma16(img: &ImageBuffer<Luma<u16>, Vec<u16>>) -> Result<Self, HeightFieldError> {
        let samples = img
            .pixels()
            .map(|p| p.0[0] as f32 / u16::MAX as f32)
            .collect();
        Self::from_samples(img.width(), img.height(), samples)
    }

    /// Render the field as an 8-bit grayscale preview, stretching the
    /// field's own min..max range over 0..255.
    pub fn to_gray_image(&self) -> GrayImage {
        let (lo, hi) = self.min_max();
        let range = if hi > lo { hi - lo } else { 1.0 };
        GrayImage::from_fn(self.width(), self.length(), |x, y| {
            let h = self.get(x, y).unwrap_or(lo);
            Luma([(((h - lo) / range) * 255.0).round() as u8])
        })
    }

    /// Save the grayscale preview to `path`; the format follows the extension.
    pub fn save_image(&self, path: &Path) -> Result<(), HeightFieldError> {
        self.to_gray_image().save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_luma16_normalizes() {
        let img = ImageBuffer::from_fn(2, 1, |x, _| Luma([if x == 0 { 0u16 } else { u16::MAX }]));
        let grid = HeightGrid::from_luma16(&img).unwrap();
        assert_eq!(grid.samples(), &[0.0, 1.0]);
    }

    #[test]
    fn test_gray_preview_stretches_range() {
        let grid = HeightGrid::from_samples(3, 1, vec![2.0, 3.0, 4.0]).unwrap();
        let img = grid.to_gray_image();
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
        assert_eq!(img.get_pixel(1, 0).0[0], 128);
        assert_eq!(img.get_pixel(2, 0).0[0], 255);
    }

    #[test]
    fn test_save_then_load_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("height.png");
        let grid = HeightGrid::from_fn(4, 3, |x, y| (x + y * 4) as f32).unwrap();
        grid.save_image(&path).unwrap();

        let loaded = HeightGrid::from_image(&path).unwrap();
        assert_eq!(loaded.width(), 4);
        assert_eq!(loaded.length(), 3);
        assert_eq!(loaded.get(0, 0), Some(0.0));
        assert_eq!(loaded.get(3, 2), Some(1.0));
    }

    #[test]
    fn test_missing_file_is_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = HeightGrid::from_image(&dir.path().join("missing.png"));
        assert!(matches!(result, Err(HeightFieldError::Image(_))));
    }
}
