use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

use crate::encode::EncodedImage;
use crate::{CaptureError, JPEG_QUALITY, TARGET_HEIGHT, TARGET_WIDTH};

/// Offscreen drawing surface. Holds only the most recently drawn frame.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pixels: RgbImage,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::with_size(TARGET_WIDTH, TARGET_HEIGHT)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self { pixels: RgbImage::from_pixel(width, height, Rgb([0, 0, 0])) }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Draw `src` over the whole surface. The source is scaled to fill, so a
    /// source with a different aspect ratio comes out stretched.
    pub fn draw_image(&mut self, src: &DynamicImage) -> Result<(), CaptureError> {
        if src.width() == 0 || src.height() == 0 {
            return Err(CaptureError::EmptyFrame);
        }
        let rgb = src.to_rgb8();
        if rgb.dimensions() == self.pixels.dimensions() {
            self.pixels.copy_from_slice(rgb.as_raw());
        } else {
            let scaled = imageops::resize(&rgb, self.width(), self.height(), FilterType::Triangle);
            self.pixels.copy_from_slice(scaled.as_raw());
        }
        Ok(())
    }

    /// JPEG data-URI of the current contents at the default capture quality.
    pub fn to_data_url(&self) -> Result<EncodedImage, CaptureError> {
        self.to_data_url_with_quality(JPEG_QUALITY)
    }

    pub fn to_data_url_with_quality(&self, quality: u8) -> Result<EncodedImage, CaptureError> {
        Ok(EncodedImage::encode_jpeg(&self.pixels, quality)?)
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
