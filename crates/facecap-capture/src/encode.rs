use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbImage};
use std::fmt;

pub const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("empty image payload")]
    Empty,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid image data: {0}")]
    Image(#[from] image::ImageError),
}

/// A JPEG frame as a `data:` URI, ready to drop into a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage(String);

impl EncodedImage {
    /// `quality` is on the encoder's 1..=100 scale (70 == 0.7).
    pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Self, image::ImageError> {
        let mut jpeg = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100));
        encoder.encode(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)?;
        Ok(Self(format!("{JPEG_DATA_URL_PREFIX}{}", BASE64.encode(&jpeg))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn jpeg_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        payload_bytes(&self.0)
    }

    /// Decode a stored field value back to pixels. Accepts a full
    /// `data:<mime>;base64,<payload>` URI or a bare base64 payload.
    pub fn decode(value: &str) -> Result<RgbImage, DecodeError> {
        let bytes = payload_bytes(value)?;
        Ok(image::load_from_memory(&bytes)?.to_rgb8())
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn payload_bytes(value: &str) -> Result<Vec<u8>, DecodeError> {
    // header is everything up to the first comma, if there is one
    let b64 = value.split_once(',').map_or(value, |(_, payload)| payload).trim();
    if b64.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(BASE64.decode(b64)?)
}
