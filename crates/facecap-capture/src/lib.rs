pub mod camera;
pub mod doctor;
pub mod encode;
pub mod frame;

pub use camera::{
    CameraConfig, CameraError, CommandCamera, FrameSource, MediaConstraints, MediaDevices, MediaStream,
    StillFrame,
};
pub use encode::{DecodeError, EncodedImage};
pub use frame::FrameBuffer;

/// Capture surface size. Kept small so the form payload stays well under
/// typical request body limits.
pub const TARGET_WIDTH: u32 = 320;
pub const TARGET_HEIGHT: u32 = 240;

/// JPEG quality 0.7 on the encoder's 1..=100 scale.
pub const JPEG_QUALITY: u8 = 70;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error("camera produced an empty frame")]
    EmptyFrame,
    #[error("encode frame: {0}")]
    Encode(#[from] image::ImageError),
}
