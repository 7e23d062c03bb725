//! Camera capture widget: binds a video surface, a drawing surface and a
//! hidden form input, and fills the input with a JPEG data URI of the
//! current frame when the page asks for one.

mod controller;
mod elements;

pub use controller::{
    CaptureController, Listeners, Startup, WidgetEvent, AUTO_CAPTURE_DELAY, CAMERA_UNAVAILABLE,
};
pub use elements::{CaptureButton, CaptureElements, Canvas, VideoElement};

/// Blocking, user-facing notification.
pub trait Alert: Send + Sync {
    fn alert(&self, message: &str);
}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("no drawing surface to capture into")]
    NoDrawingSurface,
    #[error("no hidden input to store the capture in")]
    NoHiddenField,
    #[error("video surface has no stream")]
    NoStream,
    #[error("no form to submit")]
    NoForm,
    #[error(transparent)]
    Capture(#[from] facecap_capture::CaptureError),
    #[error(transparent)]
    Form(#[from] facecap_form::FormError),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
