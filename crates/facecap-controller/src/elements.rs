use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use facecap_capture::{CaptureError, EncodedImage, FrameBuffer, MediaStream};
use facecap_form::{Form, HiddenField, PreviewContainer};
use image::DynamicImage;

/// Live video surface. Holds the stream it is currently showing, if any.
#[derive(Debug, Clone, Default)]
pub struct VideoElement {
    src: Arc<Mutex<Option<MediaStream>>>,
}

impl VideoElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src_object(&self) -> Option<MediaStream> {
        lock(&self.src).clone()
    }

    pub fn set_src_object(&self, stream: Option<MediaStream>) {
        *lock(&self.src) = stream;
    }
}

/// Offscreen drawing surface shared between the triggers.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    buffer: Arc<Mutex<FrameBuffer>>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self { buffer: Arc::new(Mutex::new(FrameBuffer::with_size(width, height))) }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        let fb = lock(&self.buffer);
        (fb.width(), fb.height())
    }

    /// Resizing clears the surface.
    pub fn set_size(&self, width: u32, height: u32) {
        let mut fb = lock(&self.buffer);
        if (fb.width(), fb.height()) != (width, height) {
            *fb = FrameBuffer::with_size(width, height);
        }
    }

    pub(crate) fn draw_and_encode(&self, frame: &DynamicImage) -> Result<EncodedImage, CaptureError> {
        let mut fb = lock(&self.buffer);
        fb.draw_image(frame)?;
        fb.to_data_url()
    }
}

/// Marker for a capture button being present on the page.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureButton;

/// The handles a capture widget is built from. Only `video` is required;
/// each optional handle gates one behavior:
/// - `canvas`: needed for any capture to succeed
/// - `capture_button`: manual capture on click
/// - `face_input`: where the encoded frame is stored
/// - `preview`: thumbnail of the last capture
/// - `form`: automatic login submit or capture-on-submit fallback
#[derive(Debug, Clone, Default)]
pub struct CaptureElements {
    pub video: Option<VideoElement>,
    pub canvas: Option<Canvas>,
    pub capture_button: Option<CaptureButton>,
    pub face_input: Option<HiddenField>,
    pub preview: Option<PreviewContainer>,
    pub form: Option<Form>,
}

impl CaptureElements {
    /// The usual page layout: every element present, hidden input taken from the form.
    pub fn for_form(form: Form) -> Self {
        Self {
            video: Some(VideoElement::new()),
            canvas: Some(Canvas::new()),
            capture_button: Some(CaptureButton),
            face_input: Some(form.face_input().clone()),
            preview: Some(PreviewContainer::new()),
            form: Some(form),
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
