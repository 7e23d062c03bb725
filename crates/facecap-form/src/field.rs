use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Width of the preview thumbnail, in pixels.
pub const PREVIEW_WIDTH: u32 = 160;

fn lock(m: &Mutex<String>) -> MutexGuard<'_, String> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Hidden text input carrying the captured image. Clones are handles to the
/// same input, so a write through one is seen by all.
#[derive(Debug, Clone)]
pub struct HiddenField {
    name: Arc<str>,
    value: Arc<Mutex<String>>,
}

impl HiddenField {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into(), value: Arc::new(Mutex::new(String::new())) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> String {
        lock(&self.value).clone()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        *lock(&self.value) = value.into();
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.value).is_empty()
    }

    pub fn clear(&self) {
        lock(&self.value).clear();
    }
}

/// Display-only container for a thumbnail of the last capture.
#[derive(Debug, Clone, Default)]
pub struct PreviewContainer {
    inner_html: Arc<Mutex<String>>,
}

impl PreviewContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner_html(&self) -> String {
        lock(&self.inner_html).clone()
    }

    pub fn set_inner_html(&self, html: impl Into<String>) {
        *lock(&self.inner_html) = html.into();
    }

    /// Replace the contents with a single image tag. `src` is a locally
    /// generated data URI and goes in unescaped.
    pub fn show_image(&self, src: &str) {
        self.set_inner_html(format!(r#"<img src="{src}" width="{PREVIEW_WIDTH}">"#));
    }
}
