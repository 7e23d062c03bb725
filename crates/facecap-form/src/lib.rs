pub mod doctor;
mod field;
mod transport;

pub use field::{HiddenField, PreviewContainer, PREVIEW_WIDTH};
pub use transport::{FormResponse, FormTransport, HttpTransport};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Name the server reads the captured image from.
pub const DEFAULT_FACE_FIELD: &str = "face_image";

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("form transport: {0}")]
    Transport(String),
}

/// What the form's `purpose` attribute asks for, decided once at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePurpose {
    /// `purpose="login"`: capture once after a short delay and submit.
    AutoSubmitOnLogin,
    /// Anything else: capture on click, or on submit if nothing was captured.
    CaptureOnDemand,
}

impl CapturePurpose {
    /// Unrecognized values fall through to the default path without complaint.
    pub fn from_attr(purpose: Option<&str>) -> Self {
        match purpose {
            Some("login") => CapturePurpose::AutoSubmitOnLogin,
            _ => CapturePurpose::CaptureOnDemand,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormConfig {
    /// Absolute http(s) URL the form posts to.
    pub action: String,
    pub purpose: Option<String>,
    #[serde(default = "default_face_field")]
    pub face_field: String,
    /// Extra visible fields submitted alongside the image (name, phone, ...).
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    pub timeout_ms: Option<u64>,
}

fn default_face_field() -> String {
    DEFAULT_FACE_FIELD.into()
}

impl FormConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(10_000))
    }
}

/// The enclosing form: metadata, visible fields, the hidden image input and
/// where it gets posted. Cheap to clone; clones share the hidden input.
#[derive(Clone)]
pub struct Form {
    action: String,
    purpose: Option<String>,
    fields: Vec<(String, String)>,
    face_input: HiddenField,
    transport: Arc<dyn FormTransport>,
}

impl Form {
    pub fn new(action: impl Into<String>, transport: Arc<dyn FormTransport>) -> Self {
        Self {
            action: action.into(),
            purpose: None,
            fields: Vec::new(),
            face_input: HiddenField::new(DEFAULT_FACE_FIELD),
            transport,
        }
    }

    pub fn from_config(cfg: &FormConfig, transport: Arc<dyn FormTransport>) -> Self {
        let mut form = Self::new(cfg.action.clone(), transport).with_face_input(HiddenField::new(cfg.face_field.as_str()));
        form.purpose = cfg.purpose.clone();
        form.fields = cfg.fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        form
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn with_face_input(mut self, input: HiddenField) -> Self {
        self.face_input = input;
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Raw `purpose` attribute, if declared.
    pub fn purpose_attr(&self) -> Option<&str> {
        self.purpose.as_deref()
    }

    pub fn purpose(&self) -> CapturePurpose {
        CapturePurpose::from_attr(self.purpose_attr())
    }

    pub fn face_input(&self) -> &HiddenField {
        &self.face_input
    }

    /// Everything that would go on the wire, hidden input last.
    pub fn form_data(&self) -> Vec<(String, String)> {
        let mut data = self.fields.clone();
        data.push((self.face_input.name().to_string(), self.face_input.value()));
        data
    }

    /// Post the form as-is. Blocking; does not run submit listeners.
    pub fn submit(&self) -> Result<FormResponse, FormError> {
        let data = self.form_data();
        info!("form: submitting to {} (purpose={:?})", self.action, self.purpose());
        self.transport.post(&self.action, &data)
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("action", &self.action)
            .field("purpose", &self.purpose)
            .field("fields", &self.fields)
            .field("face_input", &self.face_input.name())
            .finish_non_exhaustive()
    }
}
