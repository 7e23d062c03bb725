use std::time::Duration;
use tracing::{debug, warn};

use crate::FormError;

/// Outcome of a form POST as the browser would see it after redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormResponse {
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
}

impl FormResponse {
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

/// Where a submitted form goes.
pub trait FormTransport: Send + Sync {
    fn post(&self, action: &str, fields: &[(String, String)]) -> Result<FormResponse, FormError>;
}

/// `application/x-www-form-urlencoded` POST over HTTP(S). Blocking.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).redirects(5).build();
        Self { agent }
    }
}

impl FormTransport for HttpTransport {
    fn post(&self, action: &str, fields: &[(String, String)]) -> Result<FormResponse, FormError> {
        let pairs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        debug!("form: POST {} ({} fields)", action, pairs.len());

        match self.agent.post(action).send_form(&pairs) {
            Ok(resp) => Ok(FormResponse { status: resp.status(), url: resp.get_url().to_string() }),
            // the server answers rejected captures with an error page; that is still a response
            Err(ureq::Error::Status(status, resp)) => {
                warn!("form: {} answered {}", action, status);
                Ok(FormResponse { status, url: resp.get_url().to_string() })
            }
            Err(ureq::Error::Transport(t)) => Err(FormError::Transport(t.to_string())),
        }
    }
}
