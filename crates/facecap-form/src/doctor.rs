use anyhow::Result;

use crate::FormConfig;

pub fn check_form(cfg: &FormConfig) -> Result<()> {
    anyhow::ensure!(
        cfg.action.starts_with("http://") || cfg.action.starts_with("https://"),
        "form.action must be an http(s) URL: {}",
        cfg.action
    );
    anyhow::ensure!(!cfg.face_field.trim().is_empty(), "form.face_field is empty");
    anyhow::ensure!(
        !cfg.fields.contains_key(&cfg.face_field),
        "form.fields must not set the image field ({})",
        cfg.face_field
    );
    if let Some(ms) = cfg.timeout_ms {
        anyhow::ensure!(ms >= 500, "form.timeout_ms too small; set >= 500");
    }
    Ok(())
}
