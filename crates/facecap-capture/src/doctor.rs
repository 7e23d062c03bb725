use anyhow::Result;
use std::path::Path;

use crate::camera::CameraConfig;

pub fn check_camera(cfg: &CameraConfig) -> Result<()> {
    match cfg.mode.as_str() {
        "libcamera-jpeg" => {}
        "v4l2-mjpeg" => {
            anyhow::ensure!(Path::new(&cfg.device).exists(), "camera.device not found: {}", cfg.device);
        }
        "still-file" => {
            let p = cfg.still_path.as_ref().ok_or_else(|| anyhow::anyhow!("camera.still_path missing"))?;
            anyhow::ensure!(p.is_file(), "camera.still_path is not a file: {}", p.display());
        }
        other => anyhow::bail!("unknown camera.mode: {}", other),
    }
    anyhow::ensure!(cfg.width >= crate::TARGET_WIDTH && cfg.height >= crate::TARGET_HEIGHT,
        "camera resolution {}x{} below capture size {}x{}",
        cfg.width, cfg.height, crate::TARGET_WIDTH, crate::TARGET_HEIGHT);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(mode: &str) -> CameraConfig {
        CameraConfig {
            mode: mode.into(),
            device: "/dev/video0".into(),
            width: 640,
            height: 480,
            still_path: None,
        }
    }

    #[test]
    fn libcamera_needs_no_device_path() {
        check_camera(&cfg("libcamera-jpeg")).unwrap();
    }

    #[test]
    fn still_file_must_exist() {
        let mut c = cfg("still-file");
        assert!(check_camera(&c).is_err());

        let f = tempfile::NamedTempFile::new().unwrap();
        c.still_path = Some(f.path().to_path_buf());
        check_camera(&c).unwrap();
    }

    #[test]
    fn rejects_small_or_unknown() {
        let mut c = cfg("libcamera-jpeg");
        c.width = 160;
        assert!(check_camera(&c).is_err());
        assert!(check_camera(&cfg("gstreamer")).is_err());
    }
}
