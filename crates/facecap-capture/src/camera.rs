use async_trait::async_trait;
use image::DynamicImage;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CameraConfig {
    pub mode: String, // "libcamera-jpeg" | "v4l2-mjpeg" | "still-file"
    #[serde(default = "default_device")]
    pub device: String, // /dev/video0 (v4l2)
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Image on disk served as the live feed in `still-file` mode.
    pub still_path: Option<PathBuf>,
}

fn default_device() -> String {
    "/dev/video0".into()
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("unknown camera.mode: {0}")]
    UnknownMode(String),
    #[error("only video capture is supported")]
    AudioUnsupported,
    #[error("no video track requested")]
    NoVideoRequested,
    #[error("camera device not found: {0}")]
    DeviceMissing(String),
    #[error("camera.still_path missing (mode=still-file)")]
    StillPathMissing,
    #[error("run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} failed: {status}")]
    CommandFailed { program: &'static str, status: String },
    #[error("read still frame {path}: {source}")]
    ReadStill {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("decode camera frame: {0}")]
    Decode(#[from] image::ImageError),
    #[error("permission denied: {0}")]
    NotAllowed(String),
}

/// What a caller asks the media facility for. Only video-only requests are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub video: bool,
    pub audio: bool,
}

impl MediaConstraints {
    pub fn video_only() -> Self {
        Self { video: true, audio: false }
    }
}

/// Something that can hand out the frame currently visible on a live feed.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn grab(&self) -> Result<DynamicImage, CameraError>;
}

/// Handle to a live camera feed. Clones share the same underlying source.
#[derive(Clone)]
pub struct MediaStream {
    label: String,
    source: Arc<dyn FrameSource>,
}

impl MediaStream {
    pub fn new(label: impl Into<String>, source: Arc<dyn FrameSource>) -> Self {
        Self { label: label.into(), source }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub async fn current_frame(&self) -> Result<DynamicImage, CameraError> {
        self.source.grab().await
    }

    /// True when both handles refer to the same feed.
    pub fn same_stream(&self, other: &MediaStream) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStream").field("label", &self.label).finish_non_exhaustive()
    }
}

/// The platform media-capture facility.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn get_user_media(&self, constraints: MediaConstraints) -> Result<MediaStream, CameraError>;
}

/// A fixed image standing in for a live feed.
#[derive(Debug, Clone)]
pub struct StillFrame(pub DynamicImage);

#[async_trait]
impl FrameSource for StillFrame {
    async fn grab(&self) -> Result<DynamicImage, CameraError> {
        Ok(self.0.clone())
    }
}

/// Camera access through external capture tools:
/// - libcamera-jpeg: `libcamera-still -n -t 1 --width ... --height ... -o -`
///   returns a JPEG frame on stdout (simple, robust on Pi)
/// - v4l2-mjpeg: `ffmpeg` grabs a single MJPEG frame from a v4l2 device
/// - still-file: re-reads an image from disk on every grab
#[derive(Debug, Clone)]
pub struct CommandCamera {
    cfg: CameraConfig,
}

impl CommandCamera {
    pub fn new(cfg: CameraConfig) -> Result<Self, CameraError> {
        match cfg.mode.as_str() {
            "libcamera-jpeg" | "v4l2-mjpeg" => {}
            "still-file" => {
                if cfg.still_path.is_none() {
                    return Err(CameraError::StillPathMissing);
                }
            }
            other => return Err(CameraError::UnknownMode(other.to_string())),
        }
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &CameraConfig {
        &self.cfg
    }
}

#[async_trait]
impl MediaDevices for CommandCamera {
    async fn get_user_media(&self, constraints: MediaConstraints) -> Result<MediaStream, CameraError> {
        if constraints.audio {
            return Err(CameraError::AudioUnsupported);
        }
        if !constraints.video {
            return Err(CameraError::NoVideoRequested);
        }
        if self.cfg.mode == "v4l2-mjpeg" && !Path::new(&self.cfg.device).exists() {
            return Err(CameraError::DeviceMissing(self.cfg.device.clone()));
        }

        let source = CommandSource { cfg: self.cfg.clone() };
        // probe: a camera that cannot produce one frame is treated as unavailable
        let probe = source.grab().await?;
        info!(
            "camera: {} ready ({}x{})",
            self.cfg.mode,
            probe.width(),
            probe.height()
        );

        let label = match self.cfg.mode.as_str() {
            "v4l2-mjpeg" => self.cfg.device.clone(),
            "still-file" => self
                .cfg
                .still_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            other => other.to_string(),
        };
        Ok(MediaStream::new(label, Arc::new(source)))
    }
}

struct CommandSource {
    cfg: CameraConfig,
}

#[async_trait]
impl FrameSource for CommandSource {
    async fn grab(&self) -> Result<DynamicImage, CameraError> {
        let bytes = match self.cfg.mode.as_str() {
            "still-file" => {
                let path = self.cfg.still_path.as_ref().ok_or(CameraError::StillPathMissing)?;
                tokio::fs::read(path)
                    .await
                    .map_err(|source| CameraError::ReadStill { path: path.clone(), source })?
            }
            _ => capture_jpeg(&self.cfg).await?,
        };
        Ok(image::load_from_memory(&bytes)?)
    }
}

/// Grab one encoded frame from a command-line capture backend.
pub async fn capture_jpeg(cfg: &CameraConfig) -> Result<Vec<u8>, CameraError> {
    match cfg.mode.as_str() {
        "libcamera-jpeg" => capture_libcamera(cfg).await,
        "v4l2-mjpeg" => capture_v4l2_ffmpeg(cfg).await,
        other => Err(CameraError::UnknownMode(other.to_string())),
    }
}

async fn capture_libcamera(cfg: &CameraConfig) -> Result<Vec<u8>, CameraError> {
    let mut cmd = Command::new("libcamera-still");
    cmd.args([
        "-n",                 // no preview
        "-t", "1",            // 1ms
        "--width", &cfg.width.to_string(),
        "--height", &cfg.height.to_string(),
        "-o", "-",            // stdout
    ]);

    debug!("capture: libcamera-still");
    run_capture(cmd, "libcamera-still").await
}

async fn capture_v4l2_ffmpeg(cfg: &CameraConfig) -> Result<Vec<u8>, CameraError> {
    // ffmpeg -f video4linux2 -input_format mjpeg -video_size WxH -i /dev/video0 -vframes 1 -f image2pipe -vcodec mjpeg -
    let mut cmd = Command::new("ffmpeg");
    cmd.args([
        "-hide_banner", "-loglevel", "error",
        "-f", "video4linux2",
        "-input_format", "mjpeg",
        "-video_size", &format!("{}x{}", cfg.width, cfg.height),
        "-i", &cfg.device,
        "-vframes", "1",
        "-f", "image2pipe",
        "-vcodec", "mjpeg",
        "-",
    ]);

    debug!("capture: ffmpeg v4l2 {}", cfg.device);
    run_capture(cmd, "ffmpeg").await
}

async fn run_capture(mut cmd: Command, program: &'static str) -> Result<Vec<u8>, CameraError> {
    let out = cmd
        .output()
        .await
        .map_err(|source| CameraError::Spawn { program, source })?;
    if !out.status.success() {
        return Err(CameraError::CommandFailed { program, status: out.status.to_string() });
    }
    Ok(out.stdout)
}
