use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use facecap_capture::{camera::CameraConfig, doctor as camera_doctor, CommandCamera, EncodedImage};
use facecap_controller::{
    Alert, CaptureButton, CaptureController, CaptureElements, Canvas, Startup, VideoElement, WidgetEvent,
};
use facecap_form::{doctor as form_doctor, Form, FormConfig, HiddenField, HttpTransport, DEFAULT_FACE_FIELD};

#[derive(Debug, Parser)]
#[command(name = "facecap", version, about = "facecap - camera capture for face login/registration forms")]
struct Cli {
    #[arg(long)]
    config: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate camera and form settings.
    Doctor,
    /// Capture one frame and write it out.
    Snapshot {
        /// JPEG output path (default: facecap-<unix-ms>.jpg)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the data URI to stdout instead of writing a file.
        #[arg(long)]
        data_url: bool,
    },
    /// Decode a stored data URI back into an image file.
    Decode {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Run the capture widget against the configured form.
    /// Reads `c` (capture) and `s` (submit) lines from stdin.
    Run,
}

#[derive(Debug, serde::Deserialize)]
struct Config {
    camera: CameraConfig,
    form: Option<FormConfig>,
}

fn load_config(path: &str) -> Result<Config> {
    let s = std::fs::read_to_string(path).context("read config")?;
    toml::from_str(&s).context("parse config toml")
}

/// Alerts go straight to the operator's terminal.
struct StderrAlert;

impl Alert for StderrAlert {
    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;

    match cli.cmd {
        Command::Doctor => doctor(&cfg)?,
        Command::Snapshot { out, data_url } => snapshot(&cfg, out, data_url).await?,
        Command::Decode { input, out } => decode(&input, &out)?,
        Command::Run => run(&cfg).await?,
    }
    Ok(())
}

fn doctor(cfg: &Config) -> Result<()> {
    info!("doctor: starting");
    camera_doctor::check_camera(&cfg.camera)?;
    match &cfg.form {
        Some(form) => form_doctor::check_form(form)?,
        None => warn!("doctor: no [form] section; only snapshot/decode will work"),
    }
    info!("doctor: OK");
    Ok(())
}

async fn snapshot(cfg: &Config, out: Option<PathBuf>, data_url: bool) -> Result<()> {
    let camera = CommandCamera::new(cfg.camera.clone()).context("camera config")?;
    let face_input = HiddenField::new(DEFAULT_FACE_FIELD);
    let elements = CaptureElements {
        video: Some(VideoElement::new()),
        canvas: Some(Canvas::new()),
        capture_button: Some(CaptureButton),
        face_input: Some(face_input),
        preview: None,
        form: None,
    };

    let ctl = match CaptureController::start(elements, &camera, &StderrAlert).await {
        Startup::Ready(ctl) => ctl,
        Startup::CameraUnavailable(e) => return Err(e).context("open camera"),
        Startup::Inactive => anyhow::bail!("capture widget inactive"),
    };
    let shot = ctl.click_capture().await?.context("capture button missing")?;

    if data_url {
        println!("{shot}");
        return Ok(());
    }
    let path = out.unwrap_or_else(|| {
        let ms = time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        PathBuf::from(format!("facecap-{ms}.jpg"))
    });
    std::fs::write(&path, shot.jpeg_bytes()?).with_context(|| format!("write {}", path.display()))?;
    info!("snapshot: wrote {}", path.display());
    Ok(())
}

fn decode(input: &Path, out: &Path) -> Result<()> {
    let value = std::fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;
    let img = EncodedImage::decode(value.trim()).context("decode data url")?;
    img.save(out).with_context(|| format!("write {}", out.display()))?;
    info!("decode: {}x{} -> {}", img.width(), img.height(), out.display());
    Ok(())
}

async fn run(cfg: &Config) -> Result<()> {
    let form_cfg = cfg.form.as_ref().context("no [form] config section")?;
    let camera = CommandCamera::new(cfg.camera.clone()).context("camera config")?;
    let transport = Arc::new(HttpTransport::new(form_cfg.timeout()));
    let form = Form::from_config(form_cfg, transport);

    info!("run: starting (action={}, purpose={:?})", form.action(), form.purpose());
    let ctl = match CaptureController::start(CaptureElements::for_form(form), &camera, &StderrAlert).await {
        Startup::Ready(ctl) => ctl,
        // already reported to the user
        Startup::CameraUnavailable(_) => return Ok(()),
        Startup::Inactive => return Ok(()),
    };

    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(async move {
        if let Err(e) = forward_stdin(tx).await {
            warn!("run: stdin closed: {:#}", e);
        }
    });

    tokio::select! {
        res = ctl.run(rx) => match res? {
            Some(resp) => {
                info!("run: server answered {} ({})", resp.status, resp.url);
                anyhow::ensure!(resp.is_success(), "form rejected with HTTP {}", resp.status);
            }
            None => info!("run: input closed before submission"),
        },
        _ = tokio::signal::ctrl_c() => info!("run: interrupted"),
    }
    Ok(())
}

async fn forward_stdin(tx: mpsc::Sender<WidgetEvent>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Some(ev) => {
                if tx.send(ev).await.is_err() {
                    break;
                }
            }
            None if line.trim().is_empty() => {}
            None => warn!("unknown input {:?} (c = capture, s = submit)", line.trim()),
        }
    }
    Ok(())
}

fn parse_input(line: &str) -> Option<WidgetEvent> {
    match line.trim() {
        "c" | "capture" => Some(WidgetEvent::CaptureClicked),
        "s" | "submit" => Some(WidgetEvent::SubmitRequested),
        _ => None,
    }
}
