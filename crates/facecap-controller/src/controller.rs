use std::time::Duration;

use facecap_capture::{CameraError, EncodedImage, MediaConstraints, MediaDevices, TARGET_HEIGHT, TARGET_WIDTH};
use facecap_form::{CapturePurpose, Form, FormResponse, HiddenField, PreviewContainer};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::elements::{CaptureButton, CaptureElements, Canvas, VideoElement};
use crate::{Alert, ControllerError};

/// Settle time before the automatic login capture, so exposure and focus can adjust.
pub const AUTO_CAPTURE_DELAY: Duration = Duration::from_millis(1500);

/// Shown when the camera cannot be opened.
pub const CAMERA_UNAVAILABLE: &str = "Unable to access camera.";

/// Inputs the hosting page feeds the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetEvent {
    CaptureClicked,
    SubmitRequested,
}

/// Which trigger paths are wired up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Listeners {
    pub capture_click: bool,
    pub submit_fallback: bool,
    pub auto_submit_pending: bool,
}

pub enum Startup {
    /// No video surface on the page; nothing was touched.
    Inactive,
    /// Camera request failed; the user was alerted and nothing is wired.
    CameraUnavailable(CameraError),
    Ready(CaptureController),
}

/// Surfaces the capture operation writes through. Cheap to clone.
#[derive(Clone)]
struct Surfaces {
    video: VideoElement,
    canvas: Option<Canvas>,
    face_input: Option<HiddenField>,
    preview: Option<PreviewContainer>,
}

impl Surfaces {
    /// Draw the current video frame, encode it, store it in the hidden
    /// input and refresh the preview.
    async fn capture(&self) -> Result<EncodedImage, ControllerError> {
        let canvas = self.canvas.as_ref().ok_or(ControllerError::NoDrawingSurface)?;
        let stream = self.video.src_object().ok_or(ControllerError::NoStream)?;
        let frame = stream.current_frame().await.map_err(facecap_capture::CaptureError::from)?;
        let encoded = canvas.draw_and_encode(&frame)?;

        let face_input = self.face_input.as_ref().ok_or(ControllerError::NoHiddenField)?;
        face_input.set_value(encoded.as_str());
        if let Some(preview) = &self.preview {
            preview.show_image(encoded.as_str());
        }
        debug!("capture: {}x{} frame -> {} byte data url", frame.width(), frame.height(), encoded.as_str().len());
        Ok(encoded)
    }
}

/// Pending login submit; dropping it cancels the timer.
struct AutoSubmit(JoinHandle<Result<FormResponse, ControllerError>>);

impl AutoSubmit {
    async fn join(&mut self) -> Result<FormResponse, ControllerError> {
        (&mut self.0).await?
    }
}

impl Drop for AutoSubmit {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pub struct CaptureController {
    surfaces: Surfaces,
    button: Option<CaptureButton>,
    form: Option<Form>,
    purpose: Option<CapturePurpose>,
    auto_submit: Option<AutoSubmit>,
}

impl CaptureController {
    /// Bring the widget up: open the camera, then wire the triggers.
    /// Must run inside a tokio runtime when the form asks for auto-submit.
    pub async fn start(elements: CaptureElements, devices: &dyn MediaDevices, alert: &dyn Alert) -> Startup {
        let Some(video) = elements.video else {
            debug!("controller: no video surface, staying inactive");
            return Startup::Inactive;
        };

        if let Some(canvas) = &elements.canvas {
            canvas.set_size(TARGET_WIDTH, TARGET_HEIGHT);
        }

        match devices.get_user_media(MediaConstraints::video_only()).await {
            Ok(stream) => {
                info!("controller: camera stream {} attached", stream.label());
                video.set_src_object(Some(stream));
            }
            Err(e) => {
                error!("getUserMedia error: {}", e);
                alert.alert(CAMERA_UNAVAILABLE);
                return Startup::CameraUnavailable(e);
            }
        }

        let surfaces = Surfaces {
            video,
            canvas: elements.canvas,
            face_input: elements.face_input,
            preview: elements.preview,
        };
        let purpose = elements.form.as_ref().map(Form::purpose);

        let auto_submit = match (&elements.form, purpose) {
            (Some(form), Some(CapturePurpose::AutoSubmitOnLogin)) => {
                info!("controller: login form, capturing in {:?}", AUTO_CAPTURE_DELAY);
                Some(AutoSubmit(spawn_auto_submit(surfaces.clone(), form.clone())))
            }
            _ => None,
        };

        Startup::Ready(Self {
            surfaces,
            button: elements.capture_button,
            form: elements.form,
            purpose,
            auto_submit,
        })
    }

    pub fn purpose(&self) -> Option<CapturePurpose> {
        self.purpose
    }

    pub fn listeners(&self) -> Listeners {
        Listeners {
            capture_click: self.button.is_some(),
            submit_fallback: self.purpose == Some(CapturePurpose::CaptureOnDemand),
            auto_submit_pending: self.auto_submit.as_ref().is_some_and(|a| !a.0.is_finished()),
        }
    }

    /// Capture button click. `Ok(None)` when the page has no capture button.
    pub async fn click_capture(&self) -> Result<Option<EncodedImage>, ControllerError> {
        if self.button.is_none() {
            return Ok(None);
        }
        self.surfaces.capture().await.map(Some)
    }

    /// User-initiated submission. On capture-on-demand forms an empty image
    /// field is filled first; a failed capture stops the submission.
    pub async fn submit(&self) -> Result<FormResponse, ControllerError> {
        let form = self.form.as_ref().ok_or(ControllerError::NoForm)?;
        if self.purpose == Some(CapturePurpose::CaptureOnDemand) {
            let empty = self.surfaces.face_input.as_ref().map_or(true, HiddenField::is_empty);
            if empty {
                info!("controller: nothing captured before submit, capturing now");
                self.surfaces.capture().await?;
            }
        }
        submit_form(form.clone()).await
    }

    /// Wait for the automatic login submit. `None` if none was scheduled or it
    /// was already collected.
    pub async fn auto_submit_finished(&mut self) -> Option<Result<FormResponse, ControllerError>> {
        let mut pending = self.auto_submit.take()?;
        Some(pending.join().await)
    }

    /// Cancel a pending automatic submit (the page is going away).
    pub fn abort_auto_submit(&mut self) {
        self.auto_submit = None;
    }

    /// Drive the widget from page events until the form is submitted, by the
    /// user or by the login timer. Returns `None` once the event channel
    /// closes with nothing left pending.
    pub async fn run(mut self, mut events: mpsc::Receiver<WidgetEvent>) -> Result<Option<FormResponse>, ControllerError> {
        let mut auto = self.auto_submit.take();

        loop {
            tokio::select! {
                joined = async {
                    match auto.as_mut() {
                        Some(pending) => pending.join().await,
                        None => std::future::pending().await,
                    }
                }, if auto.is_some() => match joined {
                    Ok(resp) => {
                        info!("controller: login form submitted ({})", resp.status);
                        return Ok(Some(resp));
                    }
                    // the page stays up; the button and submit paths still work
                    Err(e) => {
                        warn!("controller: automatic login capture failed: {}", e);
                        auto = None;
                    }
                },
                Some(ev) = events.recv() => match ev {
                    WidgetEvent::CaptureClicked => match self.click_capture().await {
                        Ok(Some(img)) => info!("controller: captured {} bytes", img.as_str().len()),
                        Ok(None) => debug!("controller: click ignored, no capture button"),
                        Err(e) => warn!("controller: capture failed: {}", e),
                    },
                    WidgetEvent::SubmitRequested => match self.submit().await {
                        Ok(resp) => {
                            info!("controller: form submitted ({})", resp.status);
                            return Ok(Some(resp));
                        }
                        Err(ControllerError::NoForm) => warn!("controller: submit ignored, no form"),
                        Err(e) => return Err(e),
                    },
                },
                else => return Ok(None),
            }
        }
    }
}

fn spawn_auto_submit(surfaces: Surfaces, form: Form) -> JoinHandle<Result<FormResponse, ControllerError>> {
    tokio::spawn(async move {
        tokio::time::sleep(AUTO_CAPTURE_DELAY).await;
        surfaces.capture().await?;
        submit_form(form).await
    })
}

async fn submit_form(form: Form) -> Result<FormResponse, ControllerError> {
    Ok(tokio::task::spawn_blocking(move || form.submit()).await??)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use facecap_capture::{FrameSource, MediaStream, StillFrame};
    use facecap_form::{FormError, FormTransport};
    use image::{DynamicImage, Rgb, RgbImage};
    use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct FakeDevices {
        stream: Option<MediaStream>,
        calls: AtomicUsize,
    }

    impl FakeDevices {
        fn granting(stream: MediaStream) -> Self {
            Self { stream: Some(stream), calls: AtomicUsize::new(0) }
        }

        fn denying() -> Self {
            Self { stream: None, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl MediaDevices for FakeDevices {
        async fn get_user_media(&self, constraints: MediaConstraints) -> Result<MediaStream, CameraError> {
            assert_eq!(constraints, MediaConstraints::video_only());
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.stream.clone().ok_or_else(|| CameraError::NotAllowed("user dismissed prompt".into()))
        }
    }

    /// Each grab returns a differently coloured frame.
    #[derive(Default)]
    struct ChangingFeed(AtomicU8);

    #[async_trait]
    impl FrameSource for ChangingFeed {
        async fn grab(&self) -> Result<DynamicImage, CameraError> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            let shade = n.wrapping_mul(60);
            Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([shade, 255 - shade, 40]))))
        }
    }

    #[derive(Default)]
    struct Alerts(Mutex<Vec<String>>);

    impl Alert for Alerts {
        fn alert(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    #[derive(Default)]
    struct Posts(Mutex<Vec<Vec<(String, String)>>>);

    impl FormTransport for Posts {
        fn post(&self, action: &str, fields: &[(String, String)]) -> Result<FormResponse, FormError> {
            self.0.lock().unwrap().push(fields.to_vec());
            Ok(FormResponse { status: 200, url: action.to_string() })
        }
    }

    impl Posts {
        fn count(&self) -> usize {
            self.0.lock().unwrap().len()
        }

        fn image_field(&self, i: usize) -> String {
            let posts = self.0.lock().unwrap();
            posts[i].iter().find(|(k, _)| k == "face_image").map(|(_, v)| v.clone()).unwrap()
        }
    }

    fn still_stream() -> MediaStream {
        MediaStream::new("still", Arc::new(StillFrame(DynamicImage::new_rgb8(640, 480))))
    }

    fn form(purpose: Option<&str>, posts: &Arc<Posts>) -> Form {
        let form = Form::new("http://srv/capture", posts.clone());
        match purpose {
            Some(p) => form.with_purpose(p),
            None => form,
        }
    }

    async fn ready(elements: CaptureElements, devices: &FakeDevices) -> CaptureController {
        match CaptureController::start(elements, devices, &Alerts::default()).await {
            Startup::Ready(c) => c,
            _ => panic!("controller did not start"),
        }
    }

    #[tokio::test]
    async fn without_video_nothing_happens() {
        let posts = Arc::new(Posts::default());
        let mut elements = CaptureElements::for_form(form(Some("login"), &posts));
        elements.video = None;
        let canvas = Canvas::with_size(10, 10);
        elements.canvas = Some(canvas.clone());
        let face_input = elements.face_input.clone().unwrap();
        let preview = elements.preview.clone().unwrap();

        let devices = FakeDevices::granting(still_stream());
        let alerts = Alerts::default();
        let startup = CaptureController::start(elements, &devices, &alerts).await;

        assert!(matches!(startup, Startup::Inactive));
        assert_eq!(devices.calls.load(Ordering::SeqCst), 0);
        assert!(alerts.0.lock().unwrap().is_empty());
        assert_eq!(canvas.dimensions(), (10, 10));
        assert!(face_input.is_empty());
        assert!(preview.inner_html().is_empty());
    }

    #[tokio::test]
    async fn granted_stream_becomes_the_video_source() {
        let posts = Arc::new(Posts::default());
        let elements = CaptureElements::for_form(form(None, &posts));
        let video = elements.video.clone().unwrap();
        let stream = still_stream();
        let devices = FakeDevices::granting(stream.clone());

        let ctl = ready(elements, &devices).await;
        assert!(video.src_object().unwrap().same_stream(&stream));
        assert_eq!(devices.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            ctl.listeners(),
            Listeners { capture_click: true, submit_fallback: true, auto_submit_pending: false }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn denied_camera_alerts_once_and_wires_nothing() {
        let posts = Arc::new(Posts::default());
        let elements = CaptureElements::for_form(form(Some("login"), &posts));
        let face_input = elements.face_input.clone().unwrap();
        let video = elements.video.clone().unwrap();
        let devices = FakeDevices::denying();
        let alerts = Alerts::default();

        let startup = CaptureController::start(elements, &devices, &alerts).await;
        assert!(matches!(startup, Startup::CameraUnavailable(CameraError::NotAllowed(_))));
        assert_eq!(*alerts.0.lock().unwrap(), vec![CAMERA_UNAVAILABLE.to_string()]);
        assert!(video.src_object().is_none());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(face_input.is_empty());
        assert_eq!(posts.count(), 0);
    }

    #[tokio::test]
    async fn canvas_is_sized_to_the_capture_target() {
        let posts = Arc::new(Posts::default());
        let mut elements = CaptureElements::for_form(form(None, &posts));
        let canvas = Canvas::with_size(300, 150);
        elements.canvas = Some(canvas.clone());

        let _ctl = ready(elements, &FakeDevices::granting(still_stream())).await;
        assert_eq!(canvas.dimensions(), (320, 240));
    }

    #[tokio::test]
    async fn last_click_wins() {
        let posts = Arc::new(Posts::default());
        let elements = CaptureElements::for_form(form(Some("register"), &posts));
        let face_input = elements.face_input.clone().unwrap();
        let preview = elements.preview.clone().unwrap();
        let feed = MediaStream::new("changing", Arc::new(ChangingFeed::default()));
        let ctl = ready(elements, &FakeDevices::granting(feed)).await;

        let mut shots = Vec::new();
        for _ in 0..3 {
            shots.push(ctl.click_capture().await.unwrap().unwrap());
        }
        assert_ne!(shots[0], shots[2]);
        assert_eq!(face_input.value(), shots[2].as_str());
        assert_eq!(preview.inner_html(), format!(r#"<img src="{}" width="160">"#, shots[2]));

        let pixels = EncodedImage::decode(&face_input.value()).unwrap();
        assert_eq!(pixels.dimensions(), (320, 240));
        assert_eq!(posts.count(), 0);
    }

    #[tokio::test]
    async fn click_without_button_is_ignored() {
        let posts = Arc::new(Posts::default());
        let mut elements = CaptureElements::for_form(form(None, &posts));
        elements.capture_button = None;
        let face_input = elements.face_input.clone().unwrap();
        let ctl = ready(elements, &FakeDevices::granting(still_stream())).await;

        assert!(!ctl.listeners().capture_click);
        assert!(ctl.click_capture().await.unwrap().is_none());
        assert!(face_input.is_empty());
    }

    #[tokio::test]
    async fn missing_preview_still_fills_the_field() {
        let posts = Arc::new(Posts::default());
        let mut elements = CaptureElements::for_form(form(None, &posts));
        elements.preview = None;
        let face_input = elements.face_input.clone().unwrap();
        let ctl = ready(elements, &FakeDevices::granting(still_stream())).await;

        ctl.click_capture().await.unwrap();
        assert!(!face_input.is_empty());
    }

    #[tokio::test]
    async fn capture_needs_canvas_and_field() {
        let posts = Arc::new(Posts::default());
        let mut elements = CaptureElements::for_form(form(None, &posts));
        elements.canvas = None;
        let ctl = ready(elements, &FakeDevices::granting(still_stream())).await;
        assert!(matches!(ctl.click_capture().await, Err(ControllerError::NoDrawingSurface)));

        let mut elements = CaptureElements::for_form(form(None, &posts));
        elements.face_input = None;
        let preview = elements.preview.clone().unwrap();
        let ctl = ready(elements, &FakeDevices::granting(still_stream())).await;
        assert!(matches!(ctl.click_capture().await, Err(ControllerError::NoHiddenField)));
        assert!(preview.inner_html().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn login_captures_and_submits_once_after_delay() {
        let posts = Arc::new(Posts::default());
        let elements = CaptureElements::for_form(form(Some("login"), &posts));
        let face_input = elements.face_input.clone().unwrap();
        let t0 = tokio::time::Instant::now();
        let mut ctl = ready(elements, &FakeDevices::granting(still_stream())).await;

        assert_eq!(ctl.purpose(), Some(CapturePurpose::AutoSubmitOnLogin));
        assert!(ctl.listeners().auto_submit_pending);
        assert!(!ctl.listeners().submit_fallback);

        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(1499)).await;
        assert!(face_input.is_empty());
        assert_eq!(posts.count(), 0);

        let resp = ctl.auto_submit_finished().await.unwrap().unwrap();
        assert_eq!(resp.status, 200);
        assert!(t0.elapsed() >= AUTO_CAPTURE_DELAY);
        assert!(!face_input.is_empty());
        assert_eq!(posts.count(), 1);
        assert_eq!(posts.image_field(0), face_input.value());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(posts.count(), 1);
        assert!(ctl.auto_submit_finished().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_controller_cancels_auto_submit() {
        let posts = Arc::new(Posts::default());
        let elements = CaptureElements::for_form(form(Some("login"), &posts));
        let face_input = elements.face_input.clone().unwrap();
        let ctl = ready(elements, &FakeDevices::granting(still_stream())).await;
        drop(ctl);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(face_input.is_empty());
        assert_eq!(posts.count(), 0);
    }

    #[tokio::test]
    async fn submit_fills_an_empty_field_first() {
        let posts = Arc::new(Posts::default());
        let elements = CaptureElements::for_form(form(Some("register"), &posts));
        let face_input = elements.face_input.clone().unwrap();
        let ctl = ready(elements, &FakeDevices::granting(still_stream())).await;

        assert!(face_input.is_empty());
        ctl.submit().await.unwrap();
        assert_eq!(posts.count(), 1);
        let sent = posts.image_field(0);
        assert!(sent.starts_with("data:image/jpeg;base64,"));
        assert_eq!(sent, face_input.value());
    }

    #[tokio::test]
    async fn submit_keeps_an_existing_capture() {
        let posts = Arc::new(Posts::default());
        let elements = CaptureElements::for_form(form(None, &posts));
        let face_input = elements.face_input.clone().unwrap();
        let feed = MediaStream::new("changing", Arc::new(ChangingFeed::default()));
        let ctl = ready(elements, &FakeDevices::granting(feed)).await;

        let shot = ctl.click_capture().await.unwrap().unwrap();
        ctl.submit().await.unwrap();
        assert_eq!(face_input.value(), shot.as_str());
        assert_eq!(posts.image_field(0), shot.as_str());
    }

    #[tokio::test]
    async fn no_form_means_no_submit_paths() {
        let mut elements = CaptureElements::for_form(form(None, &Arc::new(Posts::default())));
        elements.form = None;
        let ctl = ready(elements, &FakeDevices::granting(still_stream())).await;

        assert_eq!(ctl.purpose(), None);
        assert!(!ctl.listeners().submit_fallback);
        assert!(!ctl.listeners().auto_submit_pending);
        assert!(matches!(ctl.submit().await, Err(ControllerError::NoForm)));
    }

    #[tokio::test]
    async fn run_handles_clicks_then_submit() {
        let posts = Arc::new(Posts::default());
        let elements = CaptureElements::for_form(form(Some("register"), &posts));
        let face_input = elements.face_input.clone().unwrap();
        let ctl = ready(elements, &FakeDevices::granting(still_stream())).await;

        let (tx, rx) = mpsc::channel(4);
        tx.send(WidgetEvent::CaptureClicked).await.unwrap();
        tx.send(WidgetEvent::SubmitRequested).await.unwrap();
        drop(tx);

        let resp = ctl.run(rx).await.unwrap().unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(posts.count(), 1);
        assert_eq!(posts.image_field(0), face_input.value());
    }

    #[tokio::test]
    async fn run_returns_none_when_events_end() {
        let posts = Arc::new(Posts::default());
        let ctl = ready(CaptureElements::for_form(form(None, &posts)), &FakeDevices::granting(still_stream())).await;
        let (tx, rx) = mpsc::channel(1);
        drop(tx);
        assert!(ctl.run(rx).await.unwrap().is_none());
        assert_eq!(posts.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn run_completes_on_login_timer() {
        let posts = Arc::new(Posts::default());
        let ctl = ready(CaptureElements::for_form(form(Some("login"), &posts)), &FakeDevices::granting(still_stream())).await;
        let (_tx, rx) = mpsc::channel(1);

        let resp = ctl.run(rx).await.unwrap().unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(posts.count(), 1);
    }

    /// Fails the first grab only, like a camera still warming up.
    #[derive(Default)]
    struct FailsOnce(AtomicUsize);

    #[async_trait]
    impl FrameSource for FailsOnce {
        async fn grab(&self) -> Result<DynamicImage, CameraError> {
            if self.0.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(CameraError::NotAllowed("device busy".into()));
            }
            Ok(DynamicImage::new_rgb8(640, 480))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_keeps_serving_after_failed_login_capture() {
        let posts = Arc::new(Posts::default());
        let elements = CaptureElements::for_form(form(Some("login"), &posts));
        let face_input = elements.face_input.clone().unwrap();
        let feed = MediaStream::new("flaky", Arc::new(FailsOnce::default()));
        let ctl = ready(elements, &FakeDevices::granting(feed)).await;

        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            tx.send(WidgetEvent::CaptureClicked).await.unwrap();
            tx.send(WidgetEvent::SubmitRequested).await.unwrap();
        });

        let resp = ctl.run(rx).await.unwrap().unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(posts.count(), 1);
        assert!(!face_input.is_empty());
        assert_eq!(posts.image_field(0), face_input.value());
    }

    #[tokio::test]
    async fn login_submit_skips_the_capture_fallback() {
        let posts = Arc::new(Posts::default());
        let elements = CaptureElements::for_form(form(Some("login"), &posts));
        let face_input = elements.face_input.clone().unwrap();
        let preview = elements.preview.clone().unwrap();
        let mut ctl = ready(elements, &FakeDevices::granting(still_stream())).await;
        ctl.abort_auto_submit();

        ctl.submit().await.unwrap();
        assert_eq!(posts.count(), 1);
        assert_eq!(posts.image_field(0), "");
        assert!(face_input.is_empty());
        assert!(preview.inner_html().is_empty());
    }

    #[tokio::test]
    async fn capture_after_stream_is_detached_fails() {
        let posts = Arc::new(Posts::default());
        let elements = CaptureElements::for_form(form(None, &posts));
        let video = elements.video.clone().unwrap();
        let face_input = elements.face_input.clone().unwrap();
        let ctl = ready(elements, &FakeDevices::granting(still_stream())).await;

        video.set_src_object(None);
        assert!(matches!(ctl.click_capture().await, Err(ControllerError::NoStream)));
        assert!(matches!(ctl.submit().await, Err(ControllerError::NoStream)));
        assert!(face_input.is_empty());
        assert_eq!(posts.count(), 0);
    }
}
