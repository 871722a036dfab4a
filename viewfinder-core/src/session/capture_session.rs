use std::sync::{mpsc, Arc};
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::config::SessionConfiguration;
use crate::models::error::CameraError;
use crate::models::orientation::{DeviceOrientation, DisplayRotation};
use crate::models::parameters::FocusArea;
use crate::models::picture::{CapturedPicture, PictureMetadata};
use crate::models::state::SessionState;
use crate::models::status::CaptureStatus;
use crate::negotiation::controller::CameraController;
use crate::orientation::watcher::OrientationWatcher;
use crate::session::dispatcher::{MainContext, Poster, Worker};
use crate::session::exclusive::ExclusiveCamera;
use crate::traits::camera_device::{CameraBackend, CameraHandle};
use crate::traits::focus_mapper::FocusMapper;
use crate::traits::orientation_provider::OrientationProvider;
use crate::traits::preview_surface::{PreviewSurface, SurfaceEvent};
use crate::traits::session_delegate::SessionDelegate;

/// What the host can read without going through the serialized context.
struct SharedState {
    state: SessionState,
    status: Option<CaptureStatus>,
}

/// Camera viewfinder and still-capture session bound to one physical device.
///
/// Every call returns immediately: requests are posted to a dedicated
/// "camera-main" thread that owns the handle and runs the state machine, and
/// the blocking hardware open runs on a separate "camera-open" worker.
///
/// ```text
/// [Host] ──start/stop/capture──→ [camera-main] ──open job──→ [camera-open]
///                                     ↑   │                       │
///   [OrientationWatcher] ──readings───┘   └──delegate events      │
///   [hardware callbacks] ──af/picture─────────────────────────────┘ (result)
/// ```
pub struct CaptureSession<B: CameraBackend> {
    context: MainContext<SessionCore<B>>,
    shared: Arc<Mutex<SharedState>>,
}

impl<B: CameraBackend> CaptureSession<B> {
    pub fn new(
        backend: Arc<B>,
        surface: Arc<dyn PreviewSurface>,
        orientation: Arc<dyn OrientationProvider>,
        config: SessionConfiguration,
    ) -> Result<Self, CameraError> {
        config.validate().map_err(CameraError::InvalidParameter)?;

        let shared = Arc::new(Mutex::new(SharedState {
            state: SessionState::Closed,
            status: None,
        }));
        let worker = Worker::spawn("camera-open")?;
        let core_shared = Arc::clone(&shared);

        let context = MainContext::spawn("camera-main", move |poster| SessionCore {
            backend,
            surface,
            watcher: OrientationWatcher::new(orientation),
            worker,
            poster,
            config,
            delegate: None,
            focus_mapper: None,
            shared: core_shared,
            generation: 0,
            state: SessionState::Closed,
            open: None,
        })?;

        Ok(Self { context, shared })
    }

    pub fn set_delegate(&self, delegate: Arc<dyn SessionDelegate>) {
        self.post(move |core| core.delegate = Some(delegate));
    }

    /// Install the tap-to-focus mapping. Without one, `focus_on` is ignored.
    pub fn set_focus_mapper(&self, mapper: Arc<dyn FocusMapper>) {
        self.post(move |core| core.focus_mapper = Some(mapper));
    }

    /// Open the camera and start the preview. Ignored unless closed.
    pub fn start(&self) {
        self.post(SessionCore::start);
    }

    /// Close the camera. Safe from any state, any number of times.
    pub fn stop(&self) {
        self.post(SessionCore::stop);
    }

    /// Capture a still. Dropped unless the preview is streaming.
    pub fn take_picture(&self) {
        self.post(SessionCore::take_picture);
    }

    /// Set the zoom level.
    ///
    /// Out-of-range levels are rejected here when the session is open; while
    /// closed the call is a no-op.
    pub fn set_zoom(&self, level: i32) -> Result<(), CameraError> {
        let status = self.shared.lock().status;
        let Some(status) = status else {
            log::debug!("set_zoom({}) ignored: camera not open", level);
            return Ok(());
        };
        if !status.accepts_zoom(level) {
            return Err(CameraError::InvalidParameter(format!(
                "zoom {} outside [{}, {}]",
                level, status.min_zoom, status.max_zoom
            )));
        }
        self.post(move |core| core.set_zoom(level));
        Ok(())
    }

    pub fn set_flash(&self, on: bool) {
        self.post(move |core| core.set_flash(on));
    }

    /// Forward a tap on the preview surface (surface-local coordinates).
    pub fn focus_on(&self, x: f32, y: f32) {
        self.post(move |core| core.focus_on(x, y));
    }

    /// Forward a surface lifecycle event from the host.
    pub fn notify_surface(&self, event: SurfaceEvent) {
        self.post(move |core| core.on_surface_event(event));
    }

    pub fn state(&self) -> SessionState {
        self.shared.lock().state
    }

    /// Zoom/flash snapshot, `None` while no camera is open.
    pub fn status(&self) -> Option<CaptureStatus> {
        self.shared.lock().status
    }

    /// Block until every request made before this call has been processed.
    ///
    /// Returns `false` on timeout or when called from a delegate callback.
    pub fn sync(&self, timeout: Duration) -> bool {
        self.context.sync(timeout)
    }

    fn post<F>(&self, task: F)
    where
        F: FnOnce(&mut SessionCore<B>) + Send + 'static,
    {
        if !self.context.post(task) {
            log::warn!("camera session context has stopped, request dropped");
        }
    }
}

impl<B: CameraBackend> Drop for CaptureSession<B> {
    fn drop(&mut self) {
        self.context.shutdown_with(SessionCore::stop);
    }
}

/// An open handle together with the controller negotiating its parameters.
struct OpenCamera<H: CameraHandle> {
    camera: ExclusiveCamera<H>,
    controller: CameraController,
}

impl<H: CameraHandle> OpenCamera<H> {
    /// Stage with `stage` and flush; the staged set is restored on failure.
    fn apply<F>(&mut self, stage: F) -> Result<(), CameraError>
    where
        F: FnOnce(&mut CameraController) -> Result<(), CameraError>,
    {
        self.controller.apply_to(self.camera.handle_mut(), stage)
    }

    fn configure_preview(
        &mut self,
        surface: &dyn PreviewSurface,
        display: DisplayRotation,
        orientation: DeviceOrientation,
        config: &SessionConfiguration,
    ) -> Result<(), CameraError> {
        let (width, height) = surface.dimensions();
        self.camera.handle_mut().set_preview_target(surface.surface_id())?;
        self.controller.set_display_rotation(self.camera.handle_mut(), display)?;
        self.apply(|c| {
            c.set_rotation(orientation)
                .set_auto_focus(config.auto_focus)
                .set_preview_size(width.min(height), config.aspect_ratio)
                .set_picture_size(config.min_picture_edge, config.aspect_ratio);
            Ok(())
        })?;
        self.camera.handle_mut().start_preview()
    }

    fn apply_display_rotation(&mut self, rotation: DisplayRotation) -> Result<(), CameraError> {
        self.controller.set_display_rotation(self.camera.handle_mut(), rotation)?;
        self.apply(|_| Ok(()))
    }

    fn apply_device_orientation(&mut self, orientation: DeviceOrientation) -> Result<(), CameraError> {
        self.apply(|c| {
            c.set_rotation(orientation);
            Ok(())
        })
    }

    fn zoom(&mut self, level: i32) -> Result<(), CameraError> {
        self.apply(|c| c.set_zoom(level).map(|_| ()))
    }

    fn flash(&mut self, on: bool) -> Result<(), CameraError> {
        self.apply(|c| {
            c.set_flash(on);
            Ok(())
        })
    }

    fn focus_area(&mut self, area: Option<FocusArea>) -> Result<(), CameraError> {
        self.apply(|c| {
            c.set_focus_area(area);
            Ok(())
        })
    }
}

/// State machine owned by the "camera-main" thread.
struct SessionCore<B: CameraBackend> {
    backend: Arc<B>,
    surface: Arc<dyn PreviewSurface>,
    watcher: OrientationWatcher,
    worker: Worker,
    poster: Poster<SessionCore<B>>,
    config: SessionConfiguration,
    delegate: Option<Arc<dyn SessionDelegate>>,
    focus_mapper: Option<Arc<dyn FocusMapper>>,
    shared: Arc<Mutex<SharedState>>,
    /// Bumped by start and stop; tags every asynchronous completion.
    generation: u64,
    state: SessionState,
    open: Option<OpenCamera<B::Handle>>,
}

impl<B: CameraBackend> SessionCore<B> {
    // --- Lifecycle ---

    fn start(&mut self) {
        if !self.state.is_closed() {
            log::debug!("start ignored: session is {}", self.state.name());
            return;
        }

        self.generation += 1;
        let generation = self.generation;
        self.set_state(SessionState::Opening);

        let backend = Arc::clone(&self.backend);
        let poster = self.poster.clone();
        let index = self.config.camera_index;
        let submitted = self.worker.submit(move || {
            let result = backend.open(index).map(ExclusiveCamera::new);
            let (settled_tx, settled_rx) = mpsc::sync_channel::<()>(1);
            // A refused post drops the result, which releases the handle.
            let posted = poster.post(move |core| {
                core.on_open_finished(generation, result);
                let _ = settled_tx.send(());
            });
            if !posted {
                log::debug!("session gone before camera {} finished opening", index);
                return;
            }
            // The next queued open must not run until this handle is either
            // owned by the session or released.
            let _ = settled_rx.recv();
        });

        if let Err(e) = submitted {
            self.fail_open(e);
        }
    }

    fn on_open_finished(
        &mut self,
        generation: u64,
        result: Result<ExclusiveCamera<B::Handle>, CameraError>,
    ) {
        let current = generation == self.generation && self.state == SessionState::Opening;
        match result {
            Ok(camera) if current => self.on_opened(camera),
            Ok(camera) => {
                log::info!("session stopped while opening, releasing camera");
                camera.close();
            }
            Err(e) if current => self.fail_open(e),
            Err(e) => log::debug!("ignoring stale open failure: {}", e),
        }
    }

    fn on_opened(&mut self, camera: ExclusiveCamera<B::Handle>) {
        let params = match camera.handle().parameters() {
            Ok(params) => params,
            Err(e) => {
                camera.close();
                self.fail_open(e);
                return;
            }
        };
        let mount = camera.handle().mount_info();
        log::info!(
            "camera {} opened ({:?}, mounted at {}°)",
            self.config.camera_index,
            mount.facing,
            mount.orientation
        );

        self.open = Some(OpenCamera {
            camera,
            controller: CameraController::new(mount, params),
        });
        self.set_state(SessionState::Open);

        self.install_orientation_listeners();
        if let Err(e) = self.watcher.enable() {
            log::warn!("orientation updates unavailable: {}", e);
        }

        self.setup_preview();

        let Some(status) = self.publish_status() else {
            return;
        };
        if let Ok(json) = status.to_json() {
            log::debug!("camera status: {}", json);
        }
        if let Some(ref delegate) = self.delegate {
            delegate.on_camera_opened(&status);
        }
    }

    fn fail_open(&mut self, error: CameraError) {
        log::error!("failed to open camera {}: {}", self.config.camera_index, error);
        self.set_state(SessionState::Closed);
        if let Some(ref delegate) = self.delegate {
            delegate.on_camera_open_failed(&error);
        }
    }

    fn stop(&mut self) {
        if self.state.is_closed() {
            log::debug!("stop ignored: already closed");
            return;
        }

        self.generation += 1;
        self.watcher.disable();
        self.watcher.clear_listeners();
        if let Some(open) = self.open.take() {
            open.camera.close();
        }
        self.shared.lock().status = None;
        self.set_state(SessionState::Closed);

        if let Some(ref delegate) = self.delegate {
            delegate.on_camera_closed();
        }
        log::info!("camera {} closed", self.config.camera_index);
    }

    // --- Preview ---

    fn setup_preview(&mut self) {
        let Some(open) = self.open.as_mut() else {
            return;
        };
        if !self.surface.exists() {
            log::debug!("surface not ready, deferring preview setup");
            return;
        }

        let display = self.watcher.display_rotation();
        let orientation = self.watcher.device_orientation();
        match open.configure_preview(self.surface.as_ref(), display, orientation, &self.config) {
            Ok(()) => {
                let params = open.controller.parameters();
                log::debug!(
                    "preview {} / picture {} / focus {:?}",
                    params.preview_size,
                    params.picture_size,
                    params.focus_mode
                );
                if self.state == SessionState::Open {
                    self.set_state(SessionState::Previewing);
                }
            }
            Err(e) => report_swallowed("preview setup", &e),
        }
    }

    /// Stop the stream if there is one. "Not streaming" errors are expected.
    fn stop_streaming(&mut self) {
        let Some(open) = self.open.as_mut() else {
            return;
        };
        if let Err(e) = open.camera.handle_mut().stop_preview() {
            log::debug!("stop preview: {}", e);
        }
        if self.state == SessionState::Previewing {
            self.set_state(SessionState::Open);
        }
    }

    fn on_surface_event(&mut self, event: SurfaceEvent) {
        if self.open.is_none() {
            log::debug!("surface {:?} while no camera is open", event);
            return;
        }
        match event {
            SurfaceEvent::Created | SurfaceEvent::Changed => {
                self.stop_streaming();
                self.setup_preview();
            }
            SurfaceEvent::Destroyed => self.stop_streaming(),
        }
    }

    // --- Orientation ---

    fn install_orientation_listeners(&mut self) {
        let generation = self.generation;

        let poster = self.poster.clone();
        self.watcher.set_display_rotation_listener(move |rotation| {
            poster.post(move |core| core.apply_display_rotation(generation, rotation));
        });

        let poster = self.poster.clone();
        self.watcher.set_device_orientation_listener(move |orientation| {
            poster.post(move |core| core.apply_device_orientation(generation, orientation));
        });
    }

    fn apply_display_rotation(&mut self, generation: u64, rotation: DisplayRotation) {
        if generation != self.generation {
            return;
        }
        if let Some(open) = self.open.as_mut() {
            if let Err(e) = open.apply_display_rotation(rotation) {
                report_swallowed(&format!("display rotation {}", rotation), &e);
            }
        }
    }

    fn apply_device_orientation(&mut self, generation: u64, orientation: DeviceOrientation) {
        if generation != self.generation {
            return;
        }
        if let Some(open) = self.open.as_mut() {
            if let Err(e) = open.apply_device_orientation(orientation) {
                report_swallowed(&format!("device orientation {}", orientation), &e);
            }
        }
    }

    // --- Still capture ---

    fn take_picture(&mut self) {
        if !self.state.is_previewing() {
            log::debug!("take_picture ignored: session is {}", self.state.name());
            return;
        }
        let generation = self.generation;
        let poster = self.poster.clone();
        let Some(open) = self.open.as_mut() else {
            return;
        };

        if open.controller.is_auto_focus() {
            let handle = open.camera.handle_mut();
            if let Err(e) = handle.cancel_auto_focus() {
                log::debug!("cancel autofocus: {}", e);
            }
            let requested = handle.auto_focus(Box::new(move |focused| {
                poster.post(move |core| core.on_auto_focus_done(generation, focused));
            }));
            match requested {
                Ok(()) => {
                    self.set_state(SessionState::AutofocusPending);
                    return;
                }
                Err(e) => log::warn!("autofocus request failed, capturing without it: {}", e),
            }
        }

        self.capture_still();
    }

    fn on_auto_focus_done(&mut self, generation: u64, focused: bool) {
        if generation != self.generation || self.state != SessionState::AutofocusPending {
            log::debug!("dropping stale autofocus completion");
            return;
        }
        log::debug!("autofocus finished (locked: {})", focused);
        self.capture_still();
    }

    fn capture_still(&mut self) {
        let generation = self.generation;
        let poster = self.poster.clone();
        let Some(open) = self.open.as_mut() else {
            return;
        };

        let requested = open.camera.handle_mut().take_picture(Box::new(move |data| {
            poster.post(move |core| core.on_picture_data(generation, data));
        }));
        match requested {
            Ok(()) => self.set_state(SessionState::Capturing),
            Err(e) => {
                report_swallowed("still capture", &e);
                self.set_state(self.idle_state());
            }
        }
    }

    fn on_picture_data(&mut self, generation: u64, data: Vec<u8>) {
        if generation != self.generation || self.state != SessionState::Capturing {
            log::debug!("dropping stale picture ({} bytes)", data.len());
            return;
        }
        let Some(open) = self.open.as_mut() else {
            return;
        };

        // The surface may have gone away while the capture was in flight.
        let streaming = if self.surface.exists() {
            match open.camera.handle_mut().start_preview() {
                Ok(()) => true,
                Err(e) => {
                    report_swallowed("preview restart after capture", &e);
                    false
                }
            }
        } else {
            log::debug!("surface gone, preview stays stopped after capture");
            false
        };
        let params = open.controller.parameters();
        let picture = CapturedPicture {
            metadata: PictureMetadata::new(params.picture_size, params.rotation),
            data,
        };
        match picture.metadata.to_json() {
            Ok(json) => log::debug!("picture taken ({} bytes): {}", picture.data.len(), json),
            Err(e) => log::debug!("picture {} taken, metadata not serializable: {}", picture.metadata.id, e),
        }

        self.set_state(if streaming {
            SessionState::Previewing
        } else {
            SessionState::Open
        });
        if let Some(ref delegate) = self.delegate {
            delegate.on_picture_taken(&picture);
        }
    }

    // --- Parameters ---

    fn set_zoom(&mut self, level: i32) {
        let Some(open) = self.open.as_mut() else {
            log::debug!("set_zoom({}) ignored: camera not open", level);
            return;
        };
        match open.zoom(level) {
            Ok(()) => {
                self.publish_status();
            }
            Err(e @ CameraError::InvalidParameter(_)) => {
                log::warn!("rejected zoom: {}", e);
                if let Some(ref delegate) = self.delegate {
                    delegate.on_error(&e);
                }
            }
            Err(e) => report_swallowed("zoom", &e),
        }
    }

    fn set_flash(&mut self, on: bool) {
        let Some(open) = self.open.as_mut() else {
            log::debug!("set_flash ignored: camera not open");
            return;
        };
        match open.flash(on) {
            Ok(()) => {
                self.publish_status();
            }
            Err(e) => report_swallowed("flash", &e),
        }
    }

    fn focus_on(&mut self, x: f32, y: f32) {
        let Some(open) = self.open.as_mut() else {
            log::debug!("focus_on ignored: camera not open");
            return;
        };
        let Some(ref mapper) = self.focus_mapper else {
            log::debug!("tap at ({}, {}) ignored: no focus mapper", x, y);
            return;
        };

        let area = mapper.focus_area(x, y, self.surface.dimensions());
        if let Err(e) = open.focus_area(area) {
            report_swallowed("focus area", &e);
        }
    }

    // --- Internal helpers ---

    /// Where the session lands when a capture ends without a running stream.
    fn idle_state(&self) -> SessionState {
        if self.surface.exists() {
            SessionState::Previewing
        } else {
            SessionState::Open
        }
    }

    fn publish_status(&mut self) -> Option<CaptureStatus> {
        let status = self.open.as_ref().map(|open| open.controller.status());
        self.shared.lock().status = status;
        status
    }

    fn set_state(&mut self, new_state: SessionState) {
        if self.state == new_state {
            return;
        }
        log::debug!("session {} → {}", self.state.name(), new_state.name());
        self.state = new_state;
        self.shared.lock().state = new_state;
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(&new_state);
        }
    }
}

/// Log a failure at a best-effort call site. Transient hardware faults are
/// expected; anything else points at a bug or a misbehaving backend.
fn report_swallowed(what: &str, error: &CameraError) {
    if error.is_transient() {
        log::warn!("{} failed: {}", what, error);
    } else {
        log::error!("{} failed: {}", what, error);
    }
}
