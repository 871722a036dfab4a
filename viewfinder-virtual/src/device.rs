//! In-process camera device.
//!
//! `VirtualCameraBackend` hands out at most one live `VirtualCamera` at a
//! time. The handle validates every parameter write against the device's
//! capability lists and completes autofocus and still capture on short-lived
//! helper threads, the way a real driver calls back from its own thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use viewfinder_core::models::camera_info::CameraMountInfo;
use viewfinder_core::models::error::CameraError;
use viewfinder_core::models::geometry::Size;
use viewfinder_core::models::parameters::{FlashMode, FocusMode, ParameterSet};
use viewfinder_core::traits::camera_device::{AutoFocusCallback, CameraBackend, CameraHandle, PictureCallback};

use crate::frames;

/// Capabilities and timing of one simulated sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualDeviceSpec {
    pub mount: CameraMountInfo,
    pub preview_sizes: Vec<Size>,
    pub picture_sizes: Vec<Size>,
    pub focus_modes: Vec<FocusMode>,
    pub max_zoom: u32,
    /// How long `open` blocks before returning.
    pub open_delay: Duration,
    /// How long an autofocus cycle takes.
    pub focus_delay: Duration,
}

impl Default for VirtualDeviceSpec {
    fn default() -> Self {
        Self {
            mount: CameraMountInfo::back(90),
            preview_sizes: vec![
                Size::new(1920, 1080),
                Size::new(1280, 720),
                Size::new(640, 480),
                Size::new(1280, 960),
                Size::new(1440, 1080),
            ],
            picture_sizes: vec![Size::new(640, 480), Size::new(1600, 1200), Size::new(2048, 1536)],
            focus_modes: vec![
                FocusMode::Auto,
                FocusMode::ContinuousPicture,
                FocusMode::ContinuousVideo,
                FocusMode::Infinity,
            ],
            max_zoom: 30,
            open_delay: Duration::ZERO,
            focus_delay: Duration::from_millis(5),
        }
    }
}

impl VirtualDeviceSpec {
    /// A front-facing sensor with fixed focus.
    pub fn front() -> Self {
        Self {
            mount: CameraMountInfo::front(270),
            preview_sizes: vec![Size::new(1280, 720), Size::new(640, 480), Size::new(960, 720)],
            picture_sizes: vec![Size::new(640, 480), Size::new(1280, 960)],
            focus_modes: vec![FocusMode::Fixed],
            max_zoom: 0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.preview_sizes.is_empty() {
            return Err("device must support at least one preview size".into());
        }
        if self.picture_sizes.is_empty() {
            return Err("device must support at least one picture size".into());
        }
        if self.mount.orientation % 90 != 0 || self.mount.orientation >= 360 {
            return Err(format!("invalid mount orientation: {}", self.mount.orientation));
        }
        Ok(())
    }

    /// Parameters a freshly opened device reports: first of each list.
    fn initial_parameters(&self) -> ParameterSet {
        ParameterSet {
            supported_preview_sizes: self.preview_sizes.clone(),
            supported_picture_sizes: self.picture_sizes.clone(),
            supported_focus_modes: self.focus_modes.clone(),
            max_zoom: self.max_zoom,
            preview_size: self.preview_sizes.first().copied().unwrap_or_default(),
            picture_size: self.picture_sizes.first().copied().unwrap_or_default(),
            focus_mode: self.focus_modes.first().cloned(),
            rotation: 0,
            zoom: 0,
            flash_mode: FlashMode::Off,
            focus_area: None,
        }
    }

    fn check(&self, params: &ParameterSet) -> Result<(), CameraError> {
        if !self.preview_sizes.contains(&params.preview_size) {
            return Err(CameraError::InvalidParameter(format!(
                "unsupported preview size {}",
                params.preview_size
            )));
        }
        if !self.picture_sizes.contains(&params.picture_size) {
            return Err(CameraError::InvalidParameter(format!(
                "unsupported picture size {}",
                params.picture_size
            )));
        }
        if let Some(ref mode) = params.focus_mode {
            if !self.focus_modes.contains(mode) {
                return Err(CameraError::InvalidParameter(format!(
                    "unsupported focus mode {}",
                    mode.as_str()
                )));
            }
        }
        if params.zoom > self.max_zoom {
            return Err(CameraError::InvalidParameter(format!(
                "zoom {} above {}",
                params.zoom, self.max_zoom
            )));
        }
        if params.rotation % 90 != 0 || params.rotation >= 360 {
            return Err(CameraError::InvalidParameter(format!(
                "invalid rotation {}",
                params.rotation
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct JournalState {
    opens: u32,
    releases: u32,
    flushes: u32,
    last_parameters: Option<ParameterSet>,
    display_orientation: Option<u32>,
    preview_target: Option<u64>,
    streaming: bool,
    captures: u32,
}

/// Read-only view of what the virtual device has been asked to do.
///
/// Cheap to clone; every clone observes the same device.
#[derive(Debug, Clone, Default)]
pub struct DeviceJournal {
    state: Arc<Mutex<JournalState>>,
}

impl DeviceJournal {
    pub fn opens(&self) -> u32 {
        self.state.lock().opens
    }

    pub fn releases(&self) -> u32 {
        self.state.lock().releases
    }

    /// Number of accepted parameter writes.
    pub fn flushes(&self) -> u32 {
        self.state.lock().flushes
    }

    /// The most recently accepted parameter write.
    pub fn last_parameters(&self) -> Option<ParameterSet> {
        self.state.lock().last_parameters.clone()
    }

    pub fn display_orientation(&self) -> Option<u32> {
        self.state.lock().display_orientation
    }

    pub fn preview_target(&self) -> Option<u64> {
        self.state.lock().preview_target
    }

    pub fn is_streaming(&self) -> bool {
        self.state.lock().streaming
    }

    pub fn captures(&self) -> u32 {
        self.state.lock().captures
    }

    fn update<F: FnOnce(&mut JournalState)>(&self, f: F) {
        f(&mut self.state.lock());
    }
}

/// Simulated camera driver with one or more sensors.
pub struct VirtualCameraBackend {
    devices: Vec<VirtualDeviceSpec>,
    in_use: Arc<AtomicBool>,
    fail_next_open: AtomicBool,
    journal: DeviceJournal,
}

impl Default for VirtualCameraBackend {
    fn default() -> Self {
        Self::with_devices(vec![VirtualDeviceSpec::default(), VirtualDeviceSpec::front()])
    }
}

impl VirtualCameraBackend {
    /// A backend with a single sensor at index 0.
    pub fn new(spec: VirtualDeviceSpec) -> Self {
        Self::with_devices(vec![spec])
    }

    /// A backend whose sensor at index `i` is `devices[i]`.
    pub fn with_devices(devices: Vec<VirtualDeviceSpec>) -> Self {
        Self {
            devices,
            in_use: Arc::new(AtomicBool::new(false)),
            fail_next_open: AtomicBool::new(false),
            journal: DeviceJournal::default(),
        }
    }

    pub fn journal(&self) -> DeviceJournal {
        self.journal.clone()
    }

    pub fn camera_count(&self) -> u32 {
        self.devices.len() as u32
    }

    /// Whether a handle from this backend is currently live.
    pub fn is_in_use(&self) -> bool {
        self.in_use.load(Ordering::SeqCst)
    }

    /// Make the next `open` fail as if the device were held by another process.
    pub fn fail_next_open(&self) {
        self.fail_next_open.store(true, Ordering::SeqCst);
    }
}

impl CameraBackend for VirtualCameraBackend {
    type Handle = VirtualCamera;

    fn open(&self, index: u32) -> Result<VirtualCamera, CameraError> {
        let spec = self
            .devices
            .get(index as usize)
            .ok_or_else(|| CameraError::ResourceUnavailable(format!("no camera at index {}", index)))?;
        spec.validate().map_err(CameraError::InvalidParameter)?;

        if !spec.open_delay.is_zero() {
            thread::sleep(spec.open_delay);
        }
        if self.fail_next_open.swap(false, Ordering::SeqCst) {
            return Err(CameraError::ResourceUnavailable(format!(
                "camera {} is held by another client",
                index
            )));
        }
        if self.in_use.swap(true, Ordering::SeqCst) {
            return Err(CameraError::ResourceUnavailable("camera already open".into()));
        }

        self.journal.update(|p| p.opens += 1);
        log::debug!("virtual camera {} opened", index);
        Ok(VirtualCamera {
            spec: spec.clone(),
            params: spec.initial_parameters(),
            streaming: false,
            released: false,
            in_use: Arc::clone(&self.in_use),
            journal: self.journal.clone(),
        })
    }
}

/// An open virtual sensor.
///
/// Every call after `release` fails with `NotOpen`.
pub struct VirtualCamera {
    spec: VirtualDeviceSpec,
    params: ParameterSet,
    streaming: bool,
    released: bool,
    in_use: Arc<AtomicBool>,
    journal: DeviceJournal,
}

impl VirtualCamera {
    fn ensure_open(&self) -> Result<(), CameraError> {
        if self.released {
            return Err(CameraError::NotOpen);
        }
        Ok(())
    }

    fn set_streaming(&mut self, streaming: bool) {
        self.streaming = streaming;
        self.journal.update(|p| p.streaming = streaming);
    }
}

impl CameraHandle for VirtualCamera {
    fn mount_info(&self) -> CameraMountInfo {
        self.spec.mount
    }

    fn parameters(&self) -> Result<ParameterSet, CameraError> {
        self.ensure_open()?;
        Ok(self.params.clone())
    }

    fn set_parameters(&mut self, params: &ParameterSet) -> Result<(), CameraError> {
        self.ensure_open()?;
        self.spec.check(params)?;
        self.params = params.clone();
        self.journal.update(|p| {
            p.flushes += 1;
            p.last_parameters = Some(params.clone());
        });
        Ok(())
    }

    fn set_display_orientation(&mut self, degrees: u32) -> Result<(), CameraError> {
        self.ensure_open()?;
        if degrees % 90 != 0 || degrees >= 360 {
            return Err(CameraError::InvalidParameter(format!(
                "invalid display orientation {}",
                degrees
            )));
        }
        self.journal.update(|p| p.display_orientation = Some(degrees));
        Ok(())
    }

    fn set_preview_target(&mut self, surface_id: u64) -> Result<(), CameraError> {
        self.ensure_open()?;
        self.journal.update(|p| p.preview_target = Some(surface_id));
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        self.ensure_open()?;
        self.set_streaming(true);
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), CameraError> {
        self.ensure_open()?;
        if !self.streaming {
            return Err(CameraError::HardwareFault("preview is not running".into()));
        }
        self.set_streaming(false);
        Ok(())
    }

    fn cancel_auto_focus(&mut self) -> Result<(), CameraError> {
        self.ensure_open()
    }

    fn auto_focus(&mut self, callback: AutoFocusCallback) -> Result<(), CameraError> {
        self.ensure_open()?;
        let delay = self.spec.focus_delay;
        let locks = self
            .params
            .focus_mode
            .as_ref()
            .is_some_and(|mode| !matches!(mode, FocusMode::Fixed | FocusMode::Infinity));

        thread::Builder::new()
            .name("virtual-focus".into())
            .spawn(move || {
                thread::sleep(delay);
                callback(locks);
            })
            .map_err(|e| CameraError::HardwareFault(format!("failed to spawn focus thread: {}", e)))?;
        Ok(())
    }

    fn take_picture(&mut self, callback: PictureCallback) -> Result<(), CameraError> {
        self.ensure_open()?;
        if !self.streaming {
            return Err(CameraError::HardwareFault("capture requires an active preview".into()));
        }
        let size = self.params.picture_size;
        self.set_streaming(false);
        self.journal.update(|p| p.captures += 1);

        thread::Builder::new()
            .name("virtual-shutter".into())
            .spawn(move || callback(frames::color_bars(size.width, size.height)))
            .map_err(|e| CameraError::HardwareFault(format!("failed to spawn shutter thread: {}", e)))?;
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.streaming = false;
        self.journal.update(|p| {
            p.releases += 1;
            p.streaming = false;
        });
        self.in_use.store(false, Ordering::SeqCst);
        log::debug!("virtual camera released");
    }
}

impl Drop for VirtualCamera {
    fn drop(&mut self) {
        self.release();
    }
}
