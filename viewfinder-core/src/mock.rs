//! Mock camera implementation for testing without hardware.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{mpsc, Arc};

use parking_lot::{Mutex, MutexGuard};

use crate::models::camera_info::CameraMountInfo;
use crate::models::error::CameraError;
use crate::models::geometry::Size;
use crate::models::orientation::{DisplayRotation, OrientationEvent};
use crate::models::parameters::{FocusMode, ParameterSet};
use crate::traits::camera_device::{AutoFocusCallback, CameraBackend, CameraHandle, PictureCallback};
use crate::traits::orientation_provider::{OrientationCallback, OrientationProvider};
use crate::traits::preview_surface::PreviewSurface;

/// Everything a mock handle observed, plus knobs to inject failures.
#[derive(Default)]
pub struct MockJournal {
    pub opens: u32,
    pub releases: u32,
    pub flushes: u32,
    pub params: ParameterSet,
    pub display_orientation: Option<u32>,
    pub preview_target: Option<u64>,
    pub streaming: bool,
    pub start_preview_calls: u32,
    pub stop_preview_calls: u32,
    pub cancel_auto_focus_calls: u32,
    pub auto_focus_calls: u32,
    pub pictures_requested: u32,

    pub fail_set_parameters: bool,
    pub fail_auto_focus: bool,
    pub fail_take_picture: bool,
    /// Keep hardware callbacks pending instead of firing them immediately.
    pub hold_callbacks: bool,
    pub pending_focus: Option<AutoFocusCallback>,
    pub pending_picture: Option<PictureCallback>,
}

impl MockJournal {
    /// Total hardware calls that touch the device after open.
    pub fn hardware_calls(&self) -> u32 {
        self.flushes
            + self.start_preview_calls
            + self.stop_preview_calls
            + self.cancel_auto_focus_calls
            + self.auto_focus_calls
            + self.pictures_requested
    }
}

pub fn default_params() -> ParameterSet {
    ParameterSet {
        supported_preview_sizes: vec![
            Size::new(1920, 1080),
            Size::new(640, 480),
            Size::new(800, 600),
            Size::new(1280, 960),
        ],
        supported_picture_sizes: vec![Size::new(1280, 960), Size::new(1600, 1200), Size::new(4000, 3000)],
        supported_focus_modes: vec![FocusMode::Auto, FocusMode::ContinuousPicture, FocusMode::Fixed],
        max_zoom: 10,
        preview_size: Size::new(1920, 1080),
        picture_size: Size::new(4000, 3000),
        focus_mode: Some(FocusMode::Auto),
        ..Default::default()
    }
}

pub const PICTURE_BYTES: &[u8] = &[0xFF, 0xD8, 0x01, 0x02];

/// Mock camera handle. All observations go to a shared journal.
pub struct MockHandle {
    mount: CameraMountInfo,
    journal: Arc<Mutex<MockJournal>>,
    in_use: Arc<AtomicBool>,
}

impl MockHandle {
    pub fn new(mount: CameraMountInfo, params: ParameterSet) -> Self {
        let journal = MockJournal {
            params,
            ..Default::default()
        };
        Self {
            mount,
            journal: Arc::new(Mutex::new(journal)),
            in_use: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn journal(&self) -> MutexGuard<'_, MockJournal> {
        self.journal.lock()
    }

    pub fn journal_arc(&self) -> Arc<Mutex<MockJournal>> {
        Arc::clone(&self.journal)
    }

    pub fn fail_set_parameters(&mut self) {
        self.journal.lock().fail_set_parameters = true;
    }
}

impl CameraHandle for MockHandle {
    fn mount_info(&self) -> CameraMountInfo {
        self.mount
    }

    fn parameters(&self) -> Result<ParameterSet, CameraError> {
        Ok(self.journal.lock().params.clone())
    }

    fn set_parameters(&mut self, params: &ParameterSet) -> Result<(), CameraError> {
        let mut journal = self.journal.lock();
        if journal.fail_set_parameters {
            return Err(CameraError::HardwareFault("setParameters failed".into()));
        }
        journal.params = params.clone();
        journal.flushes += 1;
        Ok(())
    }

    fn set_display_orientation(&mut self, degrees: u32) -> Result<(), CameraError> {
        self.journal.lock().display_orientation = Some(degrees);
        Ok(())
    }

    fn set_preview_target(&mut self, surface_id: u64) -> Result<(), CameraError> {
        self.journal.lock().preview_target = Some(surface_id);
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        let mut journal = self.journal.lock();
        journal.start_preview_calls += 1;
        journal.streaming = true;
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), CameraError> {
        let mut journal = self.journal.lock();
        journal.stop_preview_calls += 1;
        if !journal.streaming {
            return Err(CameraError::HardwareFault("preview not running".into()));
        }
        journal.streaming = false;
        Ok(())
    }

    fn cancel_auto_focus(&mut self) -> Result<(), CameraError> {
        self.journal.lock().cancel_auto_focus_calls += 1;
        Ok(())
    }

    fn auto_focus(&mut self, callback: AutoFocusCallback) -> Result<(), CameraError> {
        let mut journal = self.journal.lock();
        journal.auto_focus_calls += 1;
        if journal.fail_auto_focus {
            return Err(CameraError::HardwareFault("autoFocus failed".into()));
        }
        if journal.hold_callbacks {
            journal.pending_focus = Some(callback);
            return Ok(());
        }
        drop(journal);
        callback(true);
        Ok(())
    }

    fn take_picture(&mut self, callback: PictureCallback) -> Result<(), CameraError> {
        let mut journal = self.journal.lock();
        journal.pictures_requested += 1;
        if journal.fail_take_picture {
            return Err(CameraError::HardwareFault("takePicture failed".into()));
        }
        journal.streaming = false;
        if journal.hold_callbacks {
            journal.pending_picture = Some(callback);
            return Ok(());
        }
        drop(journal);
        callback(PICTURE_BYTES.to_vec());
        Ok(())
    }

    fn release(&mut self) {
        let mut journal = self.journal.lock();
        journal.releases += 1;
        journal.streaming = false;
        self.in_use.store(false, Ordering::SeqCst);
    }
}

/// Mock backend handing out `MockHandle`s that share one journal.
pub struct MockBackend {
    mount: CameraMountInfo,
    journal: Arc<Mutex<MockJournal>>,
    in_use: Arc<AtomicBool>,
    fail_open: AtomicBool,
    gate: Mutex<Option<mpsc::Receiver<()>>>,
    last_index: AtomicU32,
}

impl MockBackend {
    pub fn new(mount: CameraMountInfo) -> Self {
        let journal = MockJournal {
            params: default_params(),
            ..Default::default()
        };
        Self {
            mount,
            journal: Arc::new(Mutex::new(journal)),
            in_use: Arc::new(AtomicBool::new(false)),
            fail_open: AtomicBool::new(false),
            gate: Mutex::new(None),
            last_index: AtomicU32::new(u32::MAX),
        }
    }

    pub fn journal(&self) -> MutexGuard<'_, MockJournal> {
        self.journal.lock()
    }

    pub fn shared_journal(&self) -> Arc<Mutex<MockJournal>> {
        Arc::clone(&self.journal)
    }

    pub fn fail_next_open(&self) {
        self.fail_open.store(true, Ordering::SeqCst);
    }

    /// Make the next `open` block until the returned sender fires.
    pub fn hold_open(&self) -> mpsc::Sender<()> {
        let (tx, rx) = mpsc::channel();
        *self.gate.lock() = Some(rx);
        tx
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use.load(Ordering::SeqCst)
    }

    pub fn last_index(&self) -> u32 {
        self.last_index.load(Ordering::SeqCst)
    }
}

impl CameraBackend for MockBackend {
    type Handle = MockHandle;

    fn open(&self, index: u32) -> Result<MockHandle, CameraError> {
        let gate = self.gate.lock().take();
        if let Some(gate) = gate {
            let _ = gate.recv();
        }
        self.last_index.store(index, Ordering::SeqCst);
        if self.fail_open.swap(false, Ordering::SeqCst) {
            return Err(CameraError::ResourceUnavailable("mock open failure".into()));
        }
        if self.in_use.swap(true, Ordering::SeqCst) {
            return Err(CameraError::ResourceUnavailable("camera in use".into()));
        }
        self.journal.lock().opens += 1;
        Ok(MockHandle {
            mount: self.mount,
            journal: Arc::clone(&self.journal),
            in_use: Arc::clone(&self.in_use),
        })
    }
}

/// Orientation source driven by the test.
#[derive(Default)]
pub struct MockOrientation {
    display: Mutex<DisplayRotation>,
    angle: Mutex<Option<i32>>,
    callback: Mutex<Option<OrientationCallback>>,
    pub starts: AtomicU32,
    pub stops: AtomicU32,
}

impl MockOrientation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_angle(angle: i32) -> Self {
        let provider = Self::default();
        *provider.angle.lock() = Some(angle);
        provider
    }

    pub fn is_started(&self) -> bool {
        self.callback.lock().is_some()
    }

    pub fn tilt(&self, angle: i32) {
        *self.angle.lock() = Some(angle);
        self.emit(OrientationEvent::SensorAngle(angle));
    }

    pub fn rotate_display(&self, rotation: DisplayRotation) {
        *self.display.lock() = rotation;
        self.emit(OrientationEvent::DisplayRotation(rotation));
    }

    fn emit(&self, event: OrientationEvent) {
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }
}

impl OrientationProvider for MockOrientation {
    fn display_rotation(&self) -> DisplayRotation {
        *self.display.lock()
    }

    fn sensor_angle(&self) -> Option<i32> {
        *self.angle.lock()
    }

    fn start(&self, callback: OrientationCallback) -> Result<(), CameraError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        *self.callback.lock() = Some(callback);
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        *self.callback.lock() = None;
    }
}

/// Surface whose existence and size the test controls.
pub struct MockSurface {
    size: Mutex<Option<(u32, u32)>>,
}

impl MockSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Mutex::new(Some((width, height))),
        }
    }

    pub fn absent() -> Self {
        Self {
            size: Mutex::new(None),
        }
    }

    pub fn resize(&self, width: u32, height: u32) {
        *self.size.lock() = Some((width, height));
    }

    pub fn destroy(&self) {
        *self.size.lock() = None;
    }
}

impl PreviewSurface for MockSurface {
    fn exists(&self) -> bool {
        self.size.lock().is_some()
    }

    fn dimensions(&self) -> (u32, u32) {
        self.size.lock().unwrap_or((0, 0))
    }

    fn surface_id(&self) -> u64 {
        7
    }
}
