//! Simulated orientation sensor and display.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use viewfinder_core::models::error::CameraError;
use viewfinder_core::models::orientation::{DisplayRotation, OrientationEvent};
use viewfinder_core::traits::orientation_provider::{OrientationCallback, OrientationProvider};

/// Orientation readings pushed by the host or a test.
///
/// Readings are delivered synchronously on the caller's thread while a
/// listener is registered, and dropped otherwise.
pub struct VirtualOrientationProvider {
    display: Mutex<DisplayRotation>,
    angle: Mutex<Option<i32>>,
    listener: Mutex<Option<OrientationCallback>>,
    available: AtomicBool,
}

impl Default for VirtualOrientationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualOrientationProvider {
    /// Device held upright in its natural orientation.
    pub fn new() -> Self {
        Self {
            display: Mutex::new(DisplayRotation::Rotation0),
            angle: Mutex::new(Some(0)),
            listener: Mutex::new(None),
            available: AtomicBool::new(true),
        }
    }

    /// A device without a tilt sensor: `start` fails.
    pub fn unavailable() -> Self {
        let provider = Self::new();
        *provider.angle.lock() = None;
        provider.available.store(false, Ordering::SeqCst);
        provider
    }

    pub fn is_listening(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// Report a physical tilt in degrees.
    pub fn tilt(&self, angle: i32) {
        *self.angle.lock() = Some(angle);
        self.emit(OrientationEvent::SensorAngle(angle));
    }

    /// Report that the device is lying flat and the tilt is unknown.
    pub fn lay_flat(&self) {
        *self.angle.lock() = None;
        self.emit(OrientationEvent::SensorAngle(-1));
    }

    pub fn rotate_display(&self, rotation: DisplayRotation) {
        *self.display.lock() = rotation;
        self.emit(OrientationEvent::DisplayRotation(rotation));
    }

    fn emit(&self, event: OrientationEvent) {
        // Clone out so the listener runs without the lock held.
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener(event);
        }
    }
}

impl OrientationProvider for VirtualOrientationProvider {
    fn display_rotation(&self) -> DisplayRotation {
        *self.display.lock()
    }

    fn sensor_angle(&self) -> Option<i32> {
        *self.angle.lock()
    }

    fn start(&self, callback: OrientationCallback) -> Result<(), CameraError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(CameraError::HardwareFault("no orientation sensor".into()));
        }
        *self.listener.lock() = Some(callback);
        Ok(())
    }

    fn stop(&self) {
        *self.listener.lock() = None;
    }
}
