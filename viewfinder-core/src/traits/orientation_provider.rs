use std::sync::Arc;

use crate::models::error::CameraError;
use crate::models::orientation::{DisplayRotation, OrientationEvent};

/// Callback invoked for every raw orientation reading.
pub type OrientationCallback = Arc<dyn Fn(OrientationEvent) + Send + Sync + 'static>;

/// Source of physical tilt and display rotation readings.
///
/// Readings are delivered on whatever thread the platform uses; the
/// `OrientationWatcher` debounces them.
pub trait OrientationProvider: Send + Sync {
    /// Current display rotation.
    fn display_rotation(&self) -> DisplayRotation;

    /// Last raw sensor angle, or `None` if none has been read yet.
    fn sensor_angle(&self) -> Option<i32>;

    /// Start delivering readings to `callback`.
    fn start(&self, callback: OrientationCallback) -> Result<(), CameraError>;

    /// Stop delivering readings and drop the callback.
    fn stop(&self);
}
