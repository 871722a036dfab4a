use crate::models::camera_info::CameraMountInfo;
use crate::models::error::CameraError;
use crate::models::parameters::ParameterSet;

/// Invoked once when an autofocus cycle ends. `true` if focus locked.
pub type AutoFocusCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Invoked once with the raw still-image buffer.
pub type PictureCallback = Box<dyn FnOnce(Vec<u8>) + Send + 'static>;

/// Entry point to the camera hardware.
///
/// `open` may block for a long time and is always called from the session's
/// background worker, never from the serialized context.
pub trait CameraBackend: Send + Sync + 'static {
    type Handle: CameraHandle;

    /// Open the camera at `index`. At most one handle may be live at a time;
    /// implementations return `ResourceUnavailable` while another is open.
    fn open(&self, index: u32) -> Result<Self::Handle, CameraError>;
}

/// An exclusive, opened camera device.
///
/// Only the capture session holds a handle, wrapped in `ExclusiveCamera` so
/// that it is released exactly once.
pub trait CameraHandle: Send + 'static {
    /// Facing and sensor mount angle. Fixed for the lifetime of the handle.
    fn mount_info(&self) -> CameraMountInfo;

    /// Current parameters, including the capability lists.
    fn parameters(&self) -> Result<ParameterSet, CameraError>;

    /// Apply every field of `params` in a single write.
    fn set_parameters(&mut self, params: &ParameterSet) -> Result<(), CameraError>;

    /// Rotation of the on-screen preview, in degrees. Does not affect stills.
    fn set_display_orientation(&mut self, degrees: u32) -> Result<(), CameraError>;

    /// Bind the preview stream to the host's surface.
    fn set_preview_target(&mut self, surface_id: u64) -> Result<(), CameraError>;

    fn start_preview(&mut self) -> Result<(), CameraError>;

    /// Fails when no preview is streaming.
    fn stop_preview(&mut self) -> Result<(), CameraError>;

    fn cancel_auto_focus(&mut self) -> Result<(), CameraError>;

    /// Start an autofocus cycle; `callback` fires on a hardware thread.
    fn auto_focus(&mut self, callback: AutoFocusCallback) -> Result<(), CameraError>;

    /// Capture a still; `callback` fires on a hardware thread with the raw buffer.
    /// Streaming stops for the capture and must be restarted by the caller.
    fn take_picture(&mut self, callback: PictureCallback) -> Result<(), CameraError>;

    /// Give the device back to the system.
    fn release(&mut self);
}
