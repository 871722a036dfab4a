use crate::models::error::CameraError;
use crate::models::picture::CapturedPicture;
use crate::models::state::SessionState;
use crate::models::status::CaptureStatus;

/// Event delegate for capture session notifications.
///
/// All methods are called on the session's serialized context thread, in the
/// order the events happened. Implementations should marshal to the UI thread
/// if needed and must not block.
pub trait SessionDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: &SessionState);

    /// Called once per successful open, after the first preview setup.
    fn on_camera_opened(&self, status: &CaptureStatus);

    /// Called when the hardware could not be opened. The session stays closed.
    fn on_camera_open_failed(&self, error: &CameraError);

    /// Called with the raw still image after streaming has been restarted.
    fn on_picture_taken(&self, picture: &CapturedPicture);

    /// Called once when an open (or opening) session is stopped.
    fn on_camera_closed(&self);

    /// Called for rejected requests detected on the serialized context.
    fn on_error(&self, error: &CameraError);
}
