//! # viewfinder-core
//!
//! Platform-agnostic camera core library.
//!
//! Negotiates preview and picture parameters against what a device reports,
//! tracks device and display orientation, and runs the open / preview /
//! capture lifecycle as an explicit state machine on a serialized context.
//! Platform backends implement `CameraBackend` and `CameraHandle` and plug
//! into the generic `CaptureSession`.
//!
//! ## Architecture
//!
//! ```text
//! viewfinder-core (this crate)
//! ├── traits/       ← CameraBackend, CameraHandle, SessionDelegate, OrientationProvider, PreviewSurface
//! ├── models/       ← CameraError, SessionState, SessionConfiguration, AspectRatio, ParameterSet, etc.
//! ├── negotiation/  ← CameraController (rotation, size, focus, zoom, flash)
//! ├── orientation/  ← OrientationWatcher (sensor and display rotation, debounced)
//! └── session/      ← CaptureSession (generic orchestrator), ExclusiveCamera
//! ```

pub mod models;
pub mod negotiation;
pub mod orientation;
pub mod session;
pub mod traits;

#[cfg(test)]
mod mock;

// Re-export key types at crate root for convenience.
pub use models::camera_info::{CameraFacing, CameraMountInfo};
pub use models::config::SessionConfiguration;
pub use models::error::CameraError;
pub use models::geometry::{AspectRatio, Size};
pub use models::orientation::{DeviceOrientation, DisplayRotation, OrientationEvent};
pub use models::parameters::{FlashMode, FocusArea, FocusMode, ParameterSet};
pub use models::picture::{CapturedPicture, PictureMetadata};
pub use models::state::SessionState;
pub use models::status::CaptureStatus;
pub use negotiation::controller::CameraController;
pub use orientation::watcher::OrientationWatcher;
pub use session::capture_session::CaptureSession;
pub use session::exclusive::ExclusiveCamera;
pub use traits::camera_device::{AutoFocusCallback, CameraBackend, CameraHandle, PictureCallback};
pub use traits::focus_mapper::FocusMapper;
pub use traits::orientation_provider::{OrientationCallback, OrientationProvider};
pub use traits::preview_surface::{PreviewSurface, SurfaceEvent};
pub use traits::session_delegate::SessionDelegate;
