use thiserror::Error;

/// Errors that can occur while negotiating with or driving the camera.
///
/// Only `ResourceUnavailable` (open failed) and `InvalidParameter` are ever
/// surfaced to the host as failures of an operation; hardware faults at
/// best-effort call sites are logged and swallowed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("hardware fault: {0}")]
    HardwareFault(String),

    #[error("camera is not open")]
    NotOpen,

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl CameraError {
    /// Whether this error is a transient fault that best-effort call sites swallow.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::HardwareFault(_))
    }
}
