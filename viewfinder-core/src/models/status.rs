use serde::{Deserialize, Serialize};

use super::error::CameraError;

/// Snapshot of the zoom/flash state, handed to the host once per open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureStatus {
    pub min_zoom: u32,
    pub max_zoom: u32,
    pub current_zoom: u32,
    pub flash_on: bool,
}

impl CaptureStatus {
    /// Whether `level` lies in `[min_zoom, max_zoom]`.
    pub fn accepts_zoom(&self, level: i32) -> bool {
        i64::from(level) >= i64::from(self.min_zoom) && i64::from(level) <= i64::from(self.max_zoom)
    }

    pub fn to_json(&self) -> Result<String, CameraError> {
        serde_json::to_string(self)
            .map_err(|e| CameraError::Unknown(format!("failed to serialize status: {}", e)))
    }
}
