use serde::{Deserialize, Serialize};

/// Which side of the device the sensor faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    Front,
    Back,
}

/// Immutable per-device facts, fetched once when the handle is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraMountInfo {
    pub facing: CameraFacing,
    /// Clockwise rotation of the sensor relative to the device's natural
    /// orientation, in degrees (0, 90, 180 or 270).
    pub orientation: u32,
}

impl CameraMountInfo {
    pub fn back(orientation: u32) -> Self {
        Self {
            facing: CameraFacing::Back,
            orientation: orientation % 360,
        }
    }

    pub fn front(orientation: u32) -> Self {
        Self {
            facing: CameraFacing::Front,
            orientation: orientation % 360,
        }
    }

    pub fn is_front(&self) -> bool {
        self.facing == CameraFacing::Front
    }
}
