use serde::{Deserialize, Serialize};

use super::error::CameraError;
use super::geometry::Size;

/// A still image as delivered by the hardware, plus what we know about it.
///
/// `data` is the raw buffer from the capture callback, untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPicture {
    pub data: Vec<u8>,
    pub metadata: PictureMetadata,
}

/// Serializable description of a captured still.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PictureMetadata {
    pub id: String,
    pub taken_at: String,
    pub width: u32,
    pub height: u32,
    /// Rotation tag that was flushed for this capture, in degrees.
    pub rotation: u32,
}

impl PictureMetadata {
    pub fn new(size: Size, rotation: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            taken_at: chrono::Utc::now().to_rfc3339(),
            width: size.width,
            height: size.height,
            rotation,
        }
    }

    pub fn to_json(&self) -> Result<String, CameraError> {
        serde_json::to_string(self)
            .map_err(|e| CameraError::Unknown(format!("failed to serialize picture metadata: {}", e)))
    }
}
