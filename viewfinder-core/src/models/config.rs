use serde::{Deserialize, Serialize};

use super::geometry::AspectRatio;

/// Configuration for a capture session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfiguration {
    /// Index of the pre-selected physical camera (default: 0).
    pub camera_index: u32,

    /// Ratio both preview and picture sizes must match exactly (default: 4:3).
    pub aspect_ratio: AspectRatio,

    /// Picture size whose shorter edge is closest to this wins (default: 1280).
    pub min_picture_edge: u32,

    /// Prefer continuous autofocus when the device supports it (default: true).
    pub auto_focus: bool,
}

impl SessionConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_picture_edge == 0 {
            return Err("minimum picture edge must be positive".into());
        }
        if self.aspect_ratio.width() == 0 || self.aspect_ratio.height() == 0 {
            return Err(format!("invalid aspect ratio: {}", self.aspect_ratio));
        }
        Ok(())
    }
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            camera_index: 0,
            aspect_ratio: AspectRatio::FOUR_THREE,
            min_picture_edge: 1280,
            auto_focus: true,
        }
    }
}
