use serde::{Deserialize, Serialize};

use super::geometry::Size;

/// Focus modes a camera may report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FocusMode {
    Auto,
    ContinuousPicture,
    ContinuousVideo,
    Fixed,
    Infinity,
    Macro,
    Edof,
    /// A vendor-specific mode, kept by name.
    Other(String),
}

impl FocusMode {
    /// The driver-level name of this mode.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => "auto",
            Self::ContinuousPicture => "continuous-picture",
            Self::ContinuousVideo => "continuous-video",
            Self::Fixed => "fixed",
            Self::Infinity => "infinity",
            Self::Macro => "macro",
            Self::Edof => "edof",
            Self::Other(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "auto" => Self::Auto,
            "continuous-picture" => Self::ContinuousPicture,
            "continuous-video" => Self::ContinuousVideo,
            "fixed" => Self::Fixed,
            "infinity" => Self::Infinity,
            "macro" => Self::Macro,
            "edof" => Self::Edof,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether the hardware keeps refocusing on its own in this mode.
    pub fn is_continuous(&self) -> bool {
        self.as_str().contains("continuous")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    #[default]
    Off,
    On,
    Auto,
    Torch,
}

/// A focus/metering region in driver coordinates.
///
/// The mapping from surface taps to this region is supplied by a
/// `FocusMapper`; nothing in the core assumes a coordinate convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusArea {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub weight: u32,
}

/// The configuration bound to an open camera handle.
///
/// Holds both what the hardware supports (read once from the handle) and the
/// values staged for the next flush. Writes here have no effect until the set
/// is flushed to the handle in one call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterSet {
    pub supported_preview_sizes: Vec<Size>,
    pub supported_picture_sizes: Vec<Size>,
    pub supported_focus_modes: Vec<FocusMode>,
    pub max_zoom: u32,

    pub preview_size: Size,
    pub picture_size: Size,
    pub focus_mode: Option<FocusMode>,
    /// Rotation tag applied to still images, in degrees.
    pub rotation: u32,
    pub zoom: u32,
    pub flash_mode: FlashMode,
    pub focus_area: Option<FocusArea>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_mode_names_round_trip() {
        for mode in [
            FocusMode::Auto,
            FocusMode::ContinuousPicture,
            FocusMode::ContinuousVideo,
            FocusMode::Fixed,
            FocusMode::Infinity,
            FocusMode::Macro,
            FocusMode::Edof,
        ] {
            assert_eq!(FocusMode::from_name(mode.as_str()), mode);
        }
        assert_eq!(
            FocusMode::from_name("manual-lens"),
            FocusMode::Other("manual-lens".into())
        );
    }

    #[test]
    fn continuous_detection_is_by_name() {
        assert!(FocusMode::ContinuousPicture.is_continuous());
        assert!(FocusMode::ContinuousVideo.is_continuous());
        assert!(FocusMode::Other("vendor-continuous-af".into()).is_continuous());
        assert!(!FocusMode::Auto.is_continuous());
        assert!(!FocusMode::Fixed.is_continuous());
    }
}
