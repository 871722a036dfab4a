use serde::{Deserialize, Serialize};

use super::error::CameraError;

/// A width:height proportion, e.g. 4:3.
///
/// Both components are always positive. Comparisons are done by exact integer
/// cross-multiplication, never with a floating tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAspectRatio", into = "RawAspectRatio")]
pub struct AspectRatio {
    width: u32,
    height: u32,
}

impl AspectRatio {
    pub const FOUR_THREE: Self = Self { width: 4, height: 3 };
    pub const SIXTEEN_NINE: Self = Self { width: 16, height: 9 };

    pub fn new(width: u32, height: u32) -> Result<Self, CameraError> {
        if width == 0 || height == 0 {
            return Err(CameraError::InvalidParameter(format!(
                "aspect ratio components must be positive, got {}:{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Swap the components: 4:3 becomes 3:4.
    pub fn inverse(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Whether this ratio is wider than a `width`×`height` box, i.e. the box is
    /// the thinner of the two: `self.w / self.h > width / height`.
    pub fn thinner_than(&self, width: u32, height: u32) -> bool {
        u64::from(self.width) * u64::from(height) > u64::from(self.height) * u64::from(width)
    }

    /// Whether a concrete `width`×`height` size has exactly this ratio.
    pub fn matches(&self, width: u32, height: u32) -> bool {
        u64::from(width) * u64::from(self.height) == u64::from(height) * u64::from(self.width)
    }

    /// Width that keeps this ratio for the given height.
    pub fn calc_real_width(&self, height: u32) -> u32 {
        let width = u64::from(height) * u64::from(self.width) / u64::from(self.height);
        u32::try_from(width).unwrap_or(u32::MAX)
    }

    /// Height that keeps this ratio for the given width.
    pub fn calc_real_height(&self, width: u32) -> u32 {
        let height = u64::from(width) * u64::from(self.height) / u64::from(self.width);
        u32::try_from(height).unwrap_or(u32::MAX)
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::FOUR_THREE
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

#[derive(Serialize, Deserialize)]
struct RawAspectRatio {
    width: u32,
    height: u32,
}

impl TryFrom<RawAspectRatio> for AspectRatio {
    type Error = CameraError;

    fn try_from(raw: RawAspectRatio) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height)
    }
}

impl From<AspectRatio> for RawAspectRatio {
    fn from(ratio: AspectRatio) -> Self {
        Self {
            width: ratio.width,
            height: ratio.height,
        }
    }
}

/// A concrete pixel size reported by the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The shorter of the two edges.
    pub fn min_edge(&self) -> u32 {
        self.width.min(self.height)
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
