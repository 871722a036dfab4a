use serde::{Deserialize, Serialize};

/// Physical device orientation, bucketed to the nearest quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeviceOrientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl DeviceOrientation {
    /// Bucket a raw sensor angle.
    ///
    /// ```text
    /// [315, 360) ∪ [0, 45) → 0
    /// [45, 135)            → 90
    /// [135, 225)           → 180
    /// [225, 315)           → 270
    /// ```
    ///
    /// Angles of 360 and above wrap. A negative angle means the sensor cannot
    /// tell (device lying flat) and yields `None`.
    pub fn from_angle(angle: i32) -> Option<Self> {
        if angle < 0 {
            return None;
        }
        let orientation = match angle % 360 {
            45..=134 => Self::Deg90,
            135..=224 => Self::Deg180,
            225..=314 => Self::Deg270,
            _ => Self::Deg0,
        };
        Some(orientation)
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

/// Rotation of the display (window/surface), independent of device tilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayRotation {
    #[default]
    Rotation0,
    Rotation90,
    Rotation180,
    Rotation270,
}

impl DisplayRotation {
    pub fn degrees(&self) -> u32 {
        match self {
            Self::Rotation0 => 0,
            Self::Rotation90 => 90,
            Self::Rotation180 => 180,
            Self::Rotation270 => 270,
        }
    }

    /// Quarter-turn index as reported by display servers (0..=3).
    pub fn from_quarter_turns(turns: u32) -> Self {
        match turns % 4 {
            1 => Self::Rotation90,
            2 => Self::Rotation180,
            3 => Self::Rotation270,
            _ => Self::Rotation0,
        }
    }
}

impl std::fmt::Display for DisplayRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

impl std::fmt::Display for DeviceOrientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// A single reading from an orientation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationEvent {
    /// Raw sensor angle in degrees; negative when unknown.
    SensorAngle(i32),
    DisplayRotation(DisplayRotation),
}
