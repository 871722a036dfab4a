use crate::models::parameters::FocusArea;

/// Maps a tap on the preview surface to a focus region.
///
/// There is no built-in mapping: the coordinate system of `FocusArea` is
/// device-specific. Without a mapper installed, taps are ignored.
pub trait FocusMapper: Send + Sync {
    /// `x`/`y` are surface-local; `surface` is the surface size in pixels.
    /// Returning `None` clears any focus area.
    fn focus_area(&self, x: f32, y: f32, surface: (u32, u32)) -> Option<FocusArea>;
}
