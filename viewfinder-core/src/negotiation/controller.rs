use crate::models::camera_info::CameraMountInfo;
use crate::models::error::CameraError;
use crate::models::geometry::{AspectRatio, Size};
use crate::models::orientation::{DeviceOrientation, DisplayRotation};
use crate::models::parameters::{FlashMode, FocusArea, FocusMode, ParameterSet};
use crate::models::status::CaptureStatus;
use crate::traits::camera_device::CameraHandle;

/// Negotiates rotation, focus, sizes, zoom and flash for one open camera.
///
/// Setters stage values in an in-memory `ParameterSet`; nothing reaches the
/// hardware until `flush_to` writes the whole set. The only exception is
/// `set_display_rotation`, which drives the preview orientation directly.
///
/// ```text
/// controller.set_rotation(o).set_auto_focus(true).set_preview_size(edge, ratio);
/// controller.flush_to(&mut handle)?;
/// ```
#[derive(Debug, Clone)]
pub struct CameraController {
    mount: CameraMountInfo,
    params: ParameterSet,
}

impl CameraController {
    pub fn new(mount: CameraMountInfo, params: ParameterSet) -> Self {
        Self { mount, params }
    }

    pub fn mount_info(&self) -> CameraMountInfo {
        self.mount
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    // --- Rotation ---

    /// Preview orientation the handle needs for the given display rotation.
    ///
    /// Front-facing sensors are mirrored, so the compensation runs the other way.
    pub fn display_orientation_for(&self, rotation: DisplayRotation) -> u32 {
        let degrees = rotation.degrees();
        let mount = self.mount.orientation;
        if self.mount.is_front() {
            (360 - (mount + degrees) % 360) % 360
        } else {
            (mount + 360 - degrees) % 360
        }
    }

    /// Apply the preview orientation for `rotation` to the handle immediately.
    ///
    /// Returns the angle that was applied.
    pub fn set_display_rotation<H: CameraHandle + ?Sized>(
        &self,
        handle: &mut H,
        rotation: DisplayRotation,
    ) -> Result<u32, CameraError> {
        let degrees = self.display_orientation_for(rotation);
        handle.set_display_orientation(degrees)?;
        log::debug!("display rotation {} → preview orientation {}", rotation, degrees);
        Ok(degrees)
    }

    /// Stage the still-image rotation tag for the given device orientation.
    pub fn set_rotation(&mut self, orientation: DeviceOrientation) -> &mut Self {
        let degrees = orientation.degrees();
        let mount = self.mount.orientation;
        self.params.rotation = if self.mount.is_front() {
            (mount + 360 - degrees) % 360
        } else {
            (mount + degrees) % 360
        };
        self
    }

    // --- Capability selection ---

    /// Stage the best focus mode.
    ///
    /// Preference: continuous-picture (only if `enable`), fixed, infinity, then
    /// whatever the device lists first. A device reporting no modes keeps its
    /// current one.
    pub fn set_auto_focus(&mut self, enable: bool) -> &mut Self {
        let modes = &self.params.supported_focus_modes;
        let chosen = if enable && modes.contains(&FocusMode::ContinuousPicture) {
            Some(FocusMode::ContinuousPicture)
        } else if modes.contains(&FocusMode::Fixed) {
            Some(FocusMode::Fixed)
        } else if modes.contains(&FocusMode::Infinity) {
            Some(FocusMode::Infinity)
        } else {
            modes.first().cloned()
        };
        if let Some(mode) = chosen {
            self.params.focus_mode = Some(mode);
        }
        self
    }

    /// Stage the supported preview size closest to `min_edge` with exactly `ratio`.
    pub fn set_preview_size(&mut self, min_edge: u32, ratio: AspectRatio) -> &mut Self {
        if let Some(size) = closest_size(&self.params.supported_preview_sizes, min_edge, ratio) {
            self.params.preview_size = size;
        } else {
            log::debug!("no preview size matches {}, keeping {}", ratio, self.params.preview_size);
        }
        self
    }

    /// Stage the supported picture size closest to `min_edge` with exactly `ratio`.
    pub fn set_picture_size(&mut self, min_edge: u32, ratio: AspectRatio) -> &mut Self {
        if let Some(size) = closest_size(&self.params.supported_picture_sizes, min_edge, ratio) {
            self.params.picture_size = size;
        } else {
            log::debug!("no picture size matches {}, keeping {}", ratio, self.params.picture_size);
        }
        self
    }

    /// Stage a zoom level. Rejects anything outside `[0, max_zoom]`.
    pub fn set_zoom(&mut self, level: i32) -> Result<&mut Self, CameraError> {
        let zoom = u32::try_from(level)
            .ok()
            .filter(|zoom| *zoom <= self.params.max_zoom)
            .ok_or_else(|| {
                CameraError::InvalidParameter(format!(
                    "zoom {} outside [0, {}]",
                    level, self.params.max_zoom
                ))
            })?;
        self.params.zoom = zoom;
        Ok(self)
    }

    pub fn set_flash(&mut self, on: bool) -> &mut Self {
        self.params.flash_mode = if on { FlashMode::On } else { FlashMode::Off };
        self
    }

    pub fn set_focus_area(&mut self, area: Option<FocusArea>) -> &mut Self {
        self.params.focus_area = area;
        self
    }

    /// Write every staged field to the handle in one call.
    ///
    /// Must come last in any configuration sequence; staged changes are
    /// otherwise invisible to the hardware.
    pub fn flush_to<H: CameraHandle + ?Sized>(&self, handle: &mut H) -> Result<(), CameraError> {
        handle.set_parameters(&self.params)
    }

    /// Stage changes with `stage`, then flush.
    ///
    /// On any failure the staged set is restored, so it never holds values
    /// the handle did not accept.
    pub fn apply_to<H, F>(&mut self, handle: &mut H, stage: F) -> Result<(), CameraError>
    where
        H: CameraHandle + ?Sized,
        F: FnOnce(&mut Self) -> Result<(), CameraError>,
    {
        let snapshot = self.params.clone();
        let result = stage(self).and_then(|()| self.flush_to(handle));
        if result.is_err() {
            self.params = snapshot;
        }
        result
    }

    // --- Queries ---

    pub fn min_zoom(&self) -> u32 {
        0
    }

    pub fn max_zoom(&self) -> u32 {
        self.params.max_zoom
    }

    pub fn current_zoom(&self) -> u32 {
        self.params.zoom
    }

    pub fn is_flash_on(&self) -> bool {
        self.params.flash_mode == FlashMode::On
    }

    /// True iff the active focus mode is a continuous one.
    pub fn is_auto_focus(&self) -> bool {
        self.params
            .focus_mode
            .as_ref()
            .is_some_and(FocusMode::is_continuous)
    }

    pub fn status(&self) -> CaptureStatus {
        CaptureStatus {
            min_zoom: self.min_zoom(),
            max_zoom: self.max_zoom(),
            current_zoom: self.current_zoom(),
            flash_on: self.is_flash_on(),
        }
    }
}

/// Among sizes matching `ratio` exactly, the one whose shorter edge is nearest
/// to `min_edge`. The first one wins a tie.
fn closest_size(sizes: &[Size], min_edge: u32, ratio: AspectRatio) -> Option<Size> {
    sizes
        .iter()
        .filter(|size| ratio.matches(size.width, size.height))
        .min_by_key(|size| min_edge.abs_diff(size.min_edge()))
        .copied()
}
