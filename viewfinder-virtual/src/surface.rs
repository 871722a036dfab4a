//! Simulated preview surface.

use parking_lot::Mutex;

use viewfinder_core::traits::preview_surface::{PreviewSurface, SurfaceEvent};

/// A drawable whose lifecycle the host drives.
///
/// Each mutator returns the event to forward to the session.
pub struct VirtualSurface {
    id: u64,
    size: Mutex<Option<(u32, u32)>>,
}

impl VirtualSurface {
    /// A surface that does not exist yet.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            size: Mutex::new(None),
        }
    }

    /// A surface that already exists at the given size.
    pub fn with_size(id: u64, width: u32, height: u32) -> Self {
        Self {
            id,
            size: Mutex::new(Some((width, height))),
        }
    }

    pub fn create(&self, width: u32, height: u32) -> SurfaceEvent {
        *self.size.lock() = Some((width, height));
        SurfaceEvent::Created
    }

    pub fn resize(&self, width: u32, height: u32) -> SurfaceEvent {
        *self.size.lock() = Some((width, height));
        SurfaceEvent::Changed
    }

    pub fn destroy(&self) -> SurfaceEvent {
        *self.size.lock() = None;
        SurfaceEvent::Destroyed
    }
}

impl PreviewSurface for VirtualSurface {
    fn exists(&self) -> bool {
        self.size.lock().is_some()
    }

    fn dimensions(&self) -> (u32, u32) {
        self.size.lock().unwrap_or((0, 0))
    }

    fn surface_id(&self) -> u64 {
        self.id
    }
}
