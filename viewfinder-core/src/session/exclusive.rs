use crate::traits::camera_device::CameraHandle;

/// Sole owner of an opened camera handle.
///
/// Move-only. The handle is released exactly once, either by `close` or when
/// the wrapper is dropped, so an open result that nobody wants (e.g. it
/// arrived after `stop()`) still gives the device back.
pub struct ExclusiveCamera<H: CameraHandle> {
    handle: H,
    released: bool,
}

impl<H: CameraHandle> ExclusiveCamera<H> {
    pub fn new(handle: H) -> Self {
        Self {
            handle,
            released: false,
        }
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut H {
        &mut self.handle
    }

    /// Release the device now.
    pub fn close(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.handle.release();
        }
    }
}

impl<H: CameraHandle> Drop for ExclusiveCamera<H> {
    fn drop(&mut self) {
        self.release_once();
    }
}
