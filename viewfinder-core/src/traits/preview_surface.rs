/// The drawable surface the host provides for the preview stream.
pub trait PreviewSurface: Send + Sync {
    /// Whether the surface currently exists. Preview setup is skipped until it does.
    fn exists(&self) -> bool;

    /// Width and height in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Opaque identifier handed to the camera as preview target.
    fn surface_id(&self) -> u64;
}

/// Surface lifecycle notifications forwarded by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Created,
    Changed,
    Destroyed,
}
