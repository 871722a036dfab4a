pub mod camera_device;
pub mod focus_mapper;
pub mod orientation_provider;
pub mod preview_surface;
pub mod session_delegate;
