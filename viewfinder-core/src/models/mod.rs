pub mod camera_info;
pub mod config;
pub mod error;
pub mod geometry;
pub mod orientation;
pub mod parameters;
pub mod picture;
pub mod state;
pub mod status;
