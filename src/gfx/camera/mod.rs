pub mod camera_controller;
pub mod camera_utils;
pub mod scene_camera;

// Re-export main types
pub use camera_controller::{Controls, PickContext};
pub use scene_camera::{Camera, CameraType};
