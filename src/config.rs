//! Runtime configuration loaded from JSON.
//!
//! Every field has a default, so `{}` is a valid config and a file only needs to
//! name what it changes:
//!
//! ```json
//! {
//!   "window": { "title": "Camera Types", "width": 1024 },
//!   "camera": { "kind": "TRACKING", "home": [0.0, 2.0, 50.0], "elevation": -10.0 },
//!   "logging": { "filter": "rtgl=debug,wgpu=warn" }
//! }
//! ```

use std::path::Path;

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    gfx::{
        camera::{Camera, CameraType, Controls},
        transforms::ProjectionMode,
    },
    logging::LoggingConfig,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "rtgl".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub kind: CameraType,
    pub home: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub min_z: f32,
    pub max_z: f32,
    pub azimuth: f32,
    pub elevation: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            kind: CameraType::Orbiting,
            home: [0.0, 0.0, 10.0],
            fov: 45.0,
            min_z: 0.1,
            max_z: 10000.0,
            azimuth: 0.0,
            elevation: 0.0,
        }
    }
}

impl CameraConfig {
    /// Builds a camera at its home position with these settings applied.
    pub fn build(&self) -> Camera {
        let mut camera = Camera::new(self.kind);
        camera.fov = self.fov;
        camera.min_z = self.min_z;
        camera.max_z = self.max_z;
        camera.go_home(Some(Vector3::from(self.home)));
        camera.set_azimuth(self.azimuth);
        camera.set_elevation(self.elevation);
        camera
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub motion_factor: f32,
    pub key_increment: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        let controls = Controls::default();
        Self {
            motion_factor: controls.motion_factor,
            key_increment: controls.key_increment,
        }
    }
}

impl ControlsConfig {
    pub fn build(&self) -> Controls {
        Controls::new(self.motion_factor, self.key_increment)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub window: WindowConfig,
    pub clear_color: [f32; 4],
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub projection: ProjectionMode,
    pub logging: LoggingConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            clear_color: [0.9, 0.9, 0.9, 1.0],
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            projection: ProjectionMode::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = RuntimeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = RuntimeConfig::from_json_str(
            r#"{
                "window": { "title": "Camera Types" },
                "camera": { "kind": "TRACKING_TYPE", "home": [0.0, 2.0, 50.0] },
                "projection": "orthographic",
                "logging": { "filter": "warn" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.window.title, "Camera Types");
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.camera.kind, CameraType::Tracking);
        assert_eq!(config.camera.fov, 45.0);
        assert_eq!(config.projection, ProjectionMode::Orthographic);
        assert_eq!(config.logging.filter.as_deref(), Some("warn"));
        assert_eq!(config.controls, ControlsConfig::default());
    }

    #[test]
    fn test_camera_config_builds_camera() {
        let config = CameraConfig {
            home: [0.0, 0.0, 20.0],
            azimuth: 370.0,
            fov: 60.0,
            ..CameraConfig::default()
        };
        let camera = config.build();
        assert_eq!(camera.home, Vector3::new(0.0, 0.0, 20.0));
        assert_eq!(camera.azimuth, 10.0);
        assert_eq!(camera.fov, 60.0);
        assert!(camera.is_orbiting());
    }

    #[test]
    fn test_invalid_json() {
        let result = RuntimeConfig::from_json_str(r#"{ "camera": { "kind": "FLYING" } }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir().join("rtgl_config_test.json");
        std::fs::write(&path, r#"{ "clear_color": [0.0, 0.0, 0.0, 1.0] }"#).unwrap();
        let config = RuntimeConfig::from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.clear_color, [0.0, 0.0, 0.0, 1.0]);

        let missing = RuntimeConfig::from_path("/nonexistent/rtgl.json");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
