//! # Scene Camera
//!
//! A viewpoint described by a position plus azimuth/elevation angles in degrees.
//!
//! ## Camera Types
//!
//! - **Orbiting** - the camera circles the world origin. Rotations are applied before
//!   the translation, so the position stays fixed while the angles swing the world
//!   around the viewer.
//! - **Tracking** - the camera moves through the world. The translation comes first and
//!   the position is re-derived from the resulting matrix after every update.
//!
//! The camera keeps its world matrix in [`Camera::matrix`]; the view transform handed
//! to [`Transforms`](crate::gfx::transforms::Transforms) is its inverse.

use std::{fmt, str::FromStr};

use cgmath::{Deg, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero};
use serde::{Deserialize, Serialize};

use super::camera_utils::wrap_degrees;
use crate::error::CameraError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CameraType {
    #[default]
    #[serde(alias = "ORBITING_TYPE")]
    Orbiting,
    #[serde(alias = "TRACKING_TYPE")]
    Tracking,
}

impl FromStr for CameraType {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ORBITING" | "ORBITING_TYPE" => Ok(CameraType::Orbiting),
            "TRACKING" | "TRACKING_TYPE" => Ok(CameraType::Tracking),
            _ => Err(CameraError::UnsupportedType(s.to_string())),
        }
    }
}

impl fmt::Display for CameraType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraType::Orbiting => write!(f, "ORBITING_TYPE"),
            CameraType::Tracking => write!(f, "TRACKING_TYPE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vector3<f32>,
    pub focus: Vector3<f32>,
    pub home: Vector3<f32>,
    pub up: Vector3<f32>,
    pub right: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub matrix: Matrix4<f32>,
    /// Last value passed to [`Camera::dolly`].
    pub steps: f32,
    pub azimuth: f32,
    pub elevation: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub min_z: f32,
    pub max_z: f32,
    kind: CameraType,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraType::default())
    }
}

impl Camera {
    pub fn new(kind: CameraType) -> Self {
        Self {
            position: Vector3::zero(),
            focus: Vector3::zero(),
            home: Vector3::zero(),
            up: Vector3::zero(),
            right: Vector3::zero(),
            normal: Vector3::zero(),
            matrix: Matrix4::identity(),
            steps: 0.0,
            azimuth: 0.0,
            elevation: 0.0,
            fov: 45.0,
            min_z: 0.1,
            max_z: 10000.0,
            kind,
        }
    }

    pub fn kind(&self) -> CameraType {
        self.kind
    }

    pub fn is_orbiting(&self) -> bool {
        self.kind == CameraType::Orbiting
    }

    pub fn is_tracking(&self) -> bool {
        self.kind == CameraType::Tracking
    }

    pub fn set_type(&mut self, kind: CameraType) {
        self.kind = kind;
    }

    /// Switches type by name; unknown names are logged and ignored.
    pub fn set_type_by_name(&mut self, name: &str) {
        match name.parse::<CameraType>() {
            Ok(kind) => self.set_type(kind),
            Err(e) => log::error!("{}", e),
        }
    }

    /// Moves the camera back to `home` (optionally replacing it) and resets its angles.
    pub fn go_home(&mut self, home: Option<Vector3<f32>>) {
        if let Some(home) = home {
            self.home = home;
        }

        self.set_position(self.home);
        self.set_azimuth(0.0);
        self.set_elevation(0.0);
    }

    /// Moves the camera by the difference between `step_value` and the previous step.
    ///
    /// Tracking cameras move along their normal; orbiting cameras move along world z.
    pub fn dolly(&mut self, step_value: f32) {
        let step = step_value - self.steps;

        let new_position = if self.is_tracking() {
            let normal = if self.normal.magnitude2() > 0.0 {
                self.normal.normalize()
            } else {
                Vector3::zero()
            };
            self.position - normal * step
        } else {
            Vector3::new(self.position.x, self.position.y, self.position.z - step)
        };

        self.steps = step_value;
        self.set_position(new_position);
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
        self.update();
    }

    pub fn set_focus(&mut self, focus: Vector3<f32>) {
        self.focus = focus;
        self.update();
    }

    pub fn set_azimuth(&mut self, azimuth: f32) {
        self.change_azimuth(azimuth - self.azimuth);
    }

    pub fn change_azimuth(&mut self, delta: f32) {
        self.azimuth = wrap_degrees(self.azimuth + delta);
        self.update();
    }

    pub fn set_elevation(&mut self, elevation: f32) {
        self.change_elevation(elevation - self.elevation);
    }

    pub fn change_elevation(&mut self, delta: f32) {
        self.elevation = wrap_degrees(self.elevation + delta);
        self.update();
    }

    /// Rebuilds the world matrix and orientation basis from position and angles.
    pub fn update(&mut self) {
        let translation = Matrix4::from_translation(self.position);
        let azimuth = Matrix4::from_angle_y(Deg(self.azimuth));
        let elevation = Matrix4::from_angle_x(Deg(self.elevation));

        self.matrix = match self.kind {
            CameraType::Tracking => translation * azimuth * elevation,
            CameraType::Orbiting => azimuth * elevation * translation,
        };

        // Orbiting cameras keep their position as given
        if self.is_tracking() {
            self.position = (self.matrix * Vector4::new(0.0, 0.0, 0.0, 1.0)).truncate();
        }

        self.calculate_orientation();
    }

    fn calculate_orientation(&mut self) {
        self.right = (self.matrix * Vector4::unit_x()).truncate();
        self.up = (self.matrix * Vector4::unit_y()).truncate();
        self.normal = (self.matrix * Vector4::unit_z()).truncate();
    }

    /// Inverse of the camera matrix.
    pub fn view_transform(&self) -> Matrix4<f32> {
        self.matrix.invert().unwrap_or_else(|| {
            log::warn!("camera matrix is not invertible, using identity view");
            Matrix4::identity()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn assert_matrix_eq(a: Matrix4<f32>, b: Matrix4<f32>) {
        for col in 0..4 {
            for row in 0..4 {
                assert!(
                    (a[col][row] - b[col][row]).abs() < EPSILON,
                    "matrices differ at [{}][{}]: {:?} vs {:?}",
                    col,
                    row,
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_defaults() {
        let camera = Camera::default();
        assert!(camera.is_orbiting());
        assert_eq!(camera.fov, 45.0);
        assert_eq!(camera.min_z, 0.1);
        assert_eq!(camera.max_z, 10000.0);
    }

    #[test]
    fn test_azimuth_wraps_by_truncation() {
        let mut camera = Camera::new(CameraType::Orbiting);
        camera.set_azimuth(370.0);
        assert!((camera.azimuth - 10.0).abs() < EPSILON);

        camera.set_azimuth(-400.0);
        assert!((camera.azimuth + 40.0).abs() < EPSILON);

        let mut camera = Camera::new(CameraType::Orbiting);
        camera.change_azimuth(400.0);
        assert!((camera.azimuth - 40.0).abs() < EPSILON);
    }

    #[test]
    fn test_elevation_wraps_by_truncation() {
        let mut camera = Camera::new(CameraType::Tracking);
        camera.change_elevation(-370.0);
        assert!((camera.elevation + 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_orbiting_home_view_translation() {
        let mut camera = Camera::new(CameraType::Orbiting);
        camera.go_home(Some(Vector3::new(0.0, 0.0, 10.0)));

        let view = camera.view_transform();
        assert!((view.w.x).abs() < EPSILON);
        assert!((view.w.y).abs() < EPSILON);
        assert!((view.w.z + 10.0).abs() < EPSILON);
        assert_eq!(camera.azimuth, 0.0);
        assert_eq!(camera.elevation, 0.0);
    }

    #[test]
    fn test_view_transform_inverts_matrix() {
        let mut camera = Camera::new(CameraType::Tracking);
        camera.go_home(Some(Vector3::new(3.0, -2.0, 15.0)));
        camera.change_azimuth(33.0);
        camera.change_elevation(-12.5);

        assert_matrix_eq(camera.matrix * camera.view_transform(), Matrix4::identity());
        assert_matrix_eq(camera.view_transform().invert().unwrap(), camera.matrix);
    }

    #[test]
    fn test_orbiting_keeps_position() {
        let mut camera = Camera::new(CameraType::Orbiting);
        camera.set_position(Vector3::new(0.0, 0.0, 10.0));
        camera.change_azimuth(90.0);
        assert_eq!(camera.position, Vector3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn test_orientation_basis() {
        let mut camera = Camera::new(CameraType::Tracking);
        camera.set_position(Vector3::new(0.0, 0.0, 5.0));
        assert!((camera.normal - Vector3::unit_z()).magnitude() < EPSILON);
        assert!((camera.right - Vector3::unit_x()).magnitude() < EPSILON);

        camera.change_azimuth(90.0);
        // Ry(90) maps +z onto +x
        assert!((camera.normal - Vector3::unit_x()).magnitude() < EPSILON);
        assert!((camera.up - Vector3::unit_y()).magnitude() < EPSILON);
    }

    #[test]
    fn test_dolly() {
        let mut camera = Camera::new(CameraType::Orbiting);
        camera.go_home(Some(Vector3::new(0.0, 0.0, 10.0)));
        camera.dolly(2.0);
        assert!((camera.position.z - 8.0).abs() < EPSILON);
        camera.dolly(3.0);
        assert!((camera.position.z - 7.0).abs() < EPSILON);
        assert_eq!(camera.steps, 3.0);

        let mut camera = Camera::new(CameraType::Tracking);
        camera.go_home(Some(Vector3::new(0.0, 0.0, 10.0)));
        camera.change_azimuth(90.0);
        camera.dolly(2.0);
        assert!((camera.position - Vector3::new(-2.0, 0.0, 10.0)).magnitude() < EPSILON);
    }

    #[test]
    fn test_camera_type_names() {
        assert_eq!("ORBITING_TYPE".parse(), Ok(CameraType::Orbiting));
        assert_eq!("tracking".parse(), Ok(CameraType::Tracking));
        assert_eq!(
            "FLYING".parse::<CameraType>(),
            Err(CameraError::UnsupportedType("FLYING".into()))
        );

        let mut camera = Camera::new(CameraType::Tracking);
        camera.set_type_by_name("FLYING");
        assert!(camera.is_tracking());
        camera.set_type_by_name("ORBITING_TYPE");
        assert!(camera.is_orbiting());
    }
}
