//! # Transforms
//!
//! Model-view, projection and normal matrices for one frame, plus a stack for saving
//! and restoring the model-view matrix around per-object changes.
//!
//! A typical draw loop:
//!
//! ```no_run
//! # use rtgl::gfx::{backend::RecordingBackend, camera::Camera, transforms::Transforms};
//! # let mut backend = RecordingBackend::new();
//! let camera = Camera::default();
//! let mut transforms = Transforms::new(&camera, 800, 600);
//!
//! transforms.calculate_model_view(&camera);
//! transforms.push();
//! transforms.translate(cgmath::Vector3::new(0.0, 0.0, -5.0));
//! transforms.set_matrix_uniforms(&mut backend);
//! // draw ...
//! transforms.pop();
//! ```

use cgmath::{Deg, Matrix, Matrix4, SquareMatrix, Vector3};
use serde::{Deserialize, Serialize};

use crate::gfx::{
    backend::{MatrixUniform, RenderBackend},
    camera::Camera,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    #[default]
    Perspective,
    /// Orthographic box scaled by the camera's field of view.
    Orthographic,
}

#[derive(Debug, Clone)]
pub struct Transforms {
    pub model_view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub normal: Matrix4<f32>,
    stack: Vec<Matrix4<f32>>,
    width: u32,
    height: u32,
    mode: ProjectionMode,
}

impl Transforms {
    /// Creates the matrices for `camera` and a `width` x `height` viewport.
    pub fn new(camera: &Camera, width: u32, height: u32) -> Self {
        let mut transforms = Self {
            model_view: Matrix4::identity(),
            projection: Matrix4::identity(),
            normal: Matrix4::identity(),
            stack: Vec::new(),
            width,
            height,
            mode: ProjectionMode::default(),
        };

        transforms.calculate_model_view(camera);
        transforms.update_perspective(camera);
        transforms.calculate_normal();
        transforms
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn projection_mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.mode = mode;
    }

    /// Resets the model-view matrix to the camera's view transform.
    pub fn calculate_model_view(&mut self, camera: &Camera) {
        self.model_view = camera.view_transform();
    }

    /// Normal matrix: transpose of the inverse model-view.
    pub fn calculate_normal(&mut self) {
        match self.model_view.invert() {
            Some(inverse) => self.normal = inverse.transpose(),
            None => log::warn!("model-view matrix is singular, keeping previous normal matrix"),
        }
    }

    /// Rebuilds the projection from the camera and current viewport.
    pub fn update_perspective(&mut self, camera: &Camera) {
        let width = self.width.max(1) as f32;
        let height = self.height.max(1) as f32;

        self.projection = match self.mode {
            ProjectionMode::Perspective => {
                cgmath::perspective(Deg(camera.fov), width / height, camera.min_z, camera.max_z)
            }
            ProjectionMode::Orthographic => {
                let fov = if camera.fov == 0.0 { 1.0 } else { camera.fov };
                cgmath::ortho(
                    -width / fov,
                    width / fov,
                    -height / fov,
                    height / fov,
                    -camera.max_z,
                    camera.max_z,
                )
            }
        };
    }

    /// Uploads model-view, projection and a freshly computed normal matrix.
    pub fn set_matrix_uniforms<B: RenderBackend>(&mut self, backend: &mut B) {
        self.calculate_normal();
        backend.set_uniform_matrix(MatrixUniform::ModelView, &self.model_view);
        backend.set_uniform_matrix(MatrixUniform::Projection, &self.projection);
        backend.set_uniform_matrix(MatrixUniform::Normal, &self.normal);
    }

    /// Saves a copy of the model-view matrix.
    pub fn push(&mut self) {
        self.stack.push(self.model_view);
    }

    /// Restores the last saved model-view matrix; `None` when nothing was saved.
    pub fn pop(&mut self) -> Option<Matrix4<f32>> {
        let matrix = self.stack.pop()?;
        self.model_view = matrix;
        Some(matrix)
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        self.model_view = self.model_view * Matrix4::from_translation(offset);
    }

    pub fn rotate_x(&mut self, degrees: f32) {
        self.model_view = self.model_view * Matrix4::from_angle_x(Deg(degrees));
    }

    pub fn rotate_y(&mut self, degrees: f32) {
        self.model_view = self.model_view * Matrix4::from_angle_y(Deg(degrees));
    }

    pub fn rotate_z(&mut self, degrees: f32) {
        self.model_view = self.model_view * Matrix4::from_angle_z(Deg(degrees));
    }

    pub fn scale(&mut self, factors: Vector3<f32>) {
        self.model_view =
            self.model_view * Matrix4::from_nonuniform_scale(factors.x, factors.y, factors.z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{backend::RecordingBackend, camera::CameraType};

    fn camera_at(z: f32) -> Camera {
        let mut camera = Camera::new(CameraType::Orbiting);
        camera.go_home(Some(Vector3::new(0.0, 0.0, z)));
        camera
    }

    #[test]
    fn test_model_view_follows_camera() {
        let camera = camera_at(10.0);
        let transforms = Transforms::new(&camera, 800, 600);
        assert_eq!(transforms.model_view, camera.view_transform());
        assert!((transforms.model_view.w.z + 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_push_mutate_pop_restores() {
        let camera = camera_at(10.0);
        let mut transforms = Transforms::new(&camera, 800, 600);
        let saved = transforms.model_view;

        transforms.push();
        transforms.translate(Vector3::new(1.0, 2.0, 3.0));
        transforms.rotate_y(45.0);
        transforms.scale(Vector3::new(2.0, 2.0, 2.0));
        assert_ne!(transforms.model_view, saved);

        assert_eq!(transforms.pop(), Some(saved));
        assert_eq!(transforms.model_view, saved);
        assert_eq!(transforms.stack_depth(), 0);
    }

    #[test]
    fn test_pop_on_empty_stack() {
        let camera = camera_at(5.0);
        let mut transforms = Transforms::new(&camera, 800, 600);
        transforms.translate(Vector3::new(1.0, 0.0, 0.0));
        let current = transforms.model_view;

        assert_eq!(transforms.pop(), None);
        assert_eq!(transforms.model_view, current);
    }

    #[test]
    fn test_normal_matrix_is_inverse_transpose() {
        let camera = camera_at(10.0);
        let mut transforms = Transforms::new(&camera, 800, 600);
        transforms.scale(Vector3::new(2.0, 1.0, 1.0));
        transforms.calculate_normal();

        let expected = transforms.model_view.invert().unwrap().transpose();
        assert_eq!(transforms.normal, expected);
    }

    #[test]
    fn test_singular_model_view_keeps_normal() {
        let camera = camera_at(10.0);
        let mut transforms = Transforms::new(&camera, 800, 600);
        let previous = transforms.normal;

        transforms.scale(Vector3::new(0.0, 1.0, 1.0));
        transforms.calculate_normal();
        assert_eq!(transforms.normal, previous);
    }

    #[test]
    fn test_set_matrix_uniforms_uploads_all_three() {
        let camera = camera_at(10.0);
        let mut transforms = Transforms::new(&camera, 800, 600);
        let mut backend = RecordingBackend::new();

        transforms.translate(Vector3::new(0.0, 1.0, 0.0));
        transforms.set_matrix_uniforms(&mut backend);

        assert_eq!(backend.matrix(MatrixUniform::ModelView), Some(transforms.model_view));
        assert_eq!(backend.matrix(MatrixUniform::Projection), Some(transforms.projection));
        assert_eq!(
            backend.matrix(MatrixUniform::Normal),
            Some(transforms.model_view.invert().unwrap().transpose())
        );
    }

    #[test]
    fn test_projection_modes() {
        let camera = camera_at(10.0);
        let mut transforms = Transforms::new(&camera, 800, 600);
        let expected = cgmath::perspective(Deg(45.0), 800.0 / 600.0, 0.1, 10000.0);
        assert_eq!(transforms.projection, expected);

        transforms.set_projection_mode(ProjectionMode::Orthographic);
        transforms.set_viewport(450, 900);
        transforms.update_perspective(&camera);
        let expected = cgmath::ortho(-10.0, 10.0, -20.0, 20.0, -10000.0, 10000.0);
        assert_eq!(transforms.projection, expected);
    }
}
