//! Per-object draw loop shared by every demo.
//!
//! Each visible object is drawn with the camera's view as its base model-view, moved
//! by its own position and scale. The shaded pass uploads the material colours; the
//! picking pass draws into the picker's off-screen target with each object's picking
//! colour and skips objects that have none.

use crate::{
    error::BackendError,
    gfx::{
        backend::{ColorUniform, RenderBackend, RenderTargetHandle},
        camera::Camera,
        scene::{Object, Scene},
        transforms::Transforms,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPass {
    /// Regular pass into the window surface.
    Shaded,
    /// Flat picking colours into an off-screen target.
    Picking(RenderTargetHandle),
}

/// Draws `scene` in render order. Returns the number of draw calls issued.
pub fn render_scene<B: RenderBackend>(
    backend: &mut B,
    scene: &Scene,
    camera: &Camera,
    transforms: &mut Transforms,
    pass: DrawPass,
) -> Result<usize, BackendError> {
    let target = match pass {
        DrawPass::Shaded => None,
        DrawPass::Picking(target) => Some(target),
    };
    backend.bind_render_target(target)?;

    let mut draws = 0;
    for object in scene.objects().iter().filter(|object| object.visible) {
        let Some(call) = object.draw_call() else {
            continue;
        };

        match pass {
            DrawPass::Shaded => upload_material(backend, object),
            DrawPass::Picking(_) => match object.picking_color {
                Some(color) => backend.set_uniform_color(ColorUniform::PickingColor, color),
                None => continue,
            },
        }

        transforms.calculate_model_view(camera);
        transforms.push();
        if let Some(position) = object.position {
            transforms.translate(position);
        }
        if let Some(scale) = object.scale {
            transforms.scale(scale);
        }
        transforms.set_matrix_uniforms(backend);

        let result = backend.draw(&call);
        transforms.pop();
        result?;
        draws += 1;
    }

    if target.is_some() {
        backend.bind_render_target(None)?;
    }

    Ok(draws)
}

fn upload_material<B: RenderBackend>(backend: &mut B, object: &Object) {
    let material = &object.material;
    backend.set_uniform_color(ColorUniform::MaterialDiffuse, material.diffuse);
    backend.set_uniform_color(ColorUniform::MaterialAmbient, material.ambient);
    backend.set_uniform_color(ColorUniform::MaterialSpecular, material.specular);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        backend::{MatrixUniform, Primitive, RecordingBackend, ShaderInterface},
        camera::CameraType,
        geometry::{axis, cube},
        scene::ObjectOverrides,
    };
    use cgmath::{Matrix4, Vector3};

    fn setup() -> (RecordingBackend, Scene, Camera, Transforms) {
        let mut backend = RecordingBackend::new();
        let mut scene = Scene::new(ShaderInterface::all());

        scene.add(axis(10.0), None, &mut backend).unwrap();
        let overrides = ObjectOverrides::new()
            .position([0.0, 0.0, -5.0])
            .picking_color([0.0, 1.0, 0.0, 1.0])
            .diffuse([0.3, 0.3, 0.3, 1.0]);
        scene.add(cube("box"), Some(&overrides), &mut backend).unwrap();

        let mut camera = Camera::new(CameraType::Orbiting);
        camera.go_home(Some(Vector3::new(0.0, 0.0, 20.0)));
        let transforms = Transforms::new(&camera, 640, 480);

        backend.clear_commands();
        (backend, scene, camera, transforms)
    }

    #[test]
    fn test_shaded_pass_draws_in_order() {
        let (mut backend, scene, camera, mut transforms) = setup();
        let draws = render_scene(&mut backend, &scene, &camera, &mut transforms, DrawPass::Shaded)
            .unwrap();
        assert_eq!(draws, 2);

        let calls = backend.draws();
        assert_eq!(calls[0].0.primitive, Primitive::Lines);
        assert_eq!(calls[1].0.primitive, Primitive::Triangles);
        assert_eq!(calls[1].0.index_count, 36);
        assert!(calls.iter().all(|(_, target)| target.is_none()));

        // Last object drawn: the translated box
        let expected =
            camera.view_transform() * Matrix4::from_translation(Vector3::new(0.0, 0.0, -5.0));
        assert_eq!(backend.matrix(MatrixUniform::ModelView), Some(expected));
        assert_eq!(
            backend.color(ColorUniform::MaterialDiffuse),
            Some([0.3, 0.3, 0.3, 1.0])
        );
        assert_eq!(transforms.stack_depth(), 0);
    }

    #[test]
    fn test_picking_pass_uses_offscreen_target() {
        let (mut backend, scene, camera, mut transforms) = setup();
        let target = backend.create_render_target(64, 48).unwrap();

        let draws = render_scene(
            &mut backend,
            &scene,
            &camera,
            &mut transforms,
            DrawPass::Picking(target),
        )
        .unwrap();

        // The axis has no picking colour
        assert_eq!(draws, 1);
        assert_eq!(backend.draws()[0].1, Some(target));
        assert_eq!(
            backend.color(ColorUniform::PickingColor),
            Some([0.0, 1.0, 0.0, 1.0])
        );
        assert_eq!(backend.bound_target(), None);
    }

    #[test]
    fn test_hidden_objects_are_skipped() {
        let (mut backend, mut scene, camera, mut transforms) = setup();
        scene.get_mut("axis").unwrap().visible = false;

        let draws = render_scene(&mut backend, &scene, &camera, &mut transforms, DrawPass::Shaded)
            .unwrap();
        assert_eq!(draws, 1);
    }
}
