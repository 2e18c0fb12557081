//! # Object Picking System
//!
//! Colour-coded picking. Every pickable object carries a unique picking colour; a
//! second render pass draws each object flat in that colour into an off-screen
//! target, and a click reads back the pixel under the cursor to find which object
//! it belongs to.
//!
//! ## How it works
//!
//! 1. [`Picker::configure`] allocates the off-screen colour + depth target
//! 2. the picking pass of [`render_scene`](crate::gfx::render::render_scene) draws
//!    into [`Picker::target`] every frame
//! 3. [`Picker::find`] reads one pixel and toggles the matching object in the
//!    picked list, notifying the [`PickHandler`]
//! 4. [`Picker::stop`] hands the picked list to the handler and clears it
//!
//! Objects are matched in render order, and aliases in the excluded list (the floor
//! grid by default) are never picked.

use crate::{
    error::BackendError,
    gfx::{
        backend::{RenderBackend, RenderTargetHandle},
        geometry::FLOOR_ALIAS,
        scene::{Object, ObjectId, Scene},
    },
};

/// Hooks invoked while picking.
///
/// Hits are reported by [`ObjectId`], so objects sharing an alias stay distinct;
/// resolve them with [`Scene::get_by_id_mut`] to modify the objects.
pub trait PickHandler {
    /// Colour an object is drawn with in the picking pass, if it is pickable.
    fn hit_property(&self, object: &Object) -> Option<[f32; 4]> {
        object.picking_color
    }

    fn on_add_hit(&mut self, _object: &mut Object) {}

    fn on_remove_hit(&mut self, _object: &mut Object) {}

    fn on_process_hits(&mut self, _scene: &mut Scene, _hits: &[ObjectId]) {}

    /// Called for mouse motion while a pick is held.
    fn on_move(&mut self, _scene: &mut Scene, _hits: &[ObjectId], _dx: f32, _dy: f32) {}
}

/// Handler that paints picked objects in their picking colour and restores the
/// original diffuse colour when they are unpicked or the pick is released.
#[derive(Debug, Default, Clone, Copy)]
pub struct HighlightHandler;

impl PickHandler for HighlightHandler {
    fn on_add_hit(&mut self, object: &mut Object) {
        object.previous_diffuse = Some(object.material.diffuse);
        if let Some(color) = object.picking_color {
            object.material.diffuse = color;
        }
    }

    fn on_remove_hit(&mut self, object: &mut Object) {
        restore_diffuse(object);
    }

    fn on_process_hits(&mut self, scene: &mut Scene, hits: &[ObjectId]) {
        for id in hits {
            if let Some(object) = scene.get_by_id_mut(*id) {
                restore_diffuse(object);
            }
        }
    }
}

fn restore_diffuse(object: &mut Object) {
    if let Some(previous) = object.previous_diffuse.take() {
        object.material.diffuse = previous;
    }
}

#[derive(Debug, Clone)]
pub struct Picker {
    target: Option<RenderTargetHandle>,
    picked: Vec<ObjectId>,
    excluded: Vec<String>,
}

impl Default for Picker {
    fn default() -> Self {
        Self::new()
    }
}

impl Picker {
    pub fn new() -> Self {
        Self {
            target: None,
            picked: Vec::new(),
            excluded: vec![FLOOR_ALIAS.to_string()],
        }
    }

    /// Replaces the aliases that are never picked.
    pub fn with_excluded<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Off-screen target the picking pass renders into.
    pub fn target(&self) -> Option<RenderTargetHandle> {
        self.target
    }

    /// Allocates the off-screen target at the given size.
    pub fn configure<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        width: u32,
        height: u32,
    ) -> Result<(), BackendError> {
        self.target = Some(backend.create_render_target(width, height)?);
        Ok(())
    }

    /// Resizes the off-screen target, allocating it first if needed.
    pub fn update<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        width: u32,
        height: u32,
    ) -> Result<(), BackendError> {
        match self.target {
            Some(target) => backend.resize_render_target(target, width, height),
            None => self.configure(backend, width, height),
        }
    }

    /// Whether a read-back pixel matches a colour, allowing one step per channel.
    pub fn compare(readout: [u8; 4], color: [f32; 4]) -> bool {
        (0..3).all(|i| ((color[i] * 255.0).round() - readout[i] as f32).abs() <= 1.0)
    }

    /// Picks at window coordinates (top-left origin).
    ///
    /// The first object whose hit colour matches the pixel is toggled in the picked
    /// list. Returns whether anything matched.
    pub fn find<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        scene: &mut Scene,
        handler: &mut dyn PickHandler,
        x: u32,
        y: u32,
    ) -> Result<bool, BackendError> {
        let Some(target) = self.target else {
            log::warn!("picker used before configure");
            return Ok(false);
        };

        let readout = backend.read_pixel(target, x, y)?;

        let picked = &mut self.picked;
        let excluded = &self.excluded;

        let found = scene.traverse_mut(|object, _| {
            if excluded.contains(&object.alias) {
                return None;
            }

            let property = handler.hit_property(object)?;
            if !Self::compare(readout, property) {
                return None;
            }

            match picked.iter().position(|id| *id == object.id()) {
                Some(index) => {
                    picked.remove(index);
                    handler.on_remove_hit(object);
                }
                None => {
                    picked.push(object.id());
                    handler.on_add_hit(object);
                }
            }
            Some(())
        });

        Ok(found.is_some())
    }

    /// Hands the picked list to the handler, then clears it.
    pub fn stop(&mut self, scene: &mut Scene, handler: &mut dyn PickHandler) {
        if !self.picked.is_empty() {
            handler.on_process_hits(scene, &self.picked);
        }
        self.picked.clear();
    }

    /// Ids of the currently picked objects, in pick order.
    pub fn hits(&self) -> &[ObjectId] {
        &self.picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        backend::{RecordingBackend, ShaderInterface},
        geometry::floor,
        scene::{GeometryDesc, ObjectOverrides},
    };

    #[derive(Default)]
    struct CountingHandler {
        added: Vec<String>,
        removed: Vec<String>,
        processed: Vec<Vec<ObjectId>>,
    }

    impl PickHandler for CountingHandler {
        fn on_add_hit(&mut self, object: &mut Object) {
            self.added.push(object.alias.clone());
        }

        fn on_remove_hit(&mut self, object: &mut Object) {
            self.removed.push(object.alias.clone());
        }

        fn on_process_hits(&mut self, _scene: &mut Scene, hits: &[ObjectId]) {
            self.processed.push(hits.to_vec());
        }
    }

    fn triangle(alias: &str) -> GeometryDesc {
        GeometryDesc::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, 2])
            .with_alias(alias)
    }

    fn setup() -> (RecordingBackend, Scene, Picker) {
        let mut backend = RecordingBackend::new();
        let mut scene = Scene::new(ShaderInterface::all());

        let red = ObjectOverrides::new().picking_color([1.0, 0.0, 0.0, 1.0]);
        let green = ObjectOverrides::new().picking_color([0.0, 0.5, 0.0, 1.0]);
        scene.add(triangle("red"), Some(&red), &mut backend).unwrap();
        scene.add(triangle("green"), Some(&green), &mut backend).unwrap();

        let mut picker = Picker::new();
        picker.configure(&mut backend, 4, 4).unwrap();
        (backend, scene, picker)
    }

    #[test]
    fn test_compare_tolerance() {
        assert!(Picker::compare([255, 0, 0, 255], [1.0, 0.0, 0.0, 1.0]));
        assert!(Picker::compare([254, 1, 0, 0], [1.0, 0.0, 0.0, 1.0]));
        assert!(!Picker::compare([253, 0, 0, 255], [1.0, 0.0, 0.0, 1.0]));
        // 0.5 * 255 rounds to 128
        assert!(Picker::compare([127, 127, 129, 0], [0.5, 0.5, 0.5, 1.0]));
        assert!(!Picker::compare([126, 128, 128, 0], [0.5, 0.5, 0.5, 1.0]));
    }

    #[test]
    fn test_find_toggles_hits() {
        let (mut backend, mut scene, mut picker) = setup();
        let target = picker.target().unwrap();
        backend.paint_pixel(target, 1, 2, [0, 128, 0, 255]).unwrap();

        let green = scene.get("green").unwrap().id();
        let mut handler = CountingHandler::default();
        assert!(picker.find(&mut backend, &mut scene, &mut handler, 1, 2).unwrap());
        assert_eq!(picker.hits(), &[green]);

        assert!(picker.find(&mut backend, &mut scene, &mut handler, 1, 2).unwrap());
        assert!(picker.hits().is_empty());

        assert_eq!(handler.added, vec!["green"]);
        assert_eq!(handler.removed, vec!["green"]);
    }

    #[test]
    fn test_find_miss() {
        let (mut backend, mut scene, mut picker) = setup();
        let mut handler = CountingHandler::default();
        assert!(!picker.find(&mut backend, &mut scene, &mut handler, 0, 0).unwrap());
        assert!(handler.added.is_empty());
        assert!(picker
            .find(&mut backend, &mut scene, &mut handler, 9, 9)
            .is_err());
    }

    #[test]
    fn test_floor_is_never_picked() {
        let (mut backend, mut scene, mut picker) = setup();
        let black = ObjectOverrides::new().picking_color([0.0, 0.0, 0.0, 1.0]);
        scene.add(floor(10.0, 2), Some(&black), &mut backend).unwrap();

        let mut handler = CountingHandler::default();
        assert!(!picker.find(&mut backend, &mut scene, &mut handler, 0, 0).unwrap());
    }

    #[test]
    fn test_stop_processes_then_clears() {
        let (mut backend, mut scene, mut picker) = setup();
        let target = picker.target().unwrap();
        backend.paint_pixel(target, 0, 0, [255, 0, 0, 255]).unwrap();

        let mut handler = CountingHandler::default();
        picker.stop(&mut scene, &mut handler);
        assert!(handler.processed.is_empty());

        picker.find(&mut backend, &mut scene, &mut handler, 0, 0).unwrap();
        picker.stop(&mut scene, &mut handler);
        let red = scene.get("red").unwrap().id();
        assert_eq!(handler.processed, vec![vec![red]]);
        assert!(picker.hits().is_empty());
    }

    #[test]
    fn test_highlight_handler_restores_diffuse() {
        let (mut backend, mut scene, mut picker) = setup();
        let target = picker.target().unwrap();
        backend.paint_pixel(target, 3, 3, [255, 0, 0, 255]).unwrap();

        let mut handler = HighlightHandler;
        picker.find(&mut backend, &mut scene, &mut handler, 3, 3).unwrap();
        assert_eq!(scene.get("red").unwrap().material.diffuse, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(
            scene.get("red").unwrap().previous_diffuse,
            Some([1.0, 1.0, 1.0, 1.0])
        );

        picker.find(&mut backend, &mut scene, &mut handler, 3, 3).unwrap();
        assert_eq!(scene.get("red").unwrap().material.diffuse, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_highlight_survives_repeated_clicks() {
        let (mut backend, mut scene, mut picker) = setup();
        let target = picker.target().unwrap();
        backend.paint_pixel(target, 2, 2, [255, 0, 0, 255]).unwrap();
        scene.get_mut("red").unwrap().material.diffuse = [0.2, 0.4, 0.6, 1.0];

        let mut handler = HighlightHandler;
        for _ in 0..2 {
            picker.find(&mut backend, &mut scene, &mut handler, 2, 2).unwrap();
            assert_eq!(scene.get("red").unwrap().material.diffuse, [1.0, 0.0, 0.0, 1.0]);
            picker.stop(&mut scene, &mut handler);

            let red = scene.get("red").unwrap();
            assert_eq!(red.material.diffuse, [0.2, 0.4, 0.6, 1.0]);
            assert_eq!(red.previous_diffuse, None);
        }
    }

    #[test]
    fn test_objects_sharing_an_alias_are_picked_separately() {
        let mut backend = RecordingBackend::new();
        let mut scene = Scene::new(ShaderInterface::all());
        let green = ObjectOverrides::new().picking_color([0.0, 1.0, 0.0, 1.0]);
        let blue = ObjectOverrides::new().picking_color([0.0, 0.0, 1.0, 1.0]);
        scene.add(triangle("wall"), Some(&green), &mut backend).unwrap();
        scene.add(triangle("wall"), Some(&blue), &mut backend).unwrap();
        let ids: Vec<ObjectId> = scene.objects().iter().map(Object::id).collect();

        let mut picker = Picker::new();
        picker.configure(&mut backend, 4, 4).unwrap();
        let target = picker.target().unwrap();
        backend.paint_pixel(target, 0, 0, [0, 255, 0, 255]).unwrap();
        backend.paint_pixel(target, 1, 0, [0, 0, 255, 255]).unwrap();

        let mut handler = HighlightHandler;
        picker.find(&mut backend, &mut scene, &mut handler, 0, 0).unwrap();
        picker.find(&mut backend, &mut scene, &mut handler, 1, 0).unwrap();
        assert_eq!(picker.hits(), ids.as_slice());

        let diffuse: Vec<[f32; 4]> = scene.objects().iter().map(|o| o.material.diffuse).collect();
        assert_eq!(diffuse, vec![[0.0, 1.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]]);

        // unpicking the second wall leaves the first one highlighted
        picker.find(&mut backend, &mut scene, &mut handler, 1, 0).unwrap();
        assert_eq!(picker.hits(), &ids[..1]);
        assert_eq!(scene.objects()[0].material.diffuse, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(scene.objects()[1].material.diffuse, [1.0, 1.0, 1.0, 1.0]);

        picker.stop(&mut scene, &mut handler);
        assert!(scene
            .objects()
            .iter()
            .all(|o| o.material.diffuse == [1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_update_resizes_target() {
        let mut backend = RecordingBackend::new();
        let mut picker = Picker::new();
        picker.update(&mut backend, 8, 6).unwrap();
        let target = picker.target().unwrap();
        picker.update(&mut backend, 16, 12).unwrap();
        assert_eq!(picker.target(), Some(target));
        assert_eq!(backend.target_size(target), Some((16, 12)));
    }
}
