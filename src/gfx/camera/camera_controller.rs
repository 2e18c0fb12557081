use winit::{
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, ModifiersState, PhysicalKey},
};

use super::scene_camera::Camera;
use crate::gfx::{
    backend::RenderBackend,
    picking::{PickHandler, Picker},
    scene::Scene,
};

/// Everything the controls need to hand a click over to the picker.
pub struct PickContext<'a, B: RenderBackend> {
    pub picker: &'a mut Picker,
    pub scene: &'a mut Scene,
    pub backend: &'a mut B,
    pub handler: &'a mut dyn PickHandler,
}

/// Mouse and keyboard mapping onto a [`Camera`].
///
/// - left drag rotates (azimuth from x, elevation from y)
/// - alt + left drag dollies
/// - arrow keys change azimuth and elevation by [`key_increment`](Self::key_increment)
/// - with a picker attached, a click that hits an object routes drags to
///   [`PickHandler::on_move`] instead of the camera
pub struct Controls {
    pub motion_factor: f32,
    pub key_increment: f32,
    dragging: bool,
    picking: bool,
    ctrl: bool,
    alt: bool,
    shift: bool,
    x: f32,
    y: f32,
    last_x: f32,
    last_y: f32,
    button: Option<MouseButton>,
    dloc: f32,
    dstep: f32,
    width: u32,
    height: u32,
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(10.0, 5.0)
    }
}

impl Controls {
    pub fn new(motion_factor: f32, key_increment: f32) -> Self {
        Self {
            motion_factor,
            key_increment,
            dragging: false,
            picking: false,
            ctrl: false,
            alt: false,
            shift: false,
            x: 0.0,
            y: 0.0,
            last_x: 0.0,
            last_y: 0.0,
            button: None,
            dloc: 0.0,
            dstep: 0.0,
            width: 1,
            height: 1,
        }
    }

    /// Viewport size used to scale drag rotation.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_picking(&self) -> bool {
        self.picking
    }

    pub fn cursor(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn on_modifiers_changed(&mut self, modifiers: ModifiersState) {
        self.ctrl = modifiers.control_key();
        self.alt = modifiers.alt_key();
        self.shift = modifiers.shift_key();
    }

    /// Starts a drag at the current cursor position, trying a pick first.
    pub fn on_mouse_down<B: RenderBackend>(
        &mut self,
        camera: &Camera,
        button: MouseButton,
        pick: Option<PickContext<'_, B>>,
    ) {
        self.dragging = true;
        self.button = Some(button);

        let position = camera.position;
        self.dstep = position.x.max(position.y).max(position.z) / 100.0;

        let Some(pick) = pick else {
            return;
        };

        let x = self.x.max(0.0) as u32;
        let y = self.y.max(0.0) as u32;
        self.picking = match pick.picker.find(pick.backend, pick.scene, pick.handler, x, y) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("pick at ({}, {}) failed: {}", x, y, e);
                false
            }
        };

        if !self.picking {
            pick.picker.stop(pick.scene, pick.handler);
        }
    }

    /// Ends a drag; without shift held, the current pick is processed and cleared.
    pub fn on_mouse_up<B: RenderBackend>(&mut self, pick: Option<PickContext<'_, B>>) {
        self.dragging = false;

        if self.shift {
            return;
        }
        if let Some(pick) = pick {
            self.picking = false;
            pick.picker.stop(pick.scene, pick.handler);
        }
    }

    pub fn on_cursor_moved<B: RenderBackend>(
        &mut self,
        camera: &mut Camera,
        x: f32,
        y: f32,
        pick: Option<PickContext<'_, B>>,
    ) {
        self.last_x = self.x;
        self.last_y = self.y;
        self.x = x;
        self.y = y;

        if !self.dragging {
            return;
        }

        let dx = self.x - self.last_x;
        let dy = self.y - self.last_y;

        if self.picking {
            if let Some(pick) = pick {
                let hits = pick.picker.hits().to_vec();
                pick.handler.on_move(pick.scene, &hits, dx, dy);
                return;
            }
        }

        if self.button == Some(MouseButton::Left) {
            if self.alt {
                self.dolly(camera, dy);
            } else {
                self.rotate(camera, dx, dy);
            }
        }
    }

    pub fn on_key_down(&mut self, camera: &mut Camera, key: KeyCode) {
        if matches!(key, KeyCode::ControlLeft | KeyCode::ControlRight) {
            self.ctrl = true;
        }
        if self.ctrl {
            return;
        }

        match key {
            KeyCode::ArrowLeft => camera.change_azimuth(-self.key_increment),
            KeyCode::ArrowUp => camera.change_elevation(self.key_increment),
            KeyCode::ArrowRight => camera.change_azimuth(self.key_increment),
            KeyCode::ArrowDown => camera.change_elevation(-self.key_increment),
            _ => (),
        }
    }

    pub fn on_key_up(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::ControlLeft | KeyCode::ControlRight) {
            self.ctrl = false;
        }
    }

    /// Moves the camera one dolly step forwards or backwards depending on the sign.
    pub fn dolly(&mut self, camera: &mut Camera, value: f32) {
        if value > 0.0 {
            self.dloc += self.dstep;
        } else {
            self.dloc -= self.dstep;
        }
        camera.dolly(self.dloc);
    }

    pub fn rotate(&mut self, camera: &mut Camera, dx: f32, dy: f32) {
        let delta_azimuth = -20.0 / self.width as f32;
        let delta_elevation = -20.0 / self.height as f32;

        camera.change_azimuth(dx * delta_azimuth * self.motion_factor);
        camera.change_elevation(dy * delta_elevation * self.motion_factor);
    }

    /// Routes a window event. Returns whether the event was used.
    pub fn handle_window_event<B: RenderBackend>(
        &mut self,
        event: &WindowEvent,
        camera: &mut Camera,
        pick: Option<PickContext<'_, B>>,
    ) -> bool {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.on_modifiers_changed(modifiers.state());
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor_moved(camera, position.x as f32, position.y as f32, pick);
                self.dragging
            }
            WindowEvent::MouseInput { state, button, .. } => {
                match state {
                    ElementState::Pressed => self.on_mouse_down(camera, *button, pick),
                    ElementState::Released => self.on_mouse_up(pick),
                }
                true
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                match state {
                    ElementState::Pressed => self.on_key_down(camera, *code),
                    ElementState::Released => self.on_key_up(*code),
                }
                true
            }
            _ => false,
        }
    }
}
