//! # Application runner
//!
//! A demo is a [`Demo`] implementation driven by [`run_windowed`]. All runtime state
//! lives in one [`AppContext`] that the runner hands to every demo hook:
//!
//! 1. `configure` once the window and GPU are up (pipelines, picking, lights)
//! 2. `load` to fill the scene
//! 3. `update` and `draw` on every clock tick
//!
//! Input goes through [`Controls`] and, when the demo provides a [`PickHandler`] and
//! picking is enabled, through the [`Picker`]. Losing window focus stops the clock;
//! while it is stopped the last frame is presented again.

use std::sync::Arc;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::RuntimeConfig,
    error::BackendError,
    gfx::{
        backend::{PipelineSet, RenderBackend, ShaderInterface, VertexAttribute, WgpuBackend},
        camera::{Camera, Controls, PickContext},
        lighting::LightsManager,
        picking::{PickHandler, Picker},
        render::{render_scene, DrawPass},
        scene::Scene,
        transforms::Transforms,
    },
    logging,
    time::Clock,
};

/// Runtime state shared by the runner and the demo.
pub struct AppContext<B: RenderBackend> {
    pub backend: B,
    pub camera: Camera,
    pub transforms: Transforms,
    pub scene: Scene,
    pub lights: LightsManager,
    pub clock: Clock,
    pub controls: Controls,
    /// `None` until [`enable_picking`](Self::enable_picking).
    pub picker: Option<Picker>,
    pub clear_color: [f32; 4],
}

impl<B: RenderBackend> AppContext<B> {
    pub fn new(backend: B, config: &RuntimeConfig, interface: ShaderInterface) -> Self {
        let camera = config.camera.build();
        let mut transforms = Transforms::new(&camera, config.window.width, config.window.height);
        transforms.set_projection_mode(config.projection);
        transforms.update_perspective(&camera);

        let mut controls = config.controls.build();
        controls.set_viewport(config.window.width, config.window.height);

        Self {
            backend,
            camera,
            transforms,
            scene: Scene::new(interface),
            lights: LightsManager::new(),
            clock: Clock::new(),
            controls,
            picker: None,
            clear_color: config.clear_color,
        }
    }

    /// Allocates the picker's off-screen target at the current viewport size.
    pub fn enable_picking(&mut self) -> Result<(), BackendError> {
        let (width, height) = self.transforms.viewport();
        let mut picker = Picker::new();
        picker.configure(&mut self.backend, width.max(1), height.max(1))?;
        self.picker = Some(picker);
        Ok(())
    }

    /// Propagates a new viewport size to the projection, controls and picker.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        if width == 0 || height == 0 {
            return Ok(());
        }

        self.transforms.set_viewport(width, height);
        self.transforms.update_perspective(&self.camera);
        self.controls.set_viewport(width, height);
        if let Some(picker) = self.picker.as_mut() {
            picker.update(&mut self.backend, width, height)?;
        }
        Ok(())
    }

    /// Draws the picking pass (when enabled) followed by the shaded pass.
    ///
    /// Returns the total number of draw calls.
    pub fn render(&mut self) -> Result<usize, BackendError> {
        self.transforms.update_perspective(&self.camera);

        let mut draws = 0;
        if let Some(target) = self.picker.as_ref().and_then(Picker::target) {
            draws += render_scene(
                &mut self.backend,
                &self.scene,
                &self.camera,
                &mut self.transforms,
                DrawPass::Picking(target),
            )?;
        }
        draws += render_scene(
            &mut self.backend,
            &self.scene,
            &self.camera,
            &mut self.transforms,
            DrawPass::Shaded,
        )?;
        Ok(draws)
    }

    /// Routes a window event to the controls. Returns whether it was used.
    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        handler: Option<&mut dyn PickHandler>,
    ) -> bool {
        let pick = match (self.picker.as_mut(), handler) {
            (Some(picker), Some(handler)) => Some(PickContext {
                picker,
                scene: &mut self.scene,
                backend: &mut self.backend,
                handler,
            }),
            _ => None,
        };
        self.controls.handle_window_event(event, &mut self.camera, pick)
    }
}

/// Hooks a demo implements. Only [`load`](Self::load) is required.
pub trait Demo<B: RenderBackend> {
    /// Vertex attributes the demo's shaders read.
    fn shader_interface(&self) -> ShaderInterface {
        ShaderInterface::new(&[VertexAttribute::Position, VertexAttribute::Normal])
    }

    fn configure(&mut self, _ctx: &mut AppContext<B>) -> anyhow::Result<()> {
        Ok(())
    }

    fn load(&mut self, ctx: &mut AppContext<B>) -> anyhow::Result<()>;

    /// Called once per clock tick with the elapsed seconds.
    fn update(&mut self, _ctx: &mut AppContext<B>, _dt: f32) {}

    /// Called for every key press, before the controls see it.
    fn key_pressed(&mut self, _ctx: &mut AppContext<B>, _key: KeyCode) {}

    fn draw(&mut self, ctx: &mut AppContext<B>) -> anyhow::Result<()> {
        ctx.render()?;
        Ok(())
    }

    /// Receives pick events; picking stays inactive while this is `None`.
    fn pick_handler(&mut self) -> Option<&mut dyn PickHandler> {
        None
    }
}

/// A demo that can be presented through [`WgpuBackend`].
pub trait WindowedDemo: Demo<WgpuBackend> {
    /// Pipelines for the window surface; `None` until they are built in `configure`.
    fn pipelines(&self) -> Option<PipelineSet<'_>>;

    /// Pipelines for the picking target.
    fn picking_pipelines(&self) -> Option<PipelineSet<'_>> {
        None
    }
}

/// Ticks the clock and, while it is running, updates and draws the demo.
///
/// Returns whether a frame was drawn.
pub fn run_frame<B, D>(demo: &mut D, ctx: &mut AppContext<B>) -> anyhow::Result<bool>
where
    B: RenderBackend,
    D: Demo<B> + ?Sized,
{
    let Some(dt) = ctx.clock.tick() else {
        return Ok(false);
    };

    demo.update(ctx, dt);
    demo.draw(ctx)?;
    Ok(true)
}

/// Opens a window and runs `demo` until the window is closed or Escape is pressed.
pub fn run_windowed<D: WindowedDemo>(demo: D, config: RuntimeConfig) -> anyhow::Result<()> {
    logging::init_logging(&config.logging);

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut runner = Runner {
        demo,
        config,
        window: None,
        ctx: None,
        error: None,
    };
    event_loop
        .run_app(&mut runner)
        .context("event loop terminated abnormally")?;

    match runner.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct Runner<D: WindowedDemo> {
    demo: D,
    config: RuntimeConfig,
    window: Option<Arc<Window>>,
    ctx: Option<AppContext<WgpuBackend>>,
    error: Option<anyhow::Error>,
}

impl<D: WindowedDemo> Runner<D> {
    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );

        let (width, height) = window.inner_size().into();
        let backend = pollster::block_on(WgpuBackend::for_window(window.clone(), width, height))
            .context("failed to initialise GPU backend")?;

        let mut ctx = AppContext::new(backend, &self.config, self.demo.shader_interface());
        ctx.resize(width, height)?;
        self.demo.configure(&mut ctx).context("configure failed")?;
        self.demo.load(&mut ctx).context("load failed")?;
        log::info!("{} objects in scene", ctx.scene.len());

        self.window = Some(window);
        self.ctx = Some(ctx);
        Ok(())
    }

    fn redraw(&mut self) -> anyhow::Result<()> {
        let Runner { demo, ctx, .. } = self;
        let Some(ctx) = ctx.as_mut() else {
            return Ok(());
        };

        if ctx.clock.is_running() {
            ctx.backend.begin_frame();
            run_frame(demo, ctx)?;
        }

        let Some(pipelines) = demo.pipelines() else {
            return Ok(());
        };
        let picking = demo.picking_pipelines();
        ctx.backend
            .render_frame(ctx.clear_color.map(f64::from), &pipelines, picking.as_ref())?;
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

impl<D: WindowedDemo> ApplicationHandler for Runner<D> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(ctx) = self.ctx.as_mut() else {
            return;
        };

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                ctx.backend.resize(width, height);
                if let Err(e) = ctx.resize(width, height) {
                    self.fail(event_loop, e.into());
                }
            }
            WindowEvent::Focused(focused) => {
                if focused {
                    ctx.clock.start();
                } else {
                    ctx.clock.stop();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }
            event => {
                if let WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(code),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } = &event
                {
                    self.demo.key_pressed(ctx, *code);
                }
                ctx.handle_window_event(&event, self.demo.pick_handler());
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        backend::{ColorUniform, RecordingBackend},
        geometry::{axis, cube},
        picking::HighlightHandler,
        scene::{Object, ObjectOverrides},
    };
    use winit::event::{DeviceId, MouseButton};

    struct SpinningCube {
        updates: Vec<f32>,
        handler: HighlightHandler,
    }

    impl Demo<RecordingBackend> for SpinningCube {
        fn configure(&mut self, ctx: &mut AppContext<RecordingBackend>) -> anyhow::Result<()> {
            ctx.enable_picking()?;
            Ok(())
        }

        fn load(&mut self, ctx: &mut AppContext<RecordingBackend>) -> anyhow::Result<()> {
            ctx.scene.add(axis(10.0), None, &mut ctx.backend)?;
            let overrides = ObjectOverrides::new().picking_color([1.0, 0.0, 0.0, 1.0]);
            ctx.scene.add(cube("cube"), Some(&overrides), &mut ctx.backend)?;
            Ok(())
        }

        fn update(&mut self, ctx: &mut AppContext<RecordingBackend>, dt: f32) {
            self.updates.push(dt);
            ctx.camera.change_azimuth(1.0);
        }

        fn pick_handler(&mut self) -> Option<&mut dyn PickHandler> {
            Some(&mut self.handler)
        }
    }

    fn setup() -> (SpinningCube, AppContext<RecordingBackend>) {
        let mut config = RuntimeConfig::default();
        config.window.width = 64;
        config.window.height = 48;

        let mut demo = SpinningCube {
            updates: Vec::new(),
            handler: HighlightHandler,
        };
        let mut ctx = AppContext::new(
            RecordingBackend::new(),
            &config,
            Demo::<RecordingBackend>::shader_interface(&demo),
        );
        demo.configure(&mut ctx).unwrap();
        demo.load(&mut ctx).unwrap();
        (demo, ctx)
    }

    #[test]
    fn test_context_from_config() {
        let mut config = RuntimeConfig::default();
        config.camera.home = [0.0, 0.0, 30.0];
        config.controls.key_increment = 2.0;

        let ctx = AppContext::new(RecordingBackend::new(), &config, ShaderInterface::all());
        assert_eq!(ctx.camera.position.z, 30.0);
        assert_eq!(ctx.controls.key_increment, 2.0);
        assert_eq!(ctx.transforms.viewport(), (1280, 720));
        assert!(ctx.picker.is_none());
        assert!(ctx.scene.is_empty());
    }

    #[test]
    fn test_frame_draws_both_passes() {
        let (mut demo, mut ctx) = setup();
        ctx.backend.clear_commands();

        assert!(run_frame(&mut demo, &mut ctx).unwrap());
        assert_eq!(demo.updates.len(), 1);
        assert_eq!(ctx.camera.azimuth, 1.0);

        // cube into the picking target, then axis and cube on screen
        let draws = ctx.backend.draws();
        assert_eq!(draws.len(), 3);
        let target = ctx.picker.as_ref().and_then(Picker::target);
        assert_eq!(draws[0].1, target);
        assert!(draws[1..].iter().all(|(_, target)| target.is_none()));
    }

    #[test]
    fn test_stopped_clock_skips_frames() {
        let (mut demo, mut ctx) = setup();
        ctx.clock.stop();
        ctx.backend.clear_commands();

        assert!(!run_frame(&mut demo, &mut ctx).unwrap());
        assert!(demo.updates.is_empty());
        assert!(ctx.backend.draws().is_empty());

        ctx.clock.start();
        assert!(run_frame(&mut demo, &mut ctx).unwrap());
    }

    #[test]
    fn test_resize_updates_picker_and_projection() {
        let (_, mut ctx) = setup();
        let before = ctx.transforms.projection;

        ctx.resize(128, 32).unwrap();
        assert_eq!(ctx.transforms.viewport(), (128, 32));
        assert_ne!(ctx.transforms.projection, before);

        let target = ctx.picker.as_ref().and_then(Picker::target).unwrap();
        assert_eq!(ctx.backend.target_size(target), Some((128, 32)));

        // Minimised windows report a zero size
        ctx.resize(0, 0).unwrap();
        assert_eq!(ctx.transforms.viewport(), (128, 32));
    }

    #[test]
    fn test_click_picks_through_context() {
        let (mut demo, mut ctx) = setup();
        let target = ctx.picker.as_ref().and_then(Picker::target).unwrap();
        ctx.backend.paint_pixel(target, 5, 5, [255, 0, 0, 255]).unwrap();

        let device_id = unsafe { DeviceId::dummy() };
        let moved = WindowEvent::CursorMoved {
            device_id,
            position: (5.0, 5.0).into(),
        };
        let pressed = WindowEvent::MouseInput {
            device_id,
            state: ElementState::Pressed,
            button: MouseButton::Left,
        };

        ctx.handle_window_event(&moved, demo.pick_handler());
        assert!(ctx.handle_window_event(&pressed, demo.pick_handler()));

        assert!(ctx.controls.is_picking());
        let cube = ctx.scene.get("cube").map(Object::id).unwrap();
        assert_eq!(ctx.picker.as_ref().map(Picker::hits), Some(&[cube][..]));
        // highlight handler paints the cube in its picking colour
        ctx.render().unwrap();
        assert_eq!(
            ctx.backend.color(ColorUniform::MaterialDiffuse),
            Some([1.0, 0.0, 0.0, 1.0])
        );
    }
}
