//! Orbiting vs tracking cameras over a floor grid.
//!
//! Usage: `cargo run --example camera_types [config.json] [geometry.json]`
//!
//! - left drag rotates, alt + left drag dollies, arrows step the angles
//! - `T` switches between orbiting and tracking, `H` returns home
//! - the box is highlighted while a click on it is held
//! - Escape quits

use anyhow::Context;
use cgmath::InnerSpace;
use rtgl::{
    gfx::backend::{texture_resource::TextureResource, wgpu_backend::DrawUniform},
    prelude::*,
};
use winit::keyboard::KeyCode;

const SHADER: &str = r#"
struct DrawUniform {
    model_view: mat4x4<f32>,
    projection: mat4x4<f32>,
    normal: mat4x4<f32>,
    material_diffuse: vec4<f32>,
    material_ambient: vec4<f32>,
    material_specular: vec4<f32>,
    picking_color: vec4<f32>,
};

@group(0) @binding(0) var<uniform> draw: DrawUniform;

// Substituted from the scene's first light, treated as an eye-space direction
const LIGHT_DIRECTION: vec3<f32> = vec3<f32>(LIGHT_X, LIGHT_Y, LIGHT_Z);

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = draw.projection * draw.model_view * vec4<f32>(position, 1.0);
    out.normal = (draw.normal * vec4<f32>(normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_shaded(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let lambert = max(dot(n, LIGHT_DIRECTION), 0.0);
    let color = draw.material_ambient.rgb * 0.2 + draw.material_diffuse.rgb * lambert;
    return vec4<f32>(color, draw.material_diffuse.a);
}

@fragment
fn fs_flat(in: VertexOutput) -> @location(0) vec4<f32> {
    return draw.material_diffuse;
}

@fragment
fn fs_picking(in: VertexOutput) -> @location(0) vec4<f32> {
    return draw.picking_color;
}
"#;

struct Pipelines {
    triangles: wgpu::RenderPipeline,
    lines: wgpu::RenderPipeline,
    picking: wgpu::RenderPipeline,
}

#[derive(Default)]
struct CameraTypes {
    geometry: Option<String>,
    pipelines: Option<Pipelines>,
    highlight: HighlightHandler,
}

fn shader_source(lights: &LightsManager) -> String {
    let position = lights.get_array(LightProperty::Position);
    let direction = match position.get(0..3) {
        Some(&[x, y, z]) if x != 0.0 || y != 0.0 || z != 0.0 => {
            Vector3::new(x, y, z).normalize()
        }
        _ => Vector3::unit_z(),
    };

    SHADER
        .replace("LIGHT_X", &format!("{:.4}", direction.x))
        .replace("LIGHT_Y", &format!("{:.4}", direction.y))
        .replace("LIGHT_Z", &format!("{:.4}", direction.z))
}

fn create_pipeline(
    backend: &WgpuBackend,
    shader: &wgpu::ShaderModule,
    fragment: &str,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    let device = backend.device();
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Camera Types Pipeline Layout"),
        bind_group_layouts: &[backend.uniform_layout()],
        push_constant_ranges: &[],
    });
    let buffers = [
        WgpuBackend::vertex_buffer_layout(VertexAttribute::Position),
        WgpuBackend::vertex_buffer_layout(VertexAttribute::Normal),
    ];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(fragment),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: TextureResource::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

impl Demo<WgpuBackend> for CameraTypes {
    fn configure(&mut self, ctx: &mut AppContext<WgpuBackend>) -> anyhow::Result<()> {
        let format = ctx
            .backend
            .surface_format()
            .context("camera_types needs a window surface")?;
        log::debug!("draw uniform is {} bytes", std::mem::size_of::<DrawUniform>());

        let mut light = Light::new("sun");
        light.set_position(Vector3::new(0.0, 120.0, 120.0));
        light.set_ambient([0.2, 0.2, 0.2, 1.0]);
        light.set_diffuse([1.0, 1.0, 1.0, 1.0]);
        ctx.lights.add(light);

        let source = shader_source(&ctx.lights);
        let shader = ctx
            .backend
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Camera Types Shader"),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        self.pipelines = Some(Pipelines {
            triangles: create_pipeline(
                &ctx.backend,
                &shader,
                "fs_shaded",
                format,
                wgpu::PrimitiveTopology::TriangleList,
            ),
            lines: create_pipeline(
                &ctx.backend,
                &shader,
                "fs_flat",
                format,
                wgpu::PrimitiveTopology::LineList,
            ),
            picking: create_pipeline(
                &ctx.backend,
                &shader,
                "fs_picking",
                TextureResource::OFFSCREEN_FORMAT,
                wgpu::PrimitiveTopology::TriangleList,
            ),
        });

        ctx.enable_picking()?;
        Ok(())
    }

    fn load(&mut self, ctx: &mut AppContext<WgpuBackend>) -> anyhow::Result<()> {
        ctx.scene.add(floor(80.0, 2), None, &mut ctx.backend)?;
        ctx.scene.add(axis(82.0), None, &mut ctx.backend)?;

        let overrides = ObjectOverrides::new()
            .position([0.0, 2.0, 0.0])
            .scale([4.0, 4.0, 4.0])
            .diffuse([0.8, 0.4, 0.1, 1.0])
            .picking_color([1.0, 1.0, 0.0, 1.0]);
        ctx.scene.add(cube("box"), Some(&overrides), &mut ctx.backend)?;

        match self.geometry.as_deref() {
            Some(path) if path.ends_with(".obj") => {
                ctx.scene.load_obj(path, Some("model"), None, &mut ctx.backend)?;
            }
            Some(path) => {
                ctx.scene.load(path, Some("model"), None, &mut ctx.backend);
            }
            None => (),
        }
        Ok(())
    }

    fn key_pressed(&mut self, ctx: &mut AppContext<WgpuBackend>, key: KeyCode) {
        match key {
            KeyCode::KeyT => {
                let next = match ctx.camera.kind() {
                    CameraType::Orbiting => CameraType::Tracking,
                    CameraType::Tracking => CameraType::Orbiting,
                };
                ctx.camera.go_home(None);
                ctx.camera.set_type(next);
                log::info!("camera type: {}", next);
            }
            KeyCode::KeyH => ctx.camera.go_home(None),
            _ => (),
        }
    }

    fn pick_handler(&mut self) -> Option<&mut dyn PickHandler> {
        Some(&mut self.highlight)
    }
}

impl WindowedDemo for CameraTypes {
    fn pipelines(&self) -> Option<PipelineSet<'_>> {
        self.pipelines.as_ref().map(|p| PipelineSet {
            triangles: &p.triangles,
            lines: Some(&p.lines),
        })
    }

    fn picking_pipelines(&self) -> Option<PipelineSet<'_>> {
        self.pipelines.as_ref().map(|p| PipelineSet {
            triangles: &p.picking,
            lines: None,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);

    let mut config = match args.next() {
        Some(path) => RuntimeConfig::from_path(path)?,
        None => {
            let mut config = RuntimeConfig::default();
            config.window.title = "Camera Types".to_string();
            config.camera.kind = CameraType::Tracking;
            config.camera.home = [0.0, 2.0, 50.0];
            config
        }
    };
    config.logging.filter.get_or_insert_with(|| "info,wgpu_core=warn".to_string());

    let demo = CameraTypes {
        geometry: args.next(),
        ..Default::default()
    };
    run_windowed(demo, config)
}
