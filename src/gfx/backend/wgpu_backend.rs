//! WGPU implementation of [`RenderBackend`].
//!
//! Buffers and off-screen targets are real `wgpu` resources. Draw requests are queued
//! together with a snapshot of the uniforms that were current when they were issued;
//! each snapshot lives in its own 256-byte slot of one uniform buffer and is selected
//! with a dynamic offset when the queue is replayed into a render pass.

use std::{collections::HashMap, sync::Arc};

use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use super::{
    texture_resource::{OffscreenTarget, TextureResource},
    BufferHandle, ColorUniform, DrawCall, MatrixUniform, Primitive, RenderBackend,
    RenderTargetHandle, VertexArrayHandle, VertexAttribute,
};
use crate::{
    error::BackendError,
    gfx::camera::camera_utils::{convert_matrix4_to_array, OPENGL_TO_WGPU_MATRIX},
};

/// Size of one per-draw uniform slot; matches the minimum dynamic offset alignment.
pub const UNIFORM_SLOT_SIZE: u64 = 256;

/// Number of draws that can be queued per frame.
pub const DEFAULT_UNIFORM_SLOTS: usize = 1024;

/// Per-draw uniform block, bound at group 0 binding 0.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub material_diffuse: [f32; 4],
    pub material_ambient: [f32; 4],
    pub material_specular: [f32; 4],
    pub picking_color: [f32; 4],
}

impl Default for DrawUniform {
    fn default() -> Self {
        let identity = convert_matrix4_to_array(Matrix4::identity());
        Self {
            model_view: identity,
            projection: identity,
            normal: identity,
            material_diffuse: [1.0, 1.0, 1.0, 1.0],
            material_ambient: [0.2, 0.2, 0.2, 1.0],
            material_specular: [1.0, 1.0, 1.0, 1.0],
            picking_color: [0.0; 4],
        }
    }
}

/// Pipelines used when replaying queued draws.
///
/// Pipelines must use [`WgpuBackend::uniform_layout`] at group 0 and one vertex buffer
/// per attribute slot, see [`WgpuBackend::vertex_buffer_layout`]. Line draws are
/// skipped when `lines` is `None`.
pub struct PipelineSet<'a> {
    pub triangles: &'a wgpu::RenderPipeline,
    pub lines: Option<&'a wgpu::RenderPipeline>,
}

enum GpuBuffer {
    Index(wgpu::Buffer),
    Vertex(wgpu::Buffer),
}

impl GpuBuffer {
    fn destroy(self) {
        match self {
            GpuBuffer::Index(buffer) | GpuBuffer::Vertex(buffer) => buffer.destroy(),
        }
    }
}

struct QueuedDraw {
    call: DrawCall,
    slot: usize,
    target: Option<RenderTargetHandle>,
}

struct SurfaceState {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth: TextureResource,
}

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    offset: 0,
    shader_location: 0,
    format: wgpu::VertexFormat::Float32x3,
}];
const NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    offset: 0,
    shader_location: 1,
    format: wgpu::VertexFormat::Float32x3,
}];
const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    offset: 0,
    shader_location: 2,
    format: wgpu::VertexFormat::Float32x4,
}];
const TEXTURE_COORD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    offset: 0,
    shader_location: 3,
    format: wgpu::VertexFormat::Float32x2,
}];
const TANGENT_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    offset: 0,
    shader_location: 4,
    format: wgpu::VertexFormat::Float32x3,
}];

/// GPU backend built on wgpu
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    surface: Option<SurfaceState>,
    // released slots stay `None` so handles are never reused
    buffers: Vec<Option<GpuBuffer>>,
    vertex_arrays: Vec<Option<HashMap<VertexAttribute, BufferHandle>>>,
    targets: Vec<OffscreenTarget>,
    bound_target: Option<RenderTargetHandle>,
    current: DrawUniform,
    uniform_buffer: wgpu::Buffer,
    uniform_layout: wgpu::BindGroupLayout,
    uniform_bind_group: wgpu::BindGroup,
    uniform_capacity: usize,
    draws: Vec<QueuedDraw>,
}

impl WgpuBackend {
    /// Wraps an existing device and queue.
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        let uniform_capacity = DEFAULT_UNIFORM_SLOTS;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniform Slots"),
            size: UNIFORM_SLOT_SIZE * uniform_capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<DrawUniform>() as u64
                    ),
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniform>() as u64),
                }),
            }],
        });

        Self {
            device,
            queue,
            surface: None,
            buffers: Vec::new(),
            vertex_arrays: Vec::new(),
            targets: Vec::new(),
            bound_target: None,
            current: DrawUniform::default(),
            uniform_buffer,
            uniform_layout,
            uniform_bind_group,
            uniform_capacity,
            draws: Vec::new(),
        }
    }

    /// Creates a backend presenting to a window surface.
    pub async fn for_window(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, BackendError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| BackendError::Initialization(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| BackendError::Initialization(e.to_string()))?;

        let (device, queue) = Self::request_device(&adapter).await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| BackendError::Initialization("surface has no formats".into()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth =
            TextureResource::create_depth_texture(&device, config.width, config.height, "Depth");

        let mut backend = Self::new(Arc::new(device), Arc::new(queue));
        backend.surface = Some(SurfaceState {
            surface,
            config,
            depth,
        });
        Ok(backend)
    }

    /// Creates a backend without a surface, for off-screen work.
    pub async fn headless() -> Result<Self, BackendError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .map_err(|e| BackendError::Initialization(e.to_string()))?;
        let (device, queue) = Self::request_device(&adapter).await?;
        Ok(Self::new(Arc::new(device), Arc::new(queue)))
    }

    async fn request_device(
        adapter: &wgpu::Adapter,
    ) -> Result<(wgpu::Device, wgpu::Queue), BackendError> {
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| BackendError::Initialization(e.to_string()))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Format of the window surface, if one is attached.
    pub fn surface_format(&self) -> Option<wgpu::TextureFormat> {
        self.surface.as_ref().map(|s| s.config.format)
    }

    /// Layout of the per-draw uniform group; pipelines bind it at group 0.
    pub fn uniform_layout(&self) -> &wgpu::BindGroupLayout {
        &self.uniform_layout
    }

    /// Vertex buffer layout for one attribute stream, one buffer per stream.
    pub fn vertex_buffer_layout(attribute: VertexAttribute) -> wgpu::VertexBufferLayout<'static> {
        let attributes: &'static [wgpu::VertexAttribute] = match attribute {
            VertexAttribute::Position => &POSITION_ATTRIBUTES,
            VertexAttribute::Normal => &NORMAL_ATTRIBUTES,
            VertexAttribute::Color => &COLOR_ATTRIBUTES,
            VertexAttribute::TextureCoords => &TEXTURE_COORD_ATTRIBUTES,
            VertexAttribute::Tangent => &TANGENT_ATTRIBUTES,
        };
        wgpu::VertexBufferLayout {
            array_stride: (attribute.components() as usize * std::mem::size_of::<f32>())
                as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }

    /// Drops the draws queued for the previous frame.
    pub fn begin_frame(&mut self) {
        self.draws.clear();
    }

    /// Number of draws queued since [`begin_frame`](Self::begin_frame).
    pub fn queued_draws(&self) -> usize {
        self.draws.len()
    }

    /// Reconfigures the surface and its depth buffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(state) = self.surface.as_mut() {
            state.config.width = width;
            state.config.height = height;
            state.surface.configure(&self.device, &state.config);
            state.depth = TextureResource::create_depth_texture(&self.device, width, height, "Depth");
        }
    }

    /// Replays the queued draws: off-screen targets first, then the surface.
    ///
    /// Off-screen passes are cleared to transparent black and only run when
    /// `offscreen_pipelines` is provided.
    pub fn render_frame(
        &mut self,
        clear_color: [f64; 4],
        surface_pipelines: &PipelineSet,
        offscreen_pipelines: Option<&PipelineSet>,
    ) -> Result<(), BackendError> {
        let Some(state) = self.surface.as_ref() else {
            return Err(BackendError::Surface("no surface attached".into()));
        };

        let surface_texture = match state.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                state.surface.configure(&self.device, &state.config);
                return Ok(());
            }
            Err(e) => return Err(BackendError::Surface(e.to_string())),
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        if let Some(pipelines) = offscreen_pipelines {
            for (index, target) in self.targets.iter().enumerate() {
                let handle = RenderTargetHandle(index as u32);
                if !self.draws.iter().any(|d| d.target == Some(handle)) {
                    continue;
                }
                let mut pass = Self::begin_pass(
                    &mut encoder,
                    "Offscreen Pass",
                    &target.color.view,
                    &target.depth.view,
                    wgpu::Color::TRANSPARENT,
                );
                self.encode(&mut pass, Some(handle), pipelines);
            }
        }

        {
            let [r, g, b, a] = clear_color;
            let mut pass = Self::begin_pass(
                &mut encoder,
                "Surface Pass",
                &surface_view,
                &state.depth.view,
                wgpu::Color { r, g, b, a },
            );
            self.encode(&mut pass, None, surface_pipelines);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    fn begin_pass<'e>(
        encoder: &'e mut wgpu::CommandEncoder,
        label: &str,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        clear: wgpu::Color,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        })
    }

    /// Replays the draws queued for `target` into `pass`, in submission order.
    pub fn encode(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        target: Option<RenderTargetHandle>,
        pipelines: &PipelineSet,
    ) {
        for draw in self.draws.iter().filter(|d| d.target == target) {
            let pipeline = match draw.call.primitive {
                Primitive::Triangles => pipelines.triangles,
                Primitive::Lines => match pipelines.lines {
                    Some(pipeline) => pipeline,
                    None => continue,
                },
            };

            let Some(GpuBuffer::Index(index_buffer)) = self.buffer(draw.call.index_buffer) else {
                continue;
            };
            let Some(streams) = self.streams(draw.call.vertex_array) else {
                continue;
            };

            pass.set_pipeline(pipeline);
            pass.set_bind_group(
                0,
                &self.uniform_bind_group,
                &[(draw.slot as u64 * UNIFORM_SLOT_SIZE) as u32],
            );
            for (attribute, handle) in streams {
                if let Some(GpuBuffer::Vertex(buffer)) = self.buffer(*handle) {
                    pass.set_vertex_buffer(attribute.location(), buffer.slice(..));
                }
            }
            pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..draw.call.index_count, 0, 0..1);
        }
    }

    fn push_buffer(&mut self, buffer: GpuBuffer) -> BufferHandle {
        let handle = BufferHandle(self.buffers.len() as u32);
        self.buffers.push(Some(buffer));
        handle
    }

    fn buffer(&self, handle: BufferHandle) -> Option<&GpuBuffer> {
        self.buffers.get(handle.index()).and_then(Option::as_ref)
    }

    fn streams(
        &self,
        handle: VertexArrayHandle,
    ) -> Option<&HashMap<VertexAttribute, BufferHandle>> {
        self.vertex_arrays.get(handle.index()).and_then(Option::as_ref)
    }
}

impl RenderBackend for WgpuBackend {
    fn create_index_buffer(&mut self, indices: &[u32]) -> Result<BufferHandle, BackendError> {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Ok(self.push_buffer(GpuBuffer::Index(buffer)))
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> Result<BufferHandle, BackendError> {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            });
        Ok(self.push_buffer(GpuBuffer::Vertex(buffer)))
    }

    fn create_vertex_array(&mut self) -> Result<VertexArrayHandle, BackendError> {
        let handle = VertexArrayHandle(self.vertex_arrays.len() as u32);
        self.vertex_arrays.push(Some(HashMap::new()));
        Ok(handle)
    }

    fn bind_vertex_attribute(
        &mut self,
        vertex_array: VertexArrayHandle,
        attribute: VertexAttribute,
        buffer: BufferHandle,
    ) -> Result<(), BackendError> {
        if !matches!(self.buffer(buffer), Some(GpuBuffer::Vertex(_))) {
            return Err(BackendError::UnknownBuffer(buffer));
        }
        self.vertex_arrays
            .get_mut(vertex_array.index())
            .and_then(Option::as_mut)
            .ok_or(BackendError::UnknownVertexArray(vertex_array))?
            .insert(attribute, buffer);
        Ok(())
    }

    fn release_buffer(&mut self, buffer: BufferHandle) -> Result<(), BackendError> {
        self.buffers
            .get_mut(buffer.index())
            .and_then(Option::take)
            .ok_or(BackendError::UnknownBuffer(buffer))?
            .destroy();
        Ok(())
    }

    fn release_vertex_array(
        &mut self,
        vertex_array: VertexArrayHandle,
    ) -> Result<(), BackendError> {
        self.vertex_arrays
            .get_mut(vertex_array.index())
            .and_then(Option::take)
            .ok_or(BackendError::UnknownVertexArray(vertex_array))?;
        Ok(())
    }

    fn set_uniform_matrix(&mut self, uniform: MatrixUniform, value: &Matrix4<f32>) {
        match uniform {
            MatrixUniform::ModelView => self.current.model_view = convert_matrix4_to_array(*value),
            MatrixUniform::Projection => {
                self.current.projection = convert_matrix4_to_array(OPENGL_TO_WGPU_MATRIX * *value)
            }
            MatrixUniform::Normal => self.current.normal = convert_matrix4_to_array(*value),
        }
    }

    fn set_uniform_color(&mut self, uniform: ColorUniform, value: [f32; 4]) {
        match uniform {
            ColorUniform::MaterialDiffuse => self.current.material_diffuse = value,
            ColorUniform::MaterialAmbient => self.current.material_ambient = value,
            ColorUniform::MaterialSpecular => self.current.material_specular = value,
            ColorUniform::PickingColor => self.current.picking_color = value,
        }
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), BackendError> {
        if self.streams(call.vertex_array).is_none() {
            return Err(BackendError::UnknownVertexArray(call.vertex_array));
        }
        if !matches!(self.buffer(call.index_buffer), Some(GpuBuffer::Index(_))) {
            return Err(BackendError::UnknownBuffer(call.index_buffer));
        }

        let slot = self.draws.len();
        if slot >= self.uniform_capacity {
            return Err(BackendError::UniformSlotsExhausted {
                capacity: self.uniform_capacity,
            });
        }

        self.queue.write_buffer(
            &self.uniform_buffer,
            slot as u64 * UNIFORM_SLOT_SIZE,
            bytemuck::bytes_of(&self.current),
        );
        self.draws.push(QueuedDraw {
            call: *call,
            slot,
            target: self.bound_target,
        });
        Ok(())
    }

    fn create_render_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<RenderTargetHandle, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::EmptyRenderTarget { width, height });
        }
        let handle = RenderTargetHandle(self.targets.len() as u32);
        self.targets
            .push(OffscreenTarget::new(&self.device, width, height));
        Ok(handle)
    }

    fn resize_render_target(
        &mut self,
        target: RenderTargetHandle,
        width: u32,
        height: u32,
    ) -> Result<(), BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::EmptyRenderTarget { width, height });
        }
        let slot = self
            .targets
            .get_mut(target.index())
            .ok_or(BackendError::UnknownRenderTarget(target))?;
        *slot = OffscreenTarget::new(&self.device, width, height);
        Ok(())
    }

    fn bind_render_target(
        &mut self,
        target: Option<RenderTargetHandle>,
    ) -> Result<(), BackendError> {
        if let Some(handle) = target {
            if self.targets.get(handle.index()).is_none() {
                return Err(BackendError::UnknownRenderTarget(handle));
            }
        }
        self.bound_target = target;
        Ok(())
    }

    fn read_pixel(
        &mut self,
        target: RenderTargetHandle,
        x: u32,
        y: u32,
    ) -> Result<[u8; 4], BackendError> {
        let offscreen = self
            .targets
            .get(target.index())
            .ok_or(BackendError::UnknownRenderTarget(target))?;
        if x >= offscreen.width || y >= offscreen.height {
            return Err(BackendError::PixelOutOfBounds {
                x,
                y,
                width: offscreen.width,
                height: offscreen.height,
            });
        }

        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pixel Readback Buffer"),
            size: wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Pixel Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &offscreen.color.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging_buffer.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        let _ = self.device.poll(wgpu::MaintainBase::Wait);

        match futures::executor::block_on(rx) {
            Ok(Ok(())) => {
                let mapped = slice.get_mapped_range();
                let pixel = [mapped[0], mapped[1], mapped[2], mapped[3]];
                drop(mapped);
                staging_buffer.unmap();
                Ok(pixel)
            }
            Ok(Err(e)) => Err(BackendError::Readback(e.to_string())),
            Err(_) => Err(BackendError::Readback("map callback dropped".into())),
        }
    }
}
