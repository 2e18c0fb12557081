//! # Rendering Backend
//!
//! The scene runtime never talks to a graphics API directly. Everything it needs from
//! the GPU is expressed as a handful of backend-neutral requests ("allocate a vertex
//! buffer", "bind this stream to that vertex array", "set the model-view matrix",
//! "draw these indices") on the [`RenderBackend`] trait.
//!
//! Two implementations ship with the crate:
//!
//! - [`RecordingBackend`] - keeps everything in memory and records each request. It is
//!   used for headless runs and by the test-suite.
//! - [`WgpuBackend`] - allocates real `wgpu` buffers and textures and replays the queued
//!   draws into a render pass.

pub mod recording;
pub mod texture_resource;
pub mod wgpu_backend;

use std::collections::HashSet;

use cgmath::Matrix4;

use crate::error::BackendError;

pub use recording::{Command, RecordingBackend};
pub use wgpu_backend::{PipelineSet, WgpuBackend};

/// Opaque handle to a backend buffer (vertex or index data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u32);

/// Opaque handle to a vertex array: the set of attribute streams bound for one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayHandle(pub(crate) u32);

/// Opaque handle to an off-screen colour + depth render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetHandle(pub(crate) u32);

impl BufferHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl VertexArrayHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl RenderTargetHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-vertex attribute streams an object can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexAttribute {
    Position,
    Normal,
    Color,
    TextureCoords,
    Tangent,
}

impl VertexAttribute {
    pub const ALL: [VertexAttribute; 5] = [
        VertexAttribute::Position,
        VertexAttribute::Normal,
        VertexAttribute::Color,
        VertexAttribute::TextureCoords,
        VertexAttribute::Tangent,
    ];

    /// Number of `f32` components per vertex.
    pub fn components(self) -> u32 {
        match self {
            VertexAttribute::Position | VertexAttribute::Normal | VertexAttribute::Tangent => 3,
            VertexAttribute::Color => 4,
            VertexAttribute::TextureCoords => 2,
        }
    }

    /// Shader location (and vertex buffer slot) the stream is bound to.
    pub fn location(self) -> u32 {
        match self {
            VertexAttribute::Position => 0,
            VertexAttribute::Normal => 1,
            VertexAttribute::Color => 2,
            VertexAttribute::TextureCoords => 3,
            VertexAttribute::Tangent => 4,
        }
    }
}

/// The vertex attributes declared by the active shader program.
///
/// A stream is only uploaded and bound when the program declares it, mirroring how
/// an inactive attribute location is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderInterface {
    attributes: HashSet<VertexAttribute>,
}

impl ShaderInterface {
    pub fn new(attributes: &[VertexAttribute]) -> Self {
        Self {
            attributes: attributes.iter().copied().collect(),
        }
    }

    /// An interface declaring every attribute stream.
    pub fn all() -> Self {
        Self::new(&VertexAttribute::ALL)
    }

    pub fn declares(&self, attribute: VertexAttribute) -> bool {
        self.attributes.contains(&attribute)
    }
}

/// Matrix uniforms pushed by [`Transforms`](crate::gfx::transforms::Transforms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixUniform {
    ModelView,
    Projection,
    Normal,
}

/// Per-object colour uniforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorUniform {
    MaterialDiffuse,
    MaterialAmbient,
    MaterialSpecular,
    PickingColor,
}

/// Primitive topology of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Triangles,
    Lines,
}

/// One indexed draw of a vertex array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub vertex_array: VertexArrayHandle,
    pub index_buffer: BufferHandle,
    pub index_count: u32,
    pub primitive: Primitive,
}

/// Backend-neutral sink for every GPU request the runtime makes.
///
/// Pixel coordinates passed to [`read_pixel`](Self::read_pixel) use a top-left origin,
/// matching window coordinates.
pub trait RenderBackend {
    fn create_index_buffer(&mut self, indices: &[u32]) -> Result<BufferHandle, BackendError>;

    fn create_vertex_buffer(&mut self, data: &[f32]) -> Result<BufferHandle, BackendError>;

    fn create_vertex_array(&mut self) -> Result<VertexArrayHandle, BackendError>;

    fn bind_vertex_attribute(
        &mut self,
        vertex_array: VertexArrayHandle,
        attribute: VertexAttribute,
        buffer: BufferHandle,
    ) -> Result<(), BackendError>;

    /// Frees a buffer. Its handle is not reused and is unknown afterwards.
    fn release_buffer(&mut self, buffer: BufferHandle) -> Result<(), BackendError>;

    /// Frees a vertex array; the buffers bound to it are released separately.
    fn release_vertex_array(&mut self, vertex_array: VertexArrayHandle)
        -> Result<(), BackendError>;

    fn set_uniform_matrix(&mut self, uniform: MatrixUniform, value: &Matrix4<f32>);

    fn set_uniform_color(&mut self, uniform: ColorUniform, value: [f32; 4]);

    /// Issues a draw using the uniforms currently set, into the bound render target
    /// (or the default surface when none is bound).
    fn draw(&mut self, call: &DrawCall) -> Result<(), BackendError>;

    fn create_render_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<RenderTargetHandle, BackendError>;

    fn resize_render_target(
        &mut self,
        target: RenderTargetHandle,
        width: u32,
        height: u32,
    ) -> Result<(), BackendError>;

    /// Binds an off-screen target for subsequent draws; `None` restores the surface.
    fn bind_render_target(&mut self, target: Option<RenderTargetHandle>)
        -> Result<(), BackendError>;

    /// Reads back one RGBA8 pixel of an off-screen target.
    fn read_pixel(
        &mut self,
        target: RenderTargetHandle,
        x: u32,
        y: u32,
    ) -> Result<[u8; 4], BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_layout() {
        let locations: Vec<u32> = VertexAttribute::ALL.iter().map(|a| a.location()).collect();
        assert_eq!(locations, vec![0, 1, 2, 3, 4]);
        assert_eq!(VertexAttribute::Color.components(), 4);
        assert_eq!(VertexAttribute::TextureCoords.components(), 2);
    }

    #[test]
    fn test_shader_interface_declares() {
        let interface =
            ShaderInterface::new(&[VertexAttribute::Position, VertexAttribute::Normal]);
        assert!(interface.declares(VertexAttribute::Position));
        assert!(!interface.declares(VertexAttribute::Tangent));
        assert!(ShaderInterface::all().declares(VertexAttribute::Tangent));
        assert!(!ShaderInterface::default().declares(VertexAttribute::Position));
    }
}
