//! In-memory backend that records every request.

use std::collections::HashMap;

use cgmath::Matrix4;

use super::{
    BufferHandle, ColorUniform, DrawCall, MatrixUniform, RenderBackend, RenderTargetHandle,
    VertexArrayHandle, VertexAttribute,
};
use crate::{error::BackendError, gfx::camera::camera_utils::convert_matrix4_to_array};

/// A single recorded backend request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateIndexBuffer {
        handle: BufferHandle,
        len: usize,
    },
    CreateVertexBuffer {
        handle: BufferHandle,
        len: usize,
    },
    CreateVertexArray(VertexArrayHandle),
    ReleaseBuffer(BufferHandle),
    ReleaseVertexArray(VertexArrayHandle),
    BindAttribute {
        vertex_array: VertexArrayHandle,
        attribute: VertexAttribute,
        buffer: BufferHandle,
    },
    UniformMatrix {
        uniform: MatrixUniform,
        value: [[f32; 4]; 4],
    },
    UniformColor {
        uniform: ColorUniform,
        value: [f32; 4],
    },
    Draw {
        call: DrawCall,
        target: Option<RenderTargetHandle>,
    },
    CreateRenderTarget {
        handle: RenderTargetHandle,
        width: u32,
        height: u32,
    },
    ResizeRenderTarget {
        handle: RenderTargetHandle,
        width: u32,
        height: u32,
    },
    BindRenderTarget(Option<RenderTargetHandle>),
}

enum BufferData {
    Index(Vec<u32>),
    Vertex(Vec<f32>),
}

struct RecordedTarget {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl RecordedTarget {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; (width * height) as usize],
        }
    }

    fn offset(&self, x: u32, y: u32) -> Result<usize, BackendError> {
        if x >= self.width || y >= self.height {
            return Err(BackendError::PixelOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((y * self.width + x) as usize)
    }
}

/// Headless [`RenderBackend`] keeping buffers, uniforms and render targets in memory.
///
/// Off-screen targets start cleared to transparent black; [`paint_pixel`] lets a
/// caller stand in for the rasterizer when exercising picking. Released buffers and
/// vertex arrays leave an empty slot behind so handles stay unique.
///
/// [`paint_pixel`]: RecordingBackend::paint_pixel
#[derive(Default)]
pub struct RecordingBackend {
    buffers: Vec<Option<BufferData>>,
    vertex_arrays: Vec<Option<HashMap<VertexAttribute, BufferHandle>>>,
    targets: Vec<RecordedTarget>,
    bound_target: Option<RenderTargetHandle>,
    matrices: HashMap<MatrixUniform, Matrix4<f32>>,
    colors: HashMap<ColorUniform, [f32; 4]>,
    commands: Vec<Command>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Draw calls in submission order, with the target each one went to.
    pub fn draws(&self) -> Vec<(DrawCall, Option<RenderTargetHandle>)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::Draw { call, target } => Some((*call, *target)),
                _ => None,
            })
            .collect()
    }

    /// Buffers created and not yet released.
    pub fn buffer_count(&self) -> usize {
        self.buffers.iter().flatten().count()
    }

    /// Vertex arrays created and not yet released.
    pub fn vertex_array_count(&self) -> usize {
        self.vertex_arrays.iter().flatten().count()
    }

    pub fn vertex_data(&self, handle: BufferHandle) -> Option<&[f32]> {
        match self.buffer(handle) {
            Some(BufferData::Vertex(data)) => Some(data),
            _ => None,
        }
    }

    pub fn index_data(&self, handle: BufferHandle) -> Option<&[u32]> {
        match self.buffer(handle) {
            Some(BufferData::Index(data)) => Some(data),
            _ => None,
        }
    }

    fn buffer(&self, handle: BufferHandle) -> Option<&BufferData> {
        self.buffers.get(handle.index()).and_then(Option::as_ref)
    }

    fn streams(
        &self,
        handle: VertexArrayHandle,
    ) -> Option<&HashMap<VertexAttribute, BufferHandle>> {
        self.vertex_arrays.get(handle.index()).and_then(Option::as_ref)
    }

    /// The attribute streams bound to a vertex array, in location order.
    pub fn attributes(&self, vertex_array: VertexArrayHandle) -> Vec<VertexAttribute> {
        let mut attributes: Vec<VertexAttribute> = self
            .streams(vertex_array)
            .map(|streams| streams.keys().copied().collect())
            .unwrap_or_default();
        attributes.sort();
        attributes
    }

    /// Buffer bound to one attribute stream of a vertex array.
    pub fn attribute_buffer(
        &self,
        vertex_array: VertexArrayHandle,
        attribute: VertexAttribute,
    ) -> Option<BufferHandle> {
        self.streams(vertex_array)
            .and_then(|streams| streams.get(&attribute))
            .copied()
    }

    pub fn matrix(&self, uniform: MatrixUniform) -> Option<Matrix4<f32>> {
        self.matrices.get(&uniform).copied()
    }

    pub fn color(&self, uniform: ColorUniform) -> Option<[f32; 4]> {
        self.colors.get(&uniform).copied()
    }

    pub fn bound_target(&self) -> Option<RenderTargetHandle> {
        self.bound_target
    }

    pub fn target_size(&self, target: RenderTargetHandle) -> Option<(u32, u32)> {
        self.targets
            .get(target.index())
            .map(|t| (t.width, t.height))
    }

    /// Writes one pixel of an off-screen target.
    pub fn paint_pixel(
        &mut self,
        target: RenderTargetHandle,
        x: u32,
        y: u32,
        rgba: [u8; 4],
    ) -> Result<(), BackendError> {
        let recorded = self
            .targets
            .get_mut(target.index())
            .ok_or(BackendError::UnknownRenderTarget(target))?;
        let offset = recorded.offset(x, y)?;
        recorded.pixels[offset] = rgba;
        Ok(())
    }

    fn push_buffer(&mut self, data: BufferData) -> BufferHandle {
        let handle = BufferHandle(self.buffers.len() as u32);
        self.buffers.push(Some(data));
        handle
    }
}

impl RenderBackend for RecordingBackend {
    fn create_index_buffer(&mut self, indices: &[u32]) -> Result<BufferHandle, BackendError> {
        let handle = self.push_buffer(BufferData::Index(indices.to_vec()));
        self.commands.push(Command::CreateIndexBuffer {
            handle,
            len: indices.len(),
        });
        Ok(handle)
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> Result<BufferHandle, BackendError> {
        let handle = self.push_buffer(BufferData::Vertex(data.to_vec()));
        self.commands.push(Command::CreateVertexBuffer {
            handle,
            len: data.len(),
        });
        Ok(handle)
    }

    fn create_vertex_array(&mut self) -> Result<VertexArrayHandle, BackendError> {
        let handle = VertexArrayHandle(self.vertex_arrays.len() as u32);
        self.vertex_arrays.push(Some(HashMap::new()));
        self.commands.push(Command::CreateVertexArray(handle));
        Ok(handle)
    }

    fn bind_vertex_attribute(
        &mut self,
        vertex_array: VertexArrayHandle,
        attribute: VertexAttribute,
        buffer: BufferHandle,
    ) -> Result<(), BackendError> {
        if !matches!(self.buffer(buffer), Some(BufferData::Vertex(_))) {
            return Err(BackendError::UnknownBuffer(buffer));
        }
        let streams = self
            .vertex_arrays
            .get_mut(vertex_array.index())
            .and_then(Option::as_mut)
            .ok_or(BackendError::UnknownVertexArray(vertex_array))?;
        streams.insert(attribute, buffer);
        self.commands.push(Command::BindAttribute {
            vertex_array,
            attribute,
            buffer,
        });
        Ok(())
    }

    fn release_buffer(&mut self, buffer: BufferHandle) -> Result<(), BackendError> {
        self.buffers
            .get_mut(buffer.index())
            .and_then(Option::take)
            .ok_or(BackendError::UnknownBuffer(buffer))?;
        self.commands.push(Command::ReleaseBuffer(buffer));
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
        self.commands.push(Command::ReleaseVertexArray(vertex_array));
        Ok(())
    }

    fn set_uniform_matrix(&mut self, uniform: MatrixUniform, value: &Matrix4<f32>) {
        self.matrices.insert(uniform, *value);
        self.commands.push(Command::UniformMatrix {
            uniform,
            value: convert_matrix4_to_array(*value),
        });
    }

    fn set_uniform_color(&mut self, uniform: ColorUniform, value: [f32; 4]) {
        self.colors.insert(uniform, value);
        self.commands.push(Command::UniformColor { uniform, value });
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), BackendError> {
        if self.streams(call.vertex_array).is_none() {
            return Err(BackendError::UnknownVertexArray(call.vertex_array));
        }
        if !matches!(self.buffer(call.index_buffer), Some(BufferData::Index(_))) {
            return Err(BackendError::UnknownBuffer(call.index_buffer));
        }
        self.commands.push(Command::Draw {
            call: *call,
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
        self.targets.push(RecordedTarget::new(width, height));
        self.commands.push(Command::CreateRenderTarget {
            handle,
            width,
            height,
        });
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
        let recorded = self
            .targets
            .get_mut(target.index())
            .ok_or(BackendError::UnknownRenderTarget(target))?;
        *recorded = RecordedTarget::new(width, height);
        self.commands.push(Command::ResizeRenderTarget {
            handle: target,
            width,
            height,
        });
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
        self.commands.push(Command::BindRenderTarget(target));
        Ok(())
    }

    fn read_pixel(
        &mut self,
        target: RenderTargetHandle,
        x: u32,
        y: u32,
    ) -> Result<[u8; 4], BackendError> {
        let recorded = self
            .targets
            .get(target.index())
            .ok_or(BackendError::UnknownRenderTarget(target))?;
        let offset = recorded.offset(x, y)?;
        Ok(recorded.pixels[offset])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::Primitive;
    use cgmath::{SquareMatrix, Vector3};

    #[test]
    fn test_buffers_and_bindings() {
        let mut backend = RecordingBackend::new();
        let ibo = backend.create_index_buffer(&[0, 1, 2]).unwrap();
        let vbo = backend.create_vertex_buffer(&[0.0; 9]).unwrap();
        let vao = backend.create_vertex_array().unwrap();
        backend
            .bind_vertex_attribute(vao, VertexAttribute::Position, vbo)
            .unwrap();

        assert_eq!(backend.index_data(ibo), Some(&[0, 1, 2][..]));
        assert_eq!(backend.vertex_data(vbo).map(|d| d.len()), Some(9));
        assert_eq!(
            backend.attribute_buffer(vao, VertexAttribute::Position),
            Some(vbo)
        );
        assert_eq!(backend.attributes(vao), vec![VertexAttribute::Position]);
    }

    #[test]
    fn test_binding_index_buffer_as_stream_fails() {
        let mut backend = RecordingBackend::new();
        let ibo = backend.create_index_buffer(&[0, 1, 2]).unwrap();
        let vao = backend.create_vertex_array().unwrap();
        let result = backend.bind_vertex_attribute(vao, VertexAttribute::Normal, ibo);
        assert!(matches!(result, Err(BackendError::UnknownBuffer(_))));
    }

    #[test]
    fn test_released_handles_are_unknown() {
        let mut backend = RecordingBackend::new();
        let ibo = backend.create_index_buffer(&[0, 1, 2]).unwrap();
        let vbo = backend.create_vertex_buffer(&[0.0; 9]).unwrap();
        let vao = backend.create_vertex_array().unwrap();
        assert_eq!(backend.buffer_count(), 2);

        backend.release_buffer(vbo).unwrap();
        backend.release_vertex_array(vao).unwrap();
        assert_eq!(backend.buffer_count(), 1);
        assert_eq!(backend.vertex_array_count(), 0);
        assert!(backend.vertex_data(vbo).is_none());
        assert!(matches!(
            backend.release_buffer(vbo),
            Err(BackendError::UnknownBuffer(_))
        ));
        assert!(matches!(
            backend.release_vertex_array(vao),
            Err(BackendError::UnknownVertexArray(_))
        ));

        let call = DrawCall {
            vertex_array: vao,
            index_buffer: ibo,
            index_count: 3,
            primitive: Primitive::Triangles,
        };
        assert!(backend.draw(&call).is_err());

        // handles are not reused
        let next = backend.create_vertex_buffer(&[0.0; 3]).unwrap();
        assert_ne!(next, vbo);
    }

    #[test]
    fn test_draw_goes_to_bound_target() {
        let mut backend = RecordingBackend::new();
        let ibo = backend.create_index_buffer(&[0, 1, 2]).unwrap();
        let vao = backend.create_vertex_array().unwrap();
        let target = backend.create_render_target(4, 4).unwrap();
        let call = DrawCall {
            vertex_array: vao,
            index_buffer: ibo,
            index_count: 3,
            primitive: Primitive::Triangles,
        };

        backend.bind_render_target(Some(target)).unwrap();
        backend.draw(&call).unwrap();
        backend.bind_render_target(None).unwrap();
        backend.draw(&call).unwrap();

        let draws = backend.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].1, Some(target));
        assert_eq!(draws[1].1, None);
    }

    #[test]
    fn test_pixels_round_trip_and_bounds() {
        let mut backend = RecordingBackend::new();
        let target = backend.create_render_target(2, 2).unwrap();
        backend.paint_pixel(target, 1, 1, [10, 20, 30, 255]).unwrap();
        assert_eq!(backend.read_pixel(target, 1, 1).unwrap(), [10, 20, 30, 255]);
        assert_eq!(backend.read_pixel(target, 0, 0).unwrap(), [0, 0, 0, 0]);
        assert!(matches!(
            backend.read_pixel(target, 2, 0),
            Err(BackendError::PixelOutOfBounds { .. })
        ));

        backend.resize_render_target(target, 8, 8).unwrap();
        assert_eq!(backend.target_size(target), Some((8, 8)));
        assert_eq!(backend.read_pixel(target, 1, 1).unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn test_uniforms_keep_latest_value() {
        let mut backend = RecordingBackend::new();
        backend.set_uniform_matrix(MatrixUniform::ModelView, &Matrix4::identity());
        let moved = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        backend.set_uniform_matrix(MatrixUniform::ModelView, &moved);
        backend.set_uniform_color(ColorUniform::MaterialDiffuse, [1.0, 0.0, 0.0, 1.0]);

        assert_eq!(backend.matrix(MatrixUniform::ModelView), Some(moved));
        assert_eq!(backend.matrix(MatrixUniform::Projection), None);
        assert_eq!(
            backend.color(ColorUniform::MaterialDiffuse),
            Some([1.0, 0.0, 0.0, 1.0])
        );
    }
}
