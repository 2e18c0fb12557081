use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use super::material::{Material, MaterialDesc};
use crate::gfx::backend::{BufferHandle, DrawCall, Primitive, VertexArrayHandle};

/// Geometry as read from a model file, before it is admitted to a scene.
///
/// Vertex data is flat: three floats per position, two per texture coordinate and
/// four per colour scalar. Unknown JSON fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryDesc {
    #[serde(default)]
    pub alias: Option<String>,
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_coords: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalars: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wireframe: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(flatten)]
    pub material: MaterialDesc,
}

impl GeometryDesc {
    pub fn new(vertices: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = Some(wireframe);
        self
    }

    pub fn with_texture_coords(mut self, texture_coords: Vec<f32>) -> Self {
        self.texture_coords = Some(texture_coords);
        self
    }

    pub fn with_scalars(mut self, scalars: Vec<f32>) -> Self {
        self.scalars = Some(scalars);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Properties merged over an object after its material defaults are filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picking_color: Option<[f32; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wireframe: Option<bool>,
    #[serde(flatten)]
    pub material: MaterialDesc,
}

impl ObjectOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn position(mut self, position: [f32; 3]) -> Self {
        self.position = Some(position);
        self
    }

    pub fn scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn picking_color(mut self, color: [f32; 4]) -> Self {
        self.picking_color = Some(color);
        self
    }

    pub fn diffuse(mut self, diffuse: [f32; 4]) -> Self {
        self.material.diffuse = Some(diffuse);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = Some(wireframe);
        self
    }
}

/// Backend resources attached when an object joins a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuHandles {
    pub vertex_array: VertexArrayHandle,
    pub index_buffer: BufferHandle,
    pub index_count: u32,
}

/// Identity of an object within its scene. Unlike aliases, ids are never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

/// An object owned by a [`Scene`](super::Scene).
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub(crate) id: ObjectId,
    pub alias: String,
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    pub normals: Vec<f32>,
    pub scalars: Option<Vec<f32>>,
    pub texture_coords: Option<Vec<f32>>,
    pub tangents: Option<Vec<f32>>,
    pub material: Material,
    pub wireframe: bool,
    pub visible: bool,
    pub position: Option<Vector3<f32>>,
    pub scale: Option<Vector3<f32>>,
    pub picking_color: Option<[f32; 4]>,
    /// Diffuse colour saved while the object is highlighted.
    pub previous_diffuse: Option<[f32; 4]>,
    pub(crate) gpu: Option<GpuHandles>,
    /// Attribute stream buffers, released together with the vertex array.
    pub(crate) vertex_buffers: Vec<BufferHandle>,
}

impl Object {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn gpu(&self) -> Option<&GpuHandles> {
        self.gpu.as_ref()
    }

    pub fn primitive(&self) -> Primitive {
        if self.wireframe {
            Primitive::Lines
        } else {
            Primitive::Triangles
        }
    }

    /// Draw request for this object, once its backend resources exist.
    pub fn draw_call(&self) -> Option<DrawCall> {
        self.gpu.map(|gpu| DrawCall {
            vertex_array: gpu.vertex_array,
            index_buffer: gpu.index_buffer,
            index_count: gpu.index_count,
            primitive: self.primitive(),
        })
    }

    pub(crate) fn apply_overrides(&mut self, overrides: &ObjectOverrides) {
        if let Some(alias) = &overrides.alias {
            self.alias = alias.clone();
        }
        if let Some(position) = overrides.position {
            self.position = Some(position.into());
        }
        if let Some(scale) = overrides.scale {
            self.scale = Some(scale.into());
        }
        if overrides.picking_color.is_some() {
            self.picking_color = overrides.picking_color;
        }
        if let Some(visible) = overrides.visible {
            self.visible = visible;
        }
        if let Some(wireframe) = overrides.wireframe {
            self.wireframe = wireframe;
        }
        self.material.apply(&overrides.material);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geometry_file() {
        let json = r#"{
            "alias": "cone",
            "vertices": [0, 0, 0, 1, 0, 0, 0, 1, 0],
            "indices": [0, 1, 2],
            "diffuse": [0.5, 0.5, 0.5, 1],
            "Ns": 96.0,
            "image": "ignored.png"
        }"#;
        let geometry: GeometryDesc = serde_json::from_str(json).unwrap();
        assert_eq!(geometry.alias.as_deref(), Some("cone"));
        assert_eq!(geometry.vertex_count(), 3);
        assert_eq!(geometry.indices, vec![0, 1, 2]);
        assert_eq!(geometry.material.diffuse, Some([0.5, 0.5, 0.5, 1.0]));
        assert_eq!(geometry.material.ns, Some(96.0));
        assert!(geometry.texture_coords.is_none());
    }

    #[test]
    fn test_parse_overrides() {
        let overrides: ObjectOverrides = serde_json::from_str(
            r#"{"position":[0,0,-30],"pickingColor":[0.5,0,0,1],"diffuse":[1,0,0,1]}"#,
        )
        .unwrap();
        assert_eq!(overrides.position, Some([0.0, 0.0, -30.0]));
        assert_eq!(overrides.picking_color, Some([0.5, 0.0, 0.0, 1.0]));
        assert_eq!(overrides.material.diffuse, Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(
            overrides,
            ObjectOverrides::new()
                .position([0.0, 0.0, -30.0])
                .picking_color([0.5, 0.0, 0.0, 1.0])
                .diffuse([1.0, 0.0, 0.0, 1.0])
        );
    }
}
