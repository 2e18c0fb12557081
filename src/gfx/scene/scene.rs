use std::path::{Path, PathBuf};

use crate::{
    error::{BackendError, SceneError},
    gfx::{
        backend::{BufferHandle, RenderBackend, ShaderInterface, VertexAttribute},
        geometry::{calculate_normals, calculate_tangents},
    },
};

use super::{
    material::MaterialDesc,
    object::{GeometryDesc, GpuHandles, Object, ObjectId, ObjectOverrides},
};

/// Proof that a load was started during a particular scene epoch.
///
/// [`Scene::clear`] starts a new epoch, so loads begun before it are discarded when
/// they complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    epoch: u64,
}

/// Ordered collection of renderable objects.
///
/// The list order is the render order. Every object admitted through [`Scene::add`]
/// owns exactly one index buffer and one vertex array in the backend, released again
/// by [`Scene::remove`] and [`Scene::clear`].
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<Object>,
    interface: ShaderInterface,
    epoch: u64,
    next_id: u64,
}

impl Scene {
    /// Creates an empty scene that uploads the streams `interface` declares.
    pub fn new(interface: ShaderInterface) -> Self {
        Self {
            objects: Vec::new(),
            interface,
            epoch: 0,
            next_id: 0,
        }
    }

    pub fn shader_interface(&self) -> &ShaderInterface {
        &self.interface
    }

    /// Changes which attribute streams later `add` calls upload.
    pub fn set_shader_interface(&mut self, interface: ShaderInterface) {
        self.interface = interface;
    }

    /// First object with the given alias.
    pub fn get(&self, alias: &str) -> Option<&Object> {
        self.objects.iter().find(|object| object.alias == alias)
    }

    pub fn get_mut(&mut self, alias: &str) -> Option<&mut Object> {
        self.objects.iter_mut().find(|object| object.alias == alias)
    }

    pub fn get_by_id(&self, id: ObjectId) -> Option<&Object> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn get_by_id_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.iter_mut().find(|object| object.id == id)
    }

    /// Render position of the first object with the given alias.
    pub fn position(&self, alias: &str) -> Option<usize> {
        self.objects.iter().position(|object| object.alias == alias)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Aliases in render order.
    pub fn aliases(&self) -> Vec<&str> {
        self.objects.iter().map(|object| object.alias.as_str()).collect()
    }

    /// Reads and parses a JSON geometry file without touching the scene.
    pub fn read_geometry(path: impl AsRef<Path>) -> Result<GeometryDesc, SceneError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| SceneError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads a JSON geometry file and adds it to the scene.
    ///
    /// The object is made visible and takes `alias` when given, otherwise the alias
    /// stored in the file.
    pub fn try_load<B: RenderBackend>(
        &mut self,
        path: impl AsRef<Path>,
        alias: Option<&str>,
        overrides: Option<&ObjectOverrides>,
        backend: &mut B,
    ) -> Result<&Object, SceneError> {
        let mut geometry = Self::read_geometry(path)?;
        geometry.visible = Some(true);
        if let Some(alias) = alias {
            geometry.alias = Some(alias.to_string());
        }
        self.add(geometry, overrides, backend)
    }

    /// Like [`Scene::try_load`], but failures are logged together with the
    /// arguments and the object is left out.
    pub fn load<B: RenderBackend>(
        &mut self,
        path: impl AsRef<Path>,
        alias: Option<&str>,
        overrides: Option<&ObjectOverrides>,
        backend: &mut B,
    ) -> bool {
        let path = path.as_ref();
        match self.try_load(path, alias, overrides, backend) {
            Ok(_) => true,
            Err(e) => {
                log::error!(
                    "{} (path: {}, alias: {:?}, overrides: {:?})",
                    e,
                    path.display(),
                    alias,
                    overrides
                );
                false
            }
        }
    }

    /// Loads `{prefix}1.json` through `{prefix}{count}.json`.
    ///
    /// Returns how many parts were added.
    pub fn load_by_parts<B: RenderBackend>(
        &mut self,
        prefix: &str,
        count: usize,
        alias: Option<&str>,
        backend: &mut B,
    ) -> usize {
        (1..=count)
            .filter(|i| {
                let part = PathBuf::from(format!("{}{}.json", prefix, i));
                self.load(&part, alias, None, backend)
            })
            .count()
    }

    /// Loads every model of an OBJ file, with materials from its MTL library.
    ///
    /// A single model takes `alias` (or its own name); several models get an index
    /// suffix. Returns how many objects were added. If any model is rejected, the
    /// models already added by this call are removed again.
    pub fn load_obj<B: RenderBackend>(
        &mut self,
        path: impl AsRef<Path>,
        alias: Option<&str>,
        overrides: Option<&ObjectOverrides>,
        backend: &mut B,
    ) -> Result<usize, SceneError> {
        let path = path.as_ref();
        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| SceneError::Obj {
            path: path.to_path_buf(),
            source,
        })?;

        if models.is_empty() {
            return Err(SceneError::EmptyObj(path.to_path_buf()));
        }

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("no MTL materials for {}: {}", path.display(), e);
            Vec::new()
        });

        let single = models.len() == 1;
        let start = self.objects.len();

        for (i, model) in models.into_iter().enumerate() {
            let base = alias.unwrap_or(model.name.as_str());
            let model_alias = if single {
                base.to_string()
            } else {
                format!("{}_{}", base, i + 1)
            };

            let material = model
                .mesh
                .material_id
                .and_then(|id| materials.get(id))
                .map(MaterialDesc::from_mtl)
                .unwrap_or_default();

            let mesh = model.mesh;
            let geometry = GeometryDesc {
                alias: Some(model_alias),
                vertices: mesh.positions,
                indices: mesh.indices,
                texture_coords: (!mesh.texcoords.is_empty()).then_some(mesh.texcoords),
                scalars: None,
                wireframe: None,
                visible: Some(true),
                material,
            };

            let result = self.add(geometry, overrides, backend).map(|_| ());
            if let Err(e) = result {
                for object in self.objects.split_off(start) {
                    release(&object, backend);
                }
                return Err(e);
            }
        }

        let added = self.objects.len() - start;
        log::info!("Loaded {} object(s) from {}", added, path.display());
        Ok(added)
    }

    /// Admits an object to the end of the render list.
    ///
    /// Missing material fields are filled with defaults before `overrides` are merged.
    /// Backend resources are created for the streams the shader interface declares:
    /// positions, computed normals, colour scalars when present, texture coordinates
    /// when present and computed tangents alongside them.
    pub fn add<B: RenderBackend>(
        &mut self,
        geometry: GeometryDesc,
        overrides: Option<&ObjectOverrides>,
        backend: &mut B,
    ) -> Result<&Object, SceneError> {
        let alias = geometry
            .alias
            .unwrap_or_else(|| format!("object{}", self.objects.len()));

        let mut object = Object {
            id: ObjectId(self.next_id),
            alias,
            normals: Vec::new(),
            tangents: None,
            material: geometry.material.fill(),
            wireframe: geometry.wireframe.unwrap_or(false),
            visible: geometry.visible.unwrap_or(true),
            position: None,
            scale: None,
            picking_color: None,
            previous_diffuse: None,
            gpu: None,
            vertex_buffers: Vec::new(),
            vertices: geometry.vertices,
            indices: geometry.indices,
            scalars: geometry.scalars,
            texture_coords: geometry.texture_coords,
        };

        if let Some(overrides) = overrides {
            object.apply_overrides(overrides);
        }

        validate(&object)?;

        object.normals = calculate_normals(&object.vertices, &object.indices);
        object.tangents = object
            .texture_coords
            .as_ref()
            .map(|uv| calculate_tangents(&object.vertices, uv, &object.indices));

        let (gpu, vertex_buffers) = self.upload(&object, backend)?;
        object.gpu = Some(gpu);
        object.vertex_buffers = vertex_buffers;
        self.next_id += 1;

        log::debug!(
            "Added '{}' ({} vertices, {} indices)",
            object.alias,
            object.vertex_count(),
            object.indices.len()
        );

        let index = self.objects.len();
        self.objects.push(object);
        Ok(&self.objects[index])
    }

    /// Creates the index buffer, vertex array and declared attribute streams.
    ///
    /// Anything created before a failure is released again.
    fn upload<B: RenderBackend>(
        &self,
        object: &Object,
        backend: &mut B,
    ) -> Result<(GpuHandles, Vec<BufferHandle>), SceneError> {
        let mut streams: Vec<(VertexAttribute, &[f32])> = vec![
            (VertexAttribute::Position, object.vertices.as_slice()),
            (VertexAttribute::Normal, object.normals.as_slice()),
        ];
        if let Some(scalars) = &object.scalars {
            streams.push((VertexAttribute::Color, scalars.as_slice()));
        }
        if let Some(texture_coords) = &object.texture_coords {
            streams.push((VertexAttribute::TextureCoords, texture_coords.as_slice()));
            if let Some(tangents) = &object.tangents {
                streams.push((VertexAttribute::Tangent, tangents.as_slice()));
            }
        }
        streams.retain(|(attribute, _)| self.interface.declares(*attribute));

        let index_buffer = backend.create_index_buffer(&object.indices)?;
        let vertex_array = match backend.create_vertex_array() {
            Ok(vertex_array) => vertex_array,
            Err(e) => {
                log_release_error(backend.release_buffer(index_buffer));
                return Err(e.into());
            }
        };

        let mut vertex_buffers = Vec::with_capacity(streams.len());
        let mut bind_all = || -> Result<(), SceneError> {
            for (attribute, data) in &streams {
                let buffer = backend.create_vertex_buffer(data)?;
                vertex_buffers.push(buffer);
                backend.bind_vertex_attribute(vertex_array, *attribute, buffer)?;
            }
            Ok(())
        };

        if let Err(e) = bind_all() {
            for buffer in vertex_buffers.into_iter().chain([index_buffer]) {
                log_release_error(backend.release_buffer(buffer));
            }
            log_release_error(backend.release_vertex_array(vertex_array));
            return Err(e);
        }

        let handles = GpuHandles {
            vertex_array,
            index_buffer,
            index_count: object.indices.len() as u32,
        };
        Ok((handles, vertex_buffers))
    }

    /// Visits objects in render order until `f` returns `Some`.
    pub fn traverse<R>(&self, mut f: impl FnMut(&Object, usize) -> Option<R>) -> Option<R> {
        self.objects
            .iter()
            .enumerate()
            .find_map(|(index, object)| f(object, index))
    }

    pub fn traverse_mut<R>(
        &mut self,
        mut f: impl FnMut(&mut Object, usize) -> Option<R>,
    ) -> Option<R> {
        self.objects
            .iter_mut()
            .enumerate()
            .find_map(|(index, object)| f(object, index))
    }

    /// Removes the first object with the given alias and releases its backend
    /// resources. The returned object no longer has GPU handles.
    pub fn remove<B: RenderBackend>(&mut self, alias: &str, backend: &mut B) -> Option<Object> {
        let index = self.position(alias)?;
        let mut object = self.objects.remove(index);
        release(&object, backend);
        object.gpu = None;
        object.vertex_buffers.clear();
        Some(object)
    }

    pub fn render_first(&mut self, alias: &str) {
        let Some(index) = self.position(alias) else {
            return;
        };
        if index == 0 {
            return;
        }

        let object = self.objects.remove(index);
        self.objects.insert(0, object);
        self.log_render_order();
    }

    pub fn render_last(&mut self, alias: &str) {
        let Some(index) = self.position(alias) else {
            return;
        };
        if index + 1 == self.objects.len() {
            return;
        }

        let object = self.objects.remove(index);
        self.objects.push(object);
        self.log_render_order();
    }

    pub fn render_sooner(&mut self, alias: &str) {
        let Some(index) = self.position(alias) else {
            return;
        };
        if index == 0 {
            return;
        }

        self.objects.swap(index, index - 1);
        self.log_render_order();
    }

    pub fn render_later(&mut self, alias: &str) {
        let Some(index) = self.position(alias) else {
            return;
        };
        if index + 1 == self.objects.len() {
            return;
        }

        self.objects.swap(index, index + 1);
        self.log_render_order();
    }

    fn log_render_order(&self) {
        log::info!("Render Order: {}", self.aliases().join(" > "));
    }

    /// Starts a load in the current epoch.
    pub fn begin_load(&self) -> LoadTicket {
        LoadTicket { epoch: self.epoch }
    }

    /// Adds geometry fetched under `ticket`, unless the scene was cleared meanwhile.
    ///
    /// Returns `Ok(false)` when the result was discarded.
    pub fn complete_load<B: RenderBackend>(
        &mut self,
        ticket: LoadTicket,
        geometry: GeometryDesc,
        overrides: Option<&ObjectOverrides>,
        backend: &mut B,
    ) -> Result<bool, SceneError> {
        if ticket.epoch != self.epoch {
            log::info!(
                "Discarding stale load of {:?} (epoch {} != {})",
                geometry.alias,
                ticket.epoch,
                self.epoch
            );
            return Ok(false);
        }

        self.add(geometry, overrides, backend)?;
        Ok(true)
    }

    /// Removes every object, releasing its backend resources, and invalidates
    /// outstanding load tickets.
    pub fn clear<B: RenderBackend>(&mut self, backend: &mut B) {
        for object in self.objects.drain(..) {
            release(&object, backend);
        }
        self.epoch += 1;
    }
}

fn release<B: RenderBackend>(object: &Object, backend: &mut B) {
    let Some(gpu) = object.gpu else {
        return;
    };
    for buffer in object.vertex_buffers.iter().copied().chain([gpu.index_buffer]) {
        log_release_error(backend.release_buffer(buffer));
    }
    log_release_error(backend.release_vertex_array(gpu.vertex_array));
}

fn log_release_error(result: Result<(), BackendError>) {
    if let Err(e) = result {
        log::warn!("failed to release backend resource: {}", e);
    }
}

fn validate(object: &Object) -> Result<(), SceneError> {
    let invalid = |reason: String| SceneError::InvalidGeometry {
        alias: object.alias.clone(),
        reason,
    };

    if object.vertices.len() % 3 != 0 {
        return Err(invalid(format!(
            "{} vertex floats is not a multiple of 3",
            object.vertices.len()
        )));
    }

    let vertex_count = object.vertex_count();

    if let Some(scalars) = &object.scalars {
        if scalars.len() != vertex_count * 4 {
            return Err(invalid(format!(
                "expected {} colour floats, found {}",
                vertex_count * 4,
                scalars.len()
            )));
        }
    }

    if let Some(texture_coords) = &object.texture_coords {
        if texture_coords.len() != vertex_count * 2 {
            return Err(invalid(format!(
                "expected {} texture coordinate floats, found {}",
                vertex_count * 2,
                texture_coords.len()
            )));
        }
    }

    if let Some(&index) = object.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(invalid(format!(
            "index {} is out of range for {} vertices",
            index, vertex_count
        )));
    }

    Ok(())
}
