//! # Scene Management Module
//!
//! An ordered render list of objects. Objects enter through [`Scene::add`] (or one of
//! the loaders built on it), which fills in material defaults, derives normals and
//! tangents and creates the backend buffers the active shader interface asks for.
//!
//! ## Key Components
//!
//! - [`Scene`] - the render list, with lookup, reordering and traversal
//! - [`Object`] - one renderable object with geometry, material and backend handles
//! - [`GeometryDesc`] - geometry as stored in JSON model files
//! - [`ObjectOverrides`] - properties merged over an object when it is added
//! - [`Material`] / [`MaterialDesc`] - filled and partial surface properties
//!
//! ## Usage
//!
//! ```no_run
//! use rtgl::gfx::backend::{RecordingBackend, ShaderInterface};
//! use rtgl::gfx::scene::{ObjectOverrides, Scene};
//!
//! let mut backend = RecordingBackend::new();
//! let mut scene = Scene::new(ShaderInterface::all());
//!
//! let overrides = ObjectOverrides::new().position([0.0, 0.0, -30.0]);
//! scene.load("models/cone.json", Some("cone"), Some(&overrides), &mut backend);
//! scene.render_first("cone");
//! ```

pub mod material;
pub mod object;
pub mod scene;

// Re-export main types
pub use material::{Material, MaterialDesc};
pub use object::{GeometryDesc, GpuHandles, Object, ObjectId, ObjectOverrides};
pub use scene::{LoadTicket, Scene};
