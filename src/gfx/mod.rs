//! # Graphics Module
//!
//! Everything a demo needs to put a scene on screen and interact with it.
//!
//! ## Architecture Overview
//!
//! - **Backend** ([`backend`]) - the [`RenderBackend`](backend::RenderBackend) seam, a
//!   wgpu implementation and a recording implementation for tests
//! - **Camera** ([`camera`]) - orbiting and tracking cameras plus mouse/keyboard controls
//! - **Geometry** ([`geometry`]) - normal and tangent generation, axis/floor/cube builders
//! - **Scene** ([`scene`]) - the ordered object list, loading and render ordering
//! - **Transforms** ([`transforms`]) - model-view, projection and normal matrices
//! - **Picking** ([`picking`]) - colour-coded object picking
//! - **Lighting** ([`lighting`]) - point lights flattened for uniform arrays
//! - **Render** ([`render`]) - the per-object draw loop
//!
//! ## Usage
//!
//! ```no_run
//! use rtgl::gfx::{
//!     backend::{RecordingBackend, ShaderInterface},
//!     camera::{Camera, CameraType},
//!     geometry::axis,
//!     render::{render_scene, DrawPass},
//!     scene::Scene,
//!     transforms::Transforms,
//! };
//!
//! let mut backend = RecordingBackend::new();
//! let mut scene = Scene::new(ShaderInterface::all());
//! scene.add(axis(10.0), None, &mut backend).unwrap();
//!
//! let camera = Camera::new(CameraType::Orbiting);
//! let mut transforms = Transforms::new(&camera, 800, 600);
//! render_scene(&mut backend, &scene, &camera, &mut transforms, DrawPass::Shaded).unwrap();
//! ```

pub mod backend;
pub mod camera;
pub mod geometry;
pub mod lighting;
pub mod picking;
pub mod render;
pub mod scene;
pub mod transforms;

// Re-export commonly used types
pub use backend::{RecordingBackend, RenderBackend, WgpuBackend};
pub use camera::{Camera, CameraType, Controls};
pub use lighting::{Light, LightsManager};
pub use picking::{HighlightHandler, PickHandler, Picker};
pub use render::{render_scene, DrawPass};
pub use scene::Scene;
pub use transforms::{ProjectionMode, Transforms};
