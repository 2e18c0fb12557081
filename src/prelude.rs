//! # Prelude
//!
//! Commonly used types for writing demos:
//!
//! ```no_run
//! use rtgl::prelude::*;
//!
//! struct Empty;
//!
//! impl Demo<RecordingBackend> for Empty {
//!     fn load(&mut self, ctx: &mut AppContext<RecordingBackend>) -> anyhow::Result<()> {
//!         ctx.scene.add(axis(10.0), None, &mut ctx.backend)?;
//!         Ok(())
//!     }
//! }
//! ```

pub use crate::app::{run_frame, run_windowed, AppContext, Demo, WindowedDemo};
pub use crate::config::RuntimeConfig;
pub use crate::error::{BackendError, CameraError, ConfigError, SceneError};
pub use crate::gfx::{
    backend::{
        PipelineSet, RecordingBackend, RenderBackend, ShaderInterface, VertexAttribute,
        WgpuBackend,
    },
    camera::{Camera, CameraType, Controls},
    geometry::{axis, calculate_normals, calculate_tangents, cube, floor},
    lighting::{Light, LightProperty, LightsManager},
    picking::{HighlightHandler, PickHandler, Picker},
    render::{render_scene, DrawPass},
    scene::{GeometryDesc, Object, ObjectId, ObjectOverrides, Scene},
    transforms::{ProjectionMode, Transforms},
};
pub use crate::logging::{init_logging, LoggingConfig};
pub use crate::time::Clock;

// Math types
pub use cgmath::{Deg, Matrix4, Vector3};
