// src/lib.rs
//! rtgl
//!
//! A small real-time scene runtime built on wgpu and winit: cameras, matrix stacks,
//! an ordered scene of GPU-backed objects, colour-coded picking and a windowed runner
//! for interactive demos.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod logging;
pub mod prelude;
pub mod time;

// Re-export main types for convenience
pub use app::{run_windowed, AppContext, Demo, WindowedDemo};
pub use config::RuntimeConfig;
