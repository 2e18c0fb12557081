//! Error types shared across the runtime.
//!
//! Library code returns these enums; demos and the windowed runner wrap them in
//! [`anyhow::Error`] at the application boundary.

use std::path::PathBuf;

use thiserror::Error;

use crate::gfx::backend::{BufferHandle, RenderTargetHandle, VertexArrayHandle};

/// Failures reported by a [`RenderBackend`](crate::gfx::backend::RenderBackend).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferHandle),

    #[error("unknown vertex array {0:?}")]
    UnknownVertexArray(VertexArrayHandle),

    #[error("unknown render target {0:?}")]
    UnknownRenderTarget(RenderTargetHandle),

    #[error("pixel ({x}, {y}) is outside the {width}x{height} render target")]
    PixelOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("render target size must be non-zero, got {width}x{height}")]
    EmptyRenderTarget { width: u32, height: u32 },

    #[error("no uniform slots left this frame (capacity {capacity})")]
    UniformSlotsExhausted { capacity: usize },

    #[error("pixel readback failed: {0}")]
    Readback(String),

    #[error("failed to initialise GPU: {0}")]
    Initialization(String),

    #[error("surface error: {0}")]
    Surface(String),
}

/// Failures while building or loading scene objects.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse geometry in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to load OBJ {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ {0} contains no models")]
    EmptyObj(PathBuf),

    #[error("invalid geometry for '{alias}': {reason}")]
    InvalidGeometry { alias: String, reason: String },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Camera configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera type ({0}) not supported")]
    UnsupportedType(String),
}

/// Runtime configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
