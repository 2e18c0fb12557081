//! # Geometry Utilities
//!
//! Vertex math for indexed triangle lists and a few procedural helper objects.
//!
//! ## Contents
//!
//! - [`calculate_normals`] / [`calculate_tangents`] - smooth per-vertex vectors
//! - [`axis`] - three line segments along x, y and z
//! - [`floor`] - a square grid of lines on the xz plane
//! - [`cube`] - a textured unit cube
//!
//! ## Usage
//!
//! ```rust
//! use rtgl::gfx::geometry::{calculate_normals, floor};
//!
//! let vertices = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
//! let normals = calculate_normals(&vertices, &[0, 1, 2]);
//! assert_eq!(normals.len(), 9);
//!
//! let grid = floor(80.0, 2);
//! assert_eq!(grid.alias.as_deref(), Some("floor"));
//! ```

pub mod primitives;
pub mod vector_math;

pub use primitives::*;
pub use vector_math::{calculate_normals, calculate_tangents};
