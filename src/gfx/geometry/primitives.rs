//! # Helper Objects
//!
//! Procedural geometry returned as [`GeometryDesc`] so it can be passed straight to
//! [`Scene::add`](crate::gfx::scene::Scene::add).

use crate::gfx::scene::GeometryDesc;

/// Alias of the grid produced by [`floor`]; pickers skip it by default.
pub const FLOOR_ALIAS: &str = "floor";

/// Alias of the lines produced by [`axis`].
pub const AXIS_ALIAS: &str = "axis";

/// Three axis-aligned line segments through the origin.
///
/// The x and z lines span `[-dimension, dimension]`; the y line is half as long.
pub fn axis(dimension: f32) -> GeometryDesc {
    #[rustfmt::skip]
    let vertices = vec![
        -dimension, 0.0, 0.0,              dimension, 0.0, 0.0,
        0.0, -dimension / 2.0, 0.0,        0.0, dimension / 2.0, 0.0,
        0.0, 0.0, -dimension,              0.0, 0.0, dimension,
    ];

    GeometryDesc::new(vertices, vec![0, 1, 2, 3, 4, 5])
        .with_alias(AXIS_ALIAS)
        .with_wireframe(true)
}

/// A square grid of `lines + 1` lines in each direction on the y = 0 plane.
pub fn floor(dimension: f32, lines: u32) -> GeometryDesc {
    let lines = lines.max(1);
    let increment = 2.0 * dimension / lines as f32;
    let line_count = (lines + 1) as usize;

    let mut vertices = Vec::with_capacity(line_count * 12);
    let mut indices = Vec::with_capacity(line_count * 4);

    // Lines parallel to x
    for l in 0..line_count {
        let z = -dimension + l as f32 * increment;
        vertices.extend_from_slice(&[-dimension, 0.0, z, dimension, 0.0, z]);
    }

    // Lines parallel to z
    for l in 0..line_count {
        let x = -dimension + l as f32 * increment;
        vertices.extend_from_slice(&[x, 0.0, -dimension, x, 0.0, dimension]);
    }

    for i in 0..(line_count * 4) as u32 {
        indices.push(i);
    }

    GeometryDesc::new(vertices, indices)
        .with_alias(FLOOR_ALIAS)
        .with_wireframe(true)
}

/// Unit cube centred at the origin, with per-face texture coordinates.
pub fn cube(alias: &str) -> GeometryDesc {
    #[rustfmt::skip]
    let positions: [[f32; 3]; 24] = [
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    #[rustfmt::skip]
    let tex_coords: [[f32; 2]; 24] = [
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0],
        [1.0, 0.0], [0.0, 0.0], [0.0, 1.0], [1.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
    ];

    // Two counter-clockwise triangles per face
    let indices = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect();

    GeometryDesc::new(positions.concat(), indices)
        .with_alias(alias)
        .with_texture_coords(tex_coords.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::calculate_normals;

    #[test]
    fn test_axis() {
        let axis = axis(10.0);
        assert_eq!(axis.vertices.len(), 18);
        assert_eq!(axis.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(axis.wireframe, Some(true));
        assert_eq!(&axis.vertices[6..12], &[0.0, -5.0, 0.0, 0.0, 5.0, 0.0]);
    }

    #[test]
    fn test_floor_grid() {
        let floor = floor(50.0, 5);
        assert_eq!(floor.alias.as_deref(), Some(FLOOR_ALIAS));
        assert_eq!(floor.vertex_count(), 24);
        assert_eq!(floor.indices.len(), 24);
        assert_eq!(*floor.indices.last().unwrap(), 23);
        // First line runs along x at z = -50
        assert_eq!(&floor.vertices[0..6], &[-50.0, 0.0, -50.0, 50.0, 0.0, -50.0]);
        assert!(floor.vertices.chunks(3).all(|v| v[1] == 0.0));
    }

    #[test]
    fn test_cube_faces_point_outwards() {
        let cube = cube("box");
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert_eq!(cube.texture_coords.as_ref().map(|t| t.len()), Some(48));

        let normals = calculate_normals(&cube.vertices, &cube.indices);
        for (position, normal) in cube.vertices.chunks(3).zip(normals.chunks(3)) {
            let dot: f32 = position.iter().zip(normal).map(|(p, n)| p * n).sum();
            assert!(dot > 0.0);
        }
    }
}
