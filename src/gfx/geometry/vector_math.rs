//! Per-vertex normal and tangent generation for indexed triangle lists.
//!
//! Both functions take flat buffers (`[x, y, z, x, y, z, ...]`) and return a flat buffer
//! of the same length as `vertices`. Vertices no triangle references, or whose
//! accumulated vector cancels out, come back as `[0, 0, 0]`.

use cgmath::{InnerSpace, Vector2, Vector3, Zero};

/// UV determinant below which a triangle contributes no tangent.
const DEGENERATE_UV_EPSILON: f32 = 1e-6;

fn vertex_at(vertices: &[f32], index: usize) -> Vector3<f32> {
    Vector3::new(
        vertices[3 * index],
        vertices[3 * index + 1],
        vertices[3 * index + 2],
    )
}

/// Resolves a triangle to vertex indices, or `None` when any index is out of range.
fn triangle(chunk: &[u32], vertex_count: usize) -> Option<[usize; 3]> {
    let corners = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];
    if corners.iter().all(|&i| i < vertex_count) {
        Some(corners)
    } else {
        log::warn!(
            "skipping triangle {:?}: only {} vertices available",
            chunk,
            vertex_count
        );
        None
    }
}

/// Divides each accumulated vector by its length; zero-length vectors stay zero.
fn normalize_accumulated(accumulated: Vec<Vector3<f32>>) -> Vec<f32> {
    accumulated
        .into_iter()
        .flat_map(|v| {
            let length = v.magnitude();
            let v = if length == 0.0 { v } else { v / length };
            [v.x, v.y, v.z]
        })
        .collect()
}

/// Calculates smooth per-vertex normals.
///
/// Each triangle `(v0, v1, v2)` contributes `(v2 - v1) x (v0 - v1)` to its three
/// corners; the sums are normalised afterwards. Only complete triangles are read.
pub fn calculate_normals(vertices: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = vertices.len() / 3;
    let mut normals = vec![Vector3::zero(); vertex_count];

    for chunk in indices.chunks_exact(3) {
        let Some([i0, i1, i2]) = triangle(chunk, vertex_count) else {
            continue;
        };

        let v0 = vertex_at(vertices, i0);
        let v1 = vertex_at(vertices, i1);
        let v2 = vertex_at(vertices, i2);

        let normal = (v2 - v1).cross(v0 - v1);

        normals[i0] += normal;
        normals[i1] += normal;
        normals[i2] += normal;
    }

    normalize_accumulated(normals)
}

/// Calculates per-vertex tangents from positions and texture coordinates.
///
/// `texture_coords` holds two floats per vertex. Triangles whose UV mapping is
/// degenerate contribute nothing.
pub fn calculate_tangents(vertices: &[f32], texture_coords: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = (vertices.len() / 3).min(texture_coords.len() / 2);
    let mut tangents = vec![Vector3::zero(); vertices.len() / 3];

    let uv_at = |i: usize| Vector2::new(texture_coords[2 * i], texture_coords[2 * i + 1]);

    for chunk in indices.chunks_exact(3) {
        let Some([i0, i1, i2]) = triangle(chunk, vertex_count) else {
            continue;
        };

        let v0 = vertex_at(vertices, i0);
        let edge1 = vertex_at(vertices, i1) - v0;
        let edge2 = vertex_at(vertices, i2) - v0;

        let uv0 = uv_at(i0);
        let delta_uv1 = uv_at(i1) - uv0;
        let delta_uv2 = uv_at(i2) - uv0;

        let det = delta_uv1.x * delta_uv2.y - delta_uv2.x * delta_uv1.y;
        if det.abs() < DEGENERATE_UV_EPSILON {
            continue;
        }

        let tangent = (edge1 * delta_uv2.y - edge2 * delta_uv1.y) / det;

        tangents[i0] += tangent;
        tangents[i1] += tangent;
        tangents[i2] += tangent;
    }

    normalize_accumulated(tangents)
}
