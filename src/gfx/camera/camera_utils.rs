use cgmath::Matrix4;

/// Remaps OpenGL clip-space depth (-1..1) onto the 0..1 range wgpu expects.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = matrix4[i][j];
        }
    }

    result
}

/// Wraps an accumulated angle in degrees.
///
/// Values strictly outside [-360, 360] keep the truncated remainder, so 370 becomes
/// 10 and -400 becomes -40 while 360 itself is left alone.
pub fn wrap_degrees(angle: f32) -> f32 {
    if angle > 360.0 || angle < -360.0 {
        angle % 360.0
    } else {
        angle
    }
}
