use std::f64::consts::TAU;

/// 3-component vector
pub type Vec3 = [f64; 3];

/// Row-major 3x3 matrix
pub type Mat3 = [[f64; 3]; 3];

/// Row-major 4x4 matrix
pub type Mat4 = [[f64; 4]; 4];

pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(a: &Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(u: &Vec3, v: &Vec3) -> Vec3 {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

pub fn length(a: &Vec3) -> f64 {
    dot(a, a).sqrt()
}

/// Returns the unit vector along `a`, or `a` itself when it has zero length
pub fn normalize(a: &Vec3) -> Vec3 {
    let len = length(a);
    if len == 0.0 {
        *a
    } else {
        scale(a, 1.0 / len)
    }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn lerp_vec(a: &Vec3, b: &Vec3, t: f64) -> Vec3 {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

/// Wraps an angle into [0, 2π)
pub fn wrap_angle(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// Edge function used in rasterization
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &Mat3, vector: &Vec3) -> Vec3 {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies two 3x3 matrices
pub fn multiply_matrices(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Multiplies two 4x4 matrices
pub fn multiply_matrices4(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut result = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Transforms a point by a 4x4 matrix, returning homogeneous coordinates
pub fn transform_point4(matrix: &Mat4, point: &Vec3) -> [f64; 4] {
    let p = [point[0], point[1], point[2], 1.0];
    let mut result = [0.0; 4];
    for i in 0..4 {
        for j in 0..4 {
            result[i] += matrix[i][j] * p[j];
        }
    }
    result
}

/// Rotation matrix for Euler angles applied in XYZ order
pub fn rotation_xyz(angles: &Vec3) -> Mat3 {
    let (sin_x, cos_x) = angles[0].sin_cos();
    let (sin_y, cos_y) = angles[1].sin_cos();
    let (sin_z, cos_z) = angles[2].sin_cos();

    let rotation_x = [[1.0, 0.0, 0.0], [0.0, cos_x, -sin_x], [0.0, sin_x, cos_x]];
    let rotation_y = [[cos_y, 0.0, sin_y], [0.0, 1.0, 0.0], [-sin_y, 0.0, cos_y]];
    let rotation_z = [[cos_z, -sin_z, 0.0], [sin_z, cos_z, 0.0], [0.0, 0.0, 1.0]];

    multiply_matrices(&multiply_matrices(&rotation_x, &rotation_y), &rotation_z)
}

/// Right-handed view matrix for an eye looking at `target` with +Y up
pub fn look_at(eye: &Vec3, target: &Vec3) -> Mat4 {
    let mut forward = normalize(&sub(eye, target));
    if length(&forward) == 0.0 {
        forward = [0.0, 0.0, 1.0];
    }
    let mut right = cross(&[0.0, 1.0, 0.0], &forward);
    if length(&right) < 1e-12 {
        // Looking straight along Y; nudge the basis off the pole
        right = cross(&[0.0, 0.0, 1.0], &forward);
    }
    let right = normalize(&right);
    let up = cross(&forward, &right);

    [
        [right[0], right[1], right[2], -dot(&right, eye)],
        [up[0], up[1], up[2], -dot(&up, eye)],
        [forward[0], forward[1], forward[2], -dot(&forward, eye)],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// OpenGL-style perspective projection; `fov_degrees` is the vertical field of view
pub fn perspective(fov_degrees: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
    let f = 1.0 / (fov_degrees.to_radians() / 2.0).tan();
    // A zero-width surface collapses x instead of scaling it to infinity
    let x_scale = if aspect > 0.0 { f / aspect } else { 0.0 };
    [
        [x_scale, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, (far + near) / (near - far), 2.0 * far * near / (near - far)],
        [0.0, 0.0, -1.0, 0.0],
    ]
}
