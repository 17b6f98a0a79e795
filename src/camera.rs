use crate::math::{look_at, multiply_matrices4, perspective, Mat4, Vec3};

/// Perspective camera with a cached projection matrix.
///
/// Changing `fov`, `aspect`, `near` or `far` has no effect on rendering until
/// [`PerspectiveCamera::update_projection_matrix`] is called.
#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f64, aspect: f64, near: f64, far: f64) -> Self {
        let mut camera = PerspectiveCamera {
            fov,
            aspect,
            near,
            far,
            position: [0.0; 3],
            target: [0.0, 0.0, -1.0],
            projection: [[0.0; 4]; 4],
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = perspective(self.fov, self.aspect, self.near, self.far);
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        look_at(&self.position, &self.target)
    }

    pub fn view_projection(&self) -> Mat4 {
        multiply_matrices4(&self.projection, &self.view_matrix())
    }
}
