use crate::geometry::Geometry;
use crate::scene::{Material, ObjectId, Rgb, Scene, SceneObject, Shape, Transform};
use rand::Rng;
use std::rc::Rc;

/// Half the side length of the cube stars are scattered in
pub const STAR_FIELD_EXTENT: f64 = 100.0;

/// Sphere tessellation used for every star marker
pub const STAR_SEGMENTS: usize = 8;

/// Source of uniformly distributed floats
pub trait RandomSource {
    /// Uniform sample from `[low, high)`
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

impl<R: Rng> RandomSource for R {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.gen::<f64>()
    }
}

/// Adds `count` star spheres of radius `size`, each at a uniform position in
/// the cube `[-100, 100]^3` with a uniform random 24-bit color.
///
/// Samples are drawn per star in the order x, y, z, color.
pub fn generate_stars(
    scene: &mut Scene,
    count: usize,
    size: f64,
    rng: &mut impl RandomSource,
) -> Vec<ObjectId> {
    let geometry = Rc::new(Geometry::sphere(size, STAR_SEGMENTS, STAR_SEGMENTS));

    (0..count)
        .map(|_| {
            let position = [
                rng.uniform(-STAR_FIELD_EXTENT, STAR_FIELD_EXTENT),
                rng.uniform(-STAR_FIELD_EXTENT, STAR_FIELD_EXTENT),
                rng.uniform(-STAR_FIELD_EXTENT, STAR_FIELD_EXTENT),
            ];
            let color = Rgb::from_hex((rng.uniform(0.0, 1.0) * 0xffffff as f64) as u32);

            scene.add(SceneObject {
                shape: Shape::sphere(Rc::clone(&geometry)),
                material: Material::basic(color),
                transform: Transform::at(position),
            })
        })
        .collect()
}
