use crate::geometry::Geometry;
use crate::math::Vec3;
use crate::scene::{Material, ObjectId, Rgb, Scene, SceneObject, Shape, Transform};
use crate::starfield::STAR_SEGMENTS;
use std::rc::Rc;

/// Fixed group of marker stars
pub type ConstellationGroup = [Vec3; 4];

pub const CONSTELLATION_COLOR: Rgb = Rgb::from_hex(0xffcc00);
pub const CONSTELLATION_STAR_SIZE: f64 = 0.15;

pub const CONSTELLATIONS: [ConstellationGroup; 7] = [
    [
        [-30.0, 10.0, -50.0],
        [-20.0, 20.0, -40.0],
        [-10.0, 0.0, -30.0],
        [-25.0, -5.0, -35.0],
    ],
    [
        [20.0, -20.0, 20.0],
        [15.0, -15.0, 25.0],
        [10.0, -25.0, 30.0],
        [25.0, -10.0, 15.0],
    ],
    [
        [-15.0, 15.0, 10.0],
        [-10.0, 25.0, 15.0],
        [-5.0, 20.0, 20.0],
        [-20.0, 10.0, 5.0],
    ],
    [
        [30.0, -10.0, -30.0],
        [25.0, -5.0, -25.0],
        [20.0, -20.0, -20.0],
        [35.0, -15.0, -10.0],
    ],
    [
        [0.0, 30.0, 0.0],
        [-10.0, 35.0, 5.0],
        [10.0, 35.0, -5.0],
        [5.0, 40.0, 0.0],
    ],
    [
        [-35.0, 0.0, 35.0],
        [-30.0, 5.0, 30.0],
        [-25.0, -5.0, 25.0],
        [-40.0, -10.0, 40.0],
    ],
    [
        [15.0, 10.0, 15.0],
        [20.0, 5.0, 10.0],
        [25.0, -5.0, 5.0],
        [30.0, 0.0, 0.0],
    ],
];

/// Adds one gold marker sphere per coordinate, group by group
pub fn place_constellations(scene: &mut Scene, groups: &[ConstellationGroup]) -> Vec<ObjectId> {
    let geometry = Rc::new(Geometry::sphere(
        CONSTELLATION_STAR_SIZE,
        STAR_SEGMENTS,
        STAR_SEGMENTS,
    ));

    groups
        .iter()
        .flatten()
        .map(|point| {
            scene.add(SceneObject {
                shape: Shape::sphere(Rc::clone(&geometry)),
                material: Material::basic(CONSTELLATION_COLOR),
                transform: Transform::at(*point),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_layout_places_28_stars_at_literal_coordinates() {
        let mut scene = Scene::new();
        let ids = place_constellations(&mut scene, &CONSTELLATIONS);
        assert_eq!(ids.len(), 28);

        let expected: Vec<Vec3> = CONSTELLATIONS.iter().flatten().copied().collect();
        let placed: Vec<Vec3> = ids
            .iter()
            .map(|id| scene.get(*id).unwrap().transform.position)
            .collect();
        assert_eq!(placed, expected);
        assert_eq!(placed[4], [20.0, -20.0, 20.0]);
        assert!(scene
            .objects()
            .iter()
            .all(|o| o.material.color == CONSTELLATION_COLOR));
    }

    #[test]
    fn layout_is_deterministic() {
        let positions = || {
            let mut scene = Scene::new();
            place_constellations(&mut scene, &CONSTELLATIONS);
            scene
                .objects()
                .iter()
                .map(|o| o.transform.position)
                .collect::<Vec<_>>()
        };
        assert_eq!(positions(), positions());
    }

    #[test]
    fn empty_list_places_nothing() {
        let mut scene = Scene::new();
        assert!(place_constellations(&mut scene, &[]).is_empty());
        assert!(scene.is_empty());
    }
}
