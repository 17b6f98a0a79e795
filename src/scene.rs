//! Scene graph store: renderable objects and point lights.

use crate::geometry::{EdgesGeometry, Geometry};
use crate::math::{add, multiply_matrix_vector, rotation_xyz, wrap_angle, Vec3};
use std::rc::Rc;

/// 24-bit color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Builds a color from a `0xRRGGBB` value; higher bits are ignored
    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

/// What a mesh was built from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Dodecahedron,
    Sphere,
}

#[derive(Clone, Debug)]
pub enum Shape {
    Mesh { kind: ShapeKind, geometry: Rc<Geometry> },
    LineSegments(Rc<EdgesGeometry>),
}

impl Shape {
    pub fn dodecahedron(radius: f64, detail: usize) -> Self {
        Shape::Mesh {
            kind: ShapeKind::Dodecahedron,
            geometry: Rc::new(Geometry::dodecahedron(radius, detail)),
        }
    }

    pub fn sphere(geometry: Rc<Geometry>) -> Self {
        Shape::Mesh {
            kind: ShapeKind::Sphere,
            geometry,
        }
    }

    /// Feature edges of a subdivided octahedron
    pub fn octahedron_edges(radius: f64, detail: usize, threshold_degrees: f64) -> Self {
        let geometry = Geometry::octahedron(radius, detail);
        Shape::LineSegments(Rc::new(EdgesGeometry::from_geometry(
            &geometry,
            threshold_degrees,
        )))
    }

    pub fn mesh_kind(&self) -> Option<ShapeKind> {
        match self {
            Shape::Mesh { kind, .. } => Some(*kind),
            Shape::LineSegments(_) => None,
        }
    }
}

/// Visual style of an object
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Rgb,
    pub wireframe: bool,
    pub line_width: u32,
}

impl Material {
    pub fn basic(color: Rgb) -> Self {
        Material {
            color,
            wireframe: false,
            line_width: 1,
        }
    }

    pub fn wireframe(color: Rgb) -> Self {
        Material {
            wireframe: true,
            ..Material::basic(color)
        }
    }

    pub fn line(color: Rgb, line_width: u32) -> Self {
        Material {
            line_width: line_width.max(1),
            ..Material::basic(color)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, XYZ order
    pub rotation: Vec3,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Transform {
            position,
            rotation: [0.0; 3],
        }
    }

    /// Maps a local-space point into world space
    pub fn apply(&self, point: &Vec3) -> Vec3 {
        if self.rotation == [0.0; 3] {
            return add(point, &self.position);
        }
        add(
            &multiply_matrix_vector(&rotation_xyz(&self.rotation), point),
            &self.position,
        )
    }

    /// Adds `delta` to the X and Y rotation, keeping both in [0, 2π)
    pub fn rotate_xy(&mut self, delta: f64) {
        self.rotation[0] = wrap_angle(self.rotation[0] + delta);
        self.rotation[1] = wrap_angle(self.rotation[1] + delta);
    }
}

#[derive(Clone, Debug)]
pub struct SceneObject {
    pub shape: Shape,
    pub material: Material,
    pub transform: Transform,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub color: Rgb,
    pub intensity: f64,
    /// Range beyond which the light has no effect
    pub distance: f64,
    pub position: Vec3,
}

/// Handle to an object in a [`Scene`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

/// Every object and light eligible for drawing. Objects are never removed, so
/// an [`ObjectId`] stays valid for the scene's lifetime.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    lights: Vec<PointLight>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id.0)
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn count_meshes(&self, kind: ShapeKind) -> usize {
        self.objects
            .iter()
            .filter(|object| object.shape.mesh_kind() == Some(kind))
            .count()
    }

    pub fn count_line_segments(&self) -> usize {
        self.objects
            .iter()
            .filter(|object| matches!(object.shape, Shape::LineSegments(_)))
            .count()
    }
}
