//! Mesh construction: regular polyhedra, UV spheres and feature-edge extraction.

use crate::math::{cross, dot, length, lerp_vec, normalize, scale, sub, Vec3};
use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

/// Indexed triangle mesh
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[usize; 3]>,
}

/// Flat list of line segments, as produced by edge extraction
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgesGeometry {
    pub segments: Vec<[Vec3; 2]>,
}

struct EdgeRecord {
    normal: Vec3,
    endpoints: [Vec3; 2],
    /// Set once a second face shares the edge
    visible: Option<bool>,
}

/// Precision used when welding coincident vertices
const WELD_PRECISION: f64 = 1e4;

fn weld_key(v: &Vec3) -> [i64; 3] {
    [
        (v[0] * WELD_PRECISION).round() as i64,
        (v[1] * WELD_PRECISION).round() as i64,
        (v[2] * WELD_PRECISION).round() as i64,
    ]
}

impl Geometry {
    /// Builds a polyhedron from base vertices and faces, subdividing each face
    /// `detail` times and projecting every vertex onto a sphere of `radius`.
    pub fn polyhedron(base: &[Vec3], faces: &[[usize; 3]], radius: f64, detail: usize) -> Self {
        let mut geometry = Geometry::default();
        let mut welded: HashMap<[i64; 3], usize> = HashMap::new();

        let mut push = |geometry: &mut Geometry, v: Vec3| -> usize {
            let v = scale(&normalize(&v), radius);
            *welded.entry(weld_key(&v)).or_insert_with(|| {
                geometry.vertices.push(v);
                geometry.vertices.len() - 1
            })
        };

        let cols = detail + 1;
        for face in faces {
            let (a, b, c) = (base[face[0]], base[face[1]], base[face[2]]);

            // Rows of points from edge a-b towards apex c
            let mut rows: Vec<Vec<Vec3>> = Vec::with_capacity(cols + 1);
            for i in 0..=cols {
                let t = i as f64 / cols as f64;
                let start = lerp_vec(&a, &c, t);
                let end = lerp_vec(&b, &c, t);
                let count = cols - i;
                let row = (0..=count)
                    .map(|j| {
                        if count == 0 {
                            start
                        } else {
                            lerp_vec(&start, &end, j as f64 / count as f64)
                        }
                    })
                    .collect();
                rows.push(row);
            }

            for i in 0..cols {
                for j in 0..2 * (cols - i) - 1 {
                    let k = j / 2;
                    let tri = if j % 2 == 0 {
                        [rows[i][k + 1], rows[i + 1][k], rows[i][k]]
                    } else {
                        [rows[i][k + 1], rows[i + 1][k + 1], rows[i + 1][k]]
                    };
                    let indices = [
                        push(&mut geometry, tri[0]),
                        push(&mut geometry, tri[1]),
                        push(&mut geometry, tri[2]),
                    ];
                    geometry.triangles.push(indices);
                }
            }
        }

        geometry
    }

    /// Regular dodecahedron; each pentagonal face is fanned into three triangles
    pub fn dodecahedron(radius: f64, detail: usize) -> Self {
        let t = (1.0 + 5f64.sqrt()) / 2.0;
        let r = 1.0 / t;

        let vertices = [
            // (±1, ±1, ±1)
            [-1.0, -1.0, -1.0],
            [-1.0, -1.0, 1.0],
            [-1.0, 1.0, -1.0],
            [-1.0, 1.0, 1.0],
            [1.0, -1.0, -1.0],
            [1.0, -1.0, 1.0],
            [1.0, 1.0, -1.0],
            [1.0, 1.0, 1.0],
            // (0, ±1/φ, ±φ)
            [0.0, -r, -t],
            [0.0, -r, t],
            [0.0, r, -t],
            [0.0, r, t],
            // (±1/φ, ±φ, 0)
            [-r, -t, 0.0],
            [-r, t, 0.0],
            [r, -t, 0.0],
            [r, t, 0.0],
            // (±φ, 0, ±1/φ)
            [-t, 0.0, -r],
            [t, 0.0, -r],
            [-t, 0.0, r],
            [t, 0.0, r],
        ];

        let faces = [
            [3, 11, 7],
            [3, 7, 15],
            [3, 15, 13],
            [7, 19, 17],
            [7, 17, 6],
            [7, 6, 15],
            [17, 4, 8],
            [17, 8, 10],
            [17, 10, 6],
            [8, 0, 16],
            [8, 16, 2],
            [8, 2, 10],
            [0, 12, 1],
            [0, 1, 18],
            [0, 18, 16],
            [6, 10, 2],
            [6, 2, 13],
            [6, 13, 15],
            [2, 16, 18],
            [2, 18, 3],
            [2, 3, 13],
            [18, 1, 9],
            [18, 9, 11],
            [18, 11, 3],
            [4, 14, 12],
            [4, 12, 0],
            [4, 0, 8],
            [11, 9, 5],
            [11, 5, 19],
            [11, 19, 7],
            [19, 5, 14],
            [19, 14, 4],
            [19, 4, 17],
            [1, 12, 14],
            [1, 14, 5],
            [1, 5, 9],
        ];

        Self::polyhedron(&vertices, &faces, radius, detail)
    }

    /// Regular octahedron, optionally subdivided towards a sphere
    pub fn octahedron(radius: f64, detail: usize) -> Self {
        let vertices = [
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ];
        let faces = [
            [0, 2, 4],
            [0, 4, 3],
            [0, 3, 5],
            [0, 5, 2],
            [1, 2, 5],
            [1, 5, 3],
            [1, 3, 4],
            [1, 4, 2],
        ];

        Self::polyhedron(&vertices, &faces, radius, detail)
    }

    /// UV sphere with the given number of longitude and latitude segments
    pub fn sphere(radius: f64, width_segments: usize, height_segments: usize) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut geometry = Geometry::default();

        let mut grid = Vec::with_capacity(height_segments + 1);
        for iy in 0..=height_segments {
            let v = iy as f64 / height_segments as f64;
            let mut row = Vec::with_capacity(width_segments + 1);
            for ix in 0..=width_segments {
                let u = ix as f64 / width_segments as f64;
                let vertex = [
                    -radius * (u * 2.0 * PI).cos() * (v * PI).sin(),
                    radius * (v * PI).cos(),
                    radius * (u * 2.0 * PI).sin() * (v * PI).sin(),
                ];
                row.push(geometry.vertices.len());
                geometry.vertices.push(vertex);
            }
            grid.push(row);
        }

        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];

                // Pole rows collapse to a single triangle
                if iy != 0 {
                    geometry.triangles.push([a, b, d]);
                }
                if iy != height_segments - 1 {
                    geometry.triangles.push([b, c, d]);
                }
            }
        }

        geometry
    }

    /// Unique undirected triangle edges, as drawn by a wireframe material
    pub fn wireframe_edges(&self) -> Vec<[usize; 2]> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for tri in &self.triangles {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = [a.min(b), a.max(b)];
                if seen.insert(key) {
                    edges.push(key);
                }
            }
        }
        edges
    }

    /// Axis-aligned bounding radius around the origin
    pub fn bounding_radius(&self) -> f64 {
        self.vertices
            .iter()
            .map(|v| dot(v, v).sqrt())
            .fold(0.0, f64::max)
    }

    fn face_normal(&self, tri: &[usize; 3]) -> Vec3 {
        let a = self.vertices[tri[0]];
        let b = self.vertices[tri[1]];
        let c = self.vertices[tri[2]];
        normalize(&cross(&sub(&b, &a), &sub(&c, &a)))
    }
}

impl EdgesGeometry {
    /// Extracts the feature edges of `geometry`: edges bordering only one
    /// triangle, or whose adjacent face normals differ by more than
    /// `threshold_degrees`.
    pub fn from_geometry(geometry: &Geometry, threshold_degrees: f64) -> Self {
        let threshold_dot = threshold_degrees.to_radians().cos();

        let mut records: HashMap<([i64; 3], [i64; 3]), EdgeRecord> = HashMap::new();
        let mut order = Vec::new();

        for tri in &geometry.triangles {
            let normal = geometry.face_normal(tri);
            if normal.iter().any(|n| n.is_nan()) || length(&normal) == 0.0 {
                continue;
            }
            for (ia, ib) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let (va, vb) = (geometry.vertices[ia], geometry.vertices[ib]);
                let (ka, kb) = (weld_key(&va), weld_key(&vb));
                let key = if ka <= kb { (ka, kb) } else { (kb, ka) };
                match records.get_mut(&key) {
                    Some(record) => {
                        if record.visible.is_none() {
                            record.visible = Some(dot(&record.normal, &normal) <= threshold_dot);
                        }
                    }
                    None => {
                        records.insert(
                            key,
                            EdgeRecord {
                                normal,
                                endpoints: [va, vb],
                                visible: None,
                            },
                        );
                        order.push(key);
                    }
                }
            }
        }

        // Unmatched edges border a single face and are always kept
        let segments = order
            .iter()
            .filter_map(|key| records.get(key))
            .filter(|record| record.visible.unwrap_or(true))
            .map(|record| record.endpoints)
            .collect();

        Self { segments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dodecahedron_is_a_closed_triangulated_solid() {
        let geometry = Geometry::dodecahedron(2.0, 0);
        assert_eq!(geometry.vertices.len(), 20);
        assert_eq!(geometry.triangles.len(), 36);
        // 30 pentagon edges plus two fan diagonals per face
        assert_eq!(geometry.wireframe_edges().len(), 54);
        for v in &geometry.vertices {
            assert!((length(v) - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn dodecahedron_feature_edges_skip_fan_diagonals() {
        let edges = EdgesGeometry::from_geometry(&Geometry::dodecahedron(2.0, 0), 1.0);
        assert_eq!(edges.segments.len(), 30);
    }

    #[test]
    fn subdivided_octahedron_counts() {
        let geometry = Geometry::octahedron(3.0, 2);
        assert_eq!(geometry.triangles.len(), 72);
        assert_eq!(geometry.vertices.len(), 38);
        assert_eq!(geometry.wireframe_edges().len(), 108);
        for v in &geometry.vertices {
            assert!((length(v) - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn octahedron_edges_stay_on_the_sphere() {
        let edges = EdgesGeometry::from_geometry(&Geometry::octahedron(3.0, 2), 1.0);
        // No two neighbouring triangles end up coplanar after projection
        assert_eq!(edges.segments.len(), 108);
        for segment in &edges.segments {
            assert!((length(&segment[0]) - 3.0).abs() < 1e-9);
            assert!((length(&segment[1]) - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn plain_octahedron_keeps_all_twelve_edges() {
        let edges = EdgesGeometry::from_geometry(&Geometry::octahedron(1.0, 0), 1.0);
        assert_eq!(edges.segments.len(), 12);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let geometry = Geometry::sphere(0.1, 8, 8);
        assert_eq!(geometry.vertices.len(), 81);
        // Two pole rows of 8 plus six middle rows of 16
        assert_eq!(geometry.triangles.len(), 8 + 8 + 6 * 16);
        assert!((geometry.bounding_radius() - 0.1).abs() < 1e-12);
    }
}
