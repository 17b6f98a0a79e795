//! Software renderer: projects the scene through a camera into a [`FrameBuffer`].

use crate::camera::PerspectiveCamera;
use crate::graphics::{clip_segment_to_rect, draw_line, draw_triangle, FrameBuffer};
use crate::math::{transform_point4, Mat4, Vec3};
use crate::scene::{Material, Scene, SceneObject, Shape};
use crate::vertex::Vertex;

/// Counters for the most recent draw
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub objects: usize,
    /// Objects entirely behind the near plane
    pub culled: usize,
    /// Meshes too small to tessellate, drawn as one pixel
    pub points: usize,
}

pub struct Renderer {
    frame: FrameBuffer,
    stats: DrawStats,
}

/// Clip-space position of a world point
type ClipPoint = [f64; 4];

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Renderer {
            frame: FrameBuffer::new(width, height),
            stats: DrawStats::default(),
        }
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.frame.resize(width, height);
    }

    pub fn size(&self) -> (usize, usize) {
        (self.frame.width(), self.frame.height())
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn stats(&self) -> DrawStats {
        self.stats
    }

    /// Draws every object in `scene` as seen from `camera`
    pub fn draw(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> DrawStats {
        self.frame.clear();
        self.stats = DrawStats::default();
        if scene.is_empty() || self.frame.width() == 0 || self.frame.height() == 0 {
            return self.stats;
        }

        let view_projection = camera.view_projection();
        let focal = camera.projection_matrix()[1][1];
        for object in scene.objects() {
            self.stats.objects += 1;
            self.draw_object(object, &view_projection, focal, camera.near);
        }

        self.stats
    }

    fn draw_object(&mut self, object: &SceneObject, view_projection: &Mat4, focal: f64, near: f64) {
        let project =
            |local: &Vec3| transform_point4(view_projection, &object.transform.apply(local));
        let material = &object.material;

        match &object.shape {
            Shape::Mesh { geometry, .. } => {
                let center = transform_point4(view_projection, &object.transform.position);
                let radius = geometry.bounding_radius();
                if center[3] + radius < near {
                    self.stats.culled += 1;
                    return;
                }

                // Projected radius in pixels
                let half_height = self.frame.height() as f64 / 2.0;
                let extent = radius * focal / center[3].max(near) * half_height;
                if center[3] >= near && extent < 1.0 {
                    if let Some(vertex) = self.to_screen(&center) {
                        self.frame.plot(
                            vertex.screen_position[0].floor() as isize,
                            vertex.screen_position[1].floor() as isize,
                            vertex.depth,
                            material.color,
                        );
                    }
                    self.stats.points += 1;
                    return;
                }

                let clip: Vec<ClipPoint> = geometry.vertices.iter().map(project).collect();
                if material.wireframe {
                    for [a, b] in geometry.wireframe_edges() {
                        self.draw_clipped_segment(&clip[a], &clip[b], material, near);
                    }
                } else {
                    for tri in &geometry.triangles {
                        let corners = [clip[tri[0]], clip[tri[1]], clip[tri[2]]];
                        if corners.iter().any(|c| c[3] < near) {
                            continue;
                        }
                        let screen: Vec<Vertex> =
                            corners.iter().filter_map(|c| self.to_screen(c)).collect();
                        if let [v0, v1, v2] = screen.as_slice() {
                            draw_triangle(v0, v1, v2, &mut self.frame, material.color);
                        }
                    }
                }
            }
            Shape::LineSegments(edges) => {
                for segment in &edges.segments {
                    let (a, b) = (project(&segment[0]), project(&segment[1]));
                    self.draw_clipped_segment(&a, &b, material, near);
                }
            }
        }
    }

    /// Clips against the near plane and the surface rectangle, then rasterizes
    fn draw_clipped_segment(
        &mut self,
        a: &ClipPoint,
        b: &ClipPoint,
        material: &Material,
        near: f64,
    ) {
        let (a, b) = match (a[3] >= near, b[3] >= near) {
            (false, false) => return,
            (true, true) => (*a, *b),
            (true, false) => (*a, clip_to_near(a, b, near)),
            (false, true) => (clip_to_near(b, a, near), *b),
        };

        let (Some(va), Some(vb)) = (self.to_screen(&a), self.to_screen(&b)) else {
            return;
        };
        let (width, height) = (self.frame.width() as f64, self.frame.height() as f64);
        let Some((t0, t1)) =
            clip_segment_to_rect(&va.screen_position, &vb.screen_position, width, height)
        else {
            return;
        };

        let at = |t: f64| Vertex {
            screen_position: [
                va.screen_position[0] + (vb.screen_position[0] - va.screen_position[0]) * t,
                va.screen_position[1] + (vb.screen_position[1] - va.screen_position[1]) * t,
            ],
            depth: va.depth + (vb.depth - va.depth) * t,
        };
        draw_line(&at(t0), &at(t1), &mut self.frame, material.color, material.line_width);
    }

    fn to_screen(&self, clip: &ClipPoint) -> Option<Vertex> {
        if clip[3] <= 0.0 {
            return None;
        }
        let ndc = [clip[0] / clip[3], clip[1] / clip[3], clip[2] / clip[3]];
        Some(Vertex {
            screen_position: [
                (ndc[0] + 1.0) / 2.0 * self.frame.width() as f64,
                (1.0 - ndc[1]) / 2.0 * self.frame.height() as f64,
            ],
            depth: ndc[2],
        })
    }
}

/// Point on segment `inside`-`outside` where it crosses the near plane
fn clip_to_near(inside: &ClipPoint, outside: &ClipPoint, near: f64) -> ClipPoint {
    let t = (inside[3] - near) / (inside[3] - outside[3]);
    let mut point = [0.0; 4];
    for i in 0..4 {
        point[i] = inside[i] + (outside[i] - inside[i]) * t;
    }
    point
}
