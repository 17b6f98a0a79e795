use crate::camera::PerspectiveCamera;
use crate::config::SceneConfig;
use crate::constellation::{place_constellations, ConstellationGroup};
use crate::controls::OrbitControls;
use crate::renderer::Renderer;
use crate::scene::{
    Material, ObjectId, PointLight, Rgb, Scene, SceneObject, Shape, ShapeKind, Transform,
};
use crate::starfield::{generate_stars, RandomSource};
use tracing::info;

/// Edge angle above which neighbouring faces of the polyhedron get an outline
const EDGE_THRESHOLD_DEGREES: f64 = 1.0;

/// Everything one frame needs: the scene, the camera and its controller, and
/// the output surface
pub struct SceneContext {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub renderer: Renderer,
    /// Objects spun every frame
    pub animated: Vec<ObjectId>,
    /// Radians added to each animated object's X and Y rotation per frame
    pub rotation_step: f64,
}

impl SceneContext {
    /// Composes the scene for a `width` x `height` pixel surface
    pub fn build(
        config: &SceneConfig,
        constellations: &[ConstellationGroup],
        rng: &mut impl RandomSource,
        width: usize,
        height: usize,
    ) -> Self {
        let mut scene = Scene::new();

        let dodecahedron = scene.add(SceneObject {
            shape: Shape::dodecahedron(2.0, 0),
            material: Material::wireframe(Rgb::from_hex(0xff00ff)),
            transform: Transform::default(),
        });

        let polyhedron_edges = scene.add(SceneObject {
            shape: Shape::octahedron_edges(3.0, 2, EDGE_THRESHOLD_DEGREES),
            material: Material::line(Rgb::from_hex(0x00ffff), 2),
            transform: Transform::default(),
        });

        for (color, position) in [
            (0x00ffff, [10.0, 10.0, 10.0]),
            (0xff00ff, [-10.0, -10.0, 10.0]),
            (0x9900ff, [10.0, -10.0, -10.0]),
        ] {
            scene.add_light(PointLight {
                color: Rgb::from_hex(color),
                intensity: 2.0,
                distance: 100.0,
                position,
            });
        }

        let stars = generate_stars(&mut scene, config.star_count, config.star_size, rng);
        let markers = place_constellations(&mut scene, constellations);

        let aspect = if height == 0 { 1.0 } else { width as f64 / height as f64 };
        let mut camera = PerspectiveCamera::new(config.fov, aspect, 0.1, 1000.0);
        camera.position = [0.0, 0.0, config.camera_distance];
        camera.look_at([0.0, 0.0, 0.0]);

        let mut controls = OrbitControls::new(&camera);
        controls.enable_damping = true;
        controls.damping_factor = config.damping_factor;
        controls.enable_zoom = config.enable_zoom;
        controls.set_viewport_size(width as f64, height as f64);

        info!(
            objects = scene.len(),
            spheres = scene.count_meshes(ShapeKind::Sphere),
            line_objects = scene.count_line_segments(),
            stars = stars.len(),
            constellation_stars = markers.len(),
            lights = scene.lights().len(),
            width,
            height,
            "scene composed"
        );

        SceneContext {
            scene,
            camera,
            controls,
            renderer: Renderer::new(width, height),
            animated: vec![dodecahedron, polyhedron_edges],
            rotation_step: config.rotation_step,
        }
    }
}
