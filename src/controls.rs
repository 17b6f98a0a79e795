//! Orbit camera controller with damped motion.
//!
//! Input never moves the camera directly. Pointer and key handlers adjust a
//! goal orbit; every [`OrbitControls::update`] moves the current orbit a
//! `damping_factor` fraction of the remaining way towards that goal and places
//! the camera on it.

use crate::camera::PerspectiveCamera;
use crate::math::{add, cross, lerp, lerp_vec, normalize, scale, sub, Vec3};
use std::f64::consts::{PI, TAU};

const EPS: f64 = 1e-6;

/// Multiplicative zoom step for one wheel notch or key press
const ZOOM_STEP: f64 = 0.95;

/// Camera placement on a sphere around a target point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    pub radius: f64,
    /// Angle around the Y axis, measured from +Z
    pub azimuth: f64,
    /// Angle down from +Y
    pub polar: f64,
    pub target: Vec3,
}

impl Orbit {
    pub fn from_position(position: &Vec3, target: &Vec3) -> Self {
        let offset = sub(position, target);
        let radius = crate::math::length(&offset);
        let (azimuth, polar) = if radius == 0.0 {
            (0.0, PI / 2.0)
        } else {
            (
                offset[0].atan2(offset[2]),
                (offset[1] / radius).clamp(-1.0, 1.0).acos(),
            )
        };
        Orbit {
            radius,
            azimuth,
            polar,
            target: *target,
        }
    }

    pub fn position(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        add(
            &self.target,
            &[
                self.radius * sin_polar * self.azimuth.sin(),
                self.radius * self.polar.cos(),
                self.radius * sin_polar * self.azimuth.cos(),
            ],
        )
    }

    /// Largest component-wise distance to `other`
    pub fn distance(&self, other: &Orbit) -> f64 {
        let target = sub(&self.target, &other.target);
        [
            (self.radius - other.radius).abs(),
            (self.azimuth - other.azimuth).abs(),
            (self.polar - other.polar).abs(),
            target[0].abs(),
            target[1].abs(),
            target[2].abs(),
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Pointer input in surface pixel coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down { button: PointerButton, x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { button: PointerButton },
    /// Negative values scroll up (towards the target)
    Wheel { delta_y: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKey {
    Up,
    Down,
    Left,
    Right,
    ZoomIn,
    ZoomOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DragMode {
    Rotate,
    Pan,
    Dolly,
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub enable_damping: bool,
    /// Fraction of the remaining distance covered per update
    pub damping_factor: f64,
    pub enable_zoom: bool,
    pub min_distance: f64,
    pub max_distance: f64,
    pub rotate_speed: f64,
    /// Pixels panned per arrow key press
    pub key_pan_speed: f64,
    goal: Orbit,
    current: Orbit,
    initial: Orbit,
    drag: Option<(DragMode, [f64; 2])>,
    viewport: [f64; 2],
}

impl OrbitControls {
    /// Attaches to `camera`, orbiting around its current target
    pub fn new(camera: &PerspectiveCamera) -> Self {
        let orbit = Orbit::from_position(&camera.position, &camera.target);
        OrbitControls {
            enable_damping: false,
            damping_factor: 0.05,
            enable_zoom: true,
            min_distance: 0.0,
            max_distance: f64::INFINITY,
            rotate_speed: 1.0,
            key_pan_speed: 7.0,
            goal: orbit,
            current: orbit,
            initial: orbit,
            drag: None,
            viewport: [1.0, 1.0],
        }
    }

    pub fn goal(&self) -> &Orbit {
        &self.goal
    }

    pub fn current(&self) -> &Orbit {
        &self.current
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport = [width.max(1.0), height.max(1.0)];
    }

    pub fn rotate_left(&mut self, angle: f64) {
        self.goal.azimuth -= angle;
    }

    pub fn rotate_up(&mut self, angle: f64) {
        self.goal.polar -= angle;
    }

    /// Moves towards the target by `zoom_scale` (< 1)
    pub fn dolly_in(&mut self, zoom_scale: f64) {
        if self.enable_zoom {
            self.goal.radius *= zoom_scale;
        }
    }

    pub fn dolly_out(&mut self, zoom_scale: f64) {
        if self.enable_zoom {
            self.goal.radius /= zoom_scale;
        }
    }

    /// Slides the target in the screen plane by a pixel delta; the distance
    /// scales so the point under the cursor follows it at the target depth.
    pub fn pan(&mut self, delta_x: f64, delta_y: f64, camera: &PerspectiveCamera) {
        let position = self.goal.position();
        let forward = normalize(&sub(&position, &self.goal.target));
        let mut right = cross(&[0.0, 1.0, 0.0], &forward);
        if crate::math::length(&right) < EPS {
            right = [1.0, 0.0, 0.0];
        }
        let right = normalize(&right);
        let up = cross(&forward, &right);

        let target_distance = self.goal.radius * (camera.fov.to_radians() / 2.0).tan();
        let height = self.viewport[1];
        let left = scale(&right, -2.0 * delta_x * target_distance / height);
        let upward = scale(&up, 2.0 * delta_y * target_distance / height);

        self.goal.target = add(&self.goal.target, &add(&left, &upward));
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, camera: &PerspectiveCamera) {
        match event {
            PointerEvent::Down { button, x, y } => {
                let mode = match button {
                    PointerButton::Primary => DragMode::Rotate,
                    PointerButton::Secondary => DragMode::Pan,
                    PointerButton::Middle => DragMode::Dolly,
                };
                self.drag = Some((mode, [x, y]));
            }
            PointerEvent::Move { x, y } => {
                let Some((mode, last)) = self.drag else {
                    return;
                };
                let (dx, dy) = (x - last[0], y - last[1]);
                match mode {
                    DragMode::Rotate => {
                        let height = self.viewport[1];
                        self.rotate_left(TAU * dx / height * self.rotate_speed);
                        self.rotate_up(TAU * dy / height * self.rotate_speed);
                    }
                    DragMode::Pan => self.pan(dx, dy, camera),
                    DragMode::Dolly => {
                        if dy > 0.0 {
                            self.dolly_out(ZOOM_STEP);
                        } else if dy < 0.0 {
                            self.dolly_in(ZOOM_STEP);
                        }
                    }
                }
                self.drag = Some((mode, [x, y]));
            }
            PointerEvent::Up { .. } => self.drag = None,
            PointerEvent::Wheel { delta_y } => {
                if delta_y < 0.0 {
                    self.dolly_in(ZOOM_STEP);
                } else if delta_y > 0.0 {
                    self.dolly_out(ZOOM_STEP);
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: ControlKey, camera: &PerspectiveCamera) {
        let speed = self.key_pan_speed;
        match key {
            ControlKey::Up => self.pan(0.0, speed, camera),
            ControlKey::Down => self.pan(0.0, -speed, camera),
            ControlKey::Left => self.pan(speed, 0.0, camera),
            ControlKey::Right => self.pan(-speed, 0.0, camera),
            ControlKey::ZoomIn => self.dolly_in(ZOOM_STEP),
            ControlKey::ZoomOut => self.dolly_out(ZOOM_STEP),
        }
    }

    /// Returns to the orbit the controls were created with, without damping
    pub fn reset(&mut self) {
        self.goal = self.initial;
        self.current = self.initial;
        self.drag = None;
    }

    /// Advances the damped orbit by one step and moves the camera onto it.
    /// Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        self.goal.polar = self.goal.polar.clamp(EPS, PI - EPS);
        self.goal.radius = self.goal.radius.clamp(self.min_distance, self.max_distance);

        let previous = self.current;
        if self.enable_damping {
            let t = self.damping_factor;
            self.current = Orbit {
                radius: lerp(self.current.radius, self.goal.radius, t),
                azimuth: lerp(self.current.azimuth, self.goal.azimuth, t),
                polar: lerp(self.current.polar, self.goal.polar, t),
                target: lerp_vec(&self.current.target, &self.goal.target, t),
            };
        } else {
            self.current = self.goal;
        }

        camera.position = self.current.position();
        camera.look_at(self.current.target);

        self.current.distance(&previous) > EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (PerspectiveCamera, OrbitControls) {
        let mut camera = PerspectiveCamera::new(75.0, 2.0, 0.1, 1000.0);
        camera.position = [0.0, 0.0, 15.0];
        camera.look_at([0.0, 0.0, 0.0]);
        let mut controls = OrbitControls::new(&camera);
        controls.enable_damping = true;
        controls.damping_factor = 0.1;
        controls.set_viewport_size(160.0, 80.0);
        (camera, controls)
    }

    #[test]
    fn orbit_round_trips_camera_position() {
        let orbit = Orbit::from_position(&[3.0, 4.0, 12.0], &[0.0, 0.0, 0.0]);
        assert!((orbit.radius - 13.0).abs() < 1e-12);
        let p = orbit.position();
        assert!((p[0] - 3.0).abs() < 1e-9);
        assert!((p[1] - 4.0).abs() < 1e-9);
        assert!((p[2] - 12.0).abs() < 1e-9);
    }

    #[test]
    fn idle_update_keeps_camera_in_place() {
        let (mut camera, mut controls) = setup();
        assert!(!controls.update(&mut camera));
        assert!((camera.position[2] - 15.0).abs() < 1e-9);
    }

    #[test]
    fn damping_closes_a_tenth_of_the_gap_each_step() {
        let (mut camera, mut controls) = setup();
        for _ in 0..4 {
            controls.dolly_in(ZOOM_STEP);
        }
        let goal = controls.goal().radius;
        let mut remaining = (controls.current().radius - goal).abs();

        for _ in 0..50 {
            assert!(controls.update(&mut camera));
            let next = (controls.current().radius - goal).abs();
            assert!(next < remaining);
            assert!((next - remaining * 0.9).abs() < 1e-9);
            remaining = next;
        }
        assert!((crate::math::length(&camera.position) - controls.current().radius).abs() < 1e-9);
    }

    #[test]
    fn damping_eases_the_target_after_a_pan() {
        let (mut camera, mut controls) = setup();
        controls.pan(40.0, -25.0, &camera);
        let goal = controls.goal().target;
        assert_ne!(goal, [0.0, 0.0, 0.0]);
        let mut remaining = crate::math::length(&sub(&controls.current().target, &goal));

        for _ in 0..50 {
            assert!(controls.update(&mut camera));
            let next = crate::math::length(&sub(&controls.current().target, &goal));
            assert!(next < remaining);
            assert!((next - remaining * 0.9).abs() < 1e-9);
            remaining = next;
        }
        assert_eq!(camera.target, controls.current().target);
    }

    #[test]
    fn without_damping_camera_jumps_to_goal() {
        let (mut camera, mut controls) = setup();
        controls.enable_damping = false;
        controls.rotate_left(0.5);
        controls.update(&mut camera);
        assert_eq!(controls.current(), controls.goal());
    }

    #[test]
    fn drag_rotates_and_release_stops() {
        let (camera, mut controls) = setup();
        controls.handle_pointer(
            PointerEvent::Down { button: PointerButton::Primary, x: 10.0, y: 10.0 },
            &camera,
        );
        controls.handle_pointer(PointerEvent::Move { x: 30.0, y: 10.0 }, &camera);
        let expected = -TAU * 20.0 / 80.0;
        assert!((controls.goal().azimuth - expected).abs() < 1e-12);

        controls.handle_pointer(PointerEvent::Up { button: PointerButton::Primary }, &camera);
        controls.handle_pointer(PointerEvent::Move { x: 90.0, y: 10.0 }, &camera);
        assert!((controls.goal().azimuth - expected).abs() < 1e-12);
    }

    #[test]
    fn wheel_zoom_respects_enable_flag() {
        let (camera, mut controls) = setup();
        controls.handle_pointer(PointerEvent::Wheel { delta_y: -1.0 }, &camera);
        assert!((controls.goal().radius - 15.0 * ZOOM_STEP).abs() < 1e-12);

        controls.enable_zoom = false;
        controls.handle_pointer(PointerEvent::Wheel { delta_y: 1.0 }, &camera);
        assert!((controls.goal().radius - 15.0 * ZOOM_STEP).abs() < 1e-12);
    }

    #[test]
    fn polar_angle_is_clamped_off_the_poles() {
        let (mut camera, mut controls) = setup();
        controls.enable_damping = false;
        controls.rotate_up(10.0);
        controls.update(&mut camera);
        assert!(controls.current().polar >= EPS);
        assert!(camera.position.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn distance_limits_clamp_the_goal() {
        let (mut camera, mut controls) = setup();
        controls.max_distance = 20.0;
        for _ in 0..100 {
            controls.dolly_out(ZOOM_STEP);
        }
        controls.update(&mut camera);
        assert_eq!(controls.goal().radius, 20.0);
    }

    #[test]
    fn arrow_keys_pan_the_target_sideways() {
        let (camera, mut controls) = setup();
        controls.handle_key(ControlKey::Right, &camera);
        let target = controls.goal().target;
        assert!(target[0] > 0.0);
        assert!(target[1].abs() < 1e-12 && target[2].abs() < 1e-12);
    }

    #[test]
    fn reset_restores_initial_orbit() {
        let (mut camera, mut controls) = setup();
        controls.rotate_left(1.0);
        controls.dolly_in(0.5);
        controls.update(&mut camera);
        controls.reset();
        controls.update(&mut camera);
        assert!((camera.position[2] - 15.0).abs() < 1e-9);
    }
}
