//! Frame driver: applies host input, advances animation and draws, once per
//! display refresh.

use crate::controls::{ControlKey, PointerEvent};
use crate::error::Result;
use crate::graphics::FrameBuffer;
use crate::renderer::DrawStats;
use crate::state::SceneContext;
use crate::viewport::handle_resize;
use std::time::Instant;
use tracing::{debug, info};

/// Keyboard commands understood by the driver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    ToggleHud,
    ResetView,
    Control(ControlKey),
}

/// Input delivered by the host between two frames
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    /// New surface size in pixels
    Resize { width: usize, height: usize },
    Pointer(PointerEvent),
    Key(KeyCommand),
}

/// The environment that schedules frames and displays them
pub trait Host {
    /// Blocks until the next display refresh and returns the events received
    /// since the previous call, or `None` once the host has shut down.
    fn next_frame(&mut self) -> Result<Option<Vec<HostEvent>>>;

    /// Shows a finished frame with an optional text overlay
    fn present(&mut self, frame: &FrameBuffer, hud: Option<&[String]>) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Init,
    Running,
    Stopped,
}

pub struct RenderLoop {
    state: LoopState,
    frames: u64,
    show_hud: bool,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        RenderLoop {
            state: LoopState::Init,
            frames: 0,
            show_hud: false,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames drawn so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn hud_visible(&self) -> bool {
        self.show_hud
    }

    /// Applies one host event to the context
    pub fn dispatch(&mut self, ctx: &mut SceneContext, event: HostEvent) {
        match event {
            HostEvent::Resize { width, height } => {
                handle_resize(ctx, width, height);
            }
            HostEvent::Pointer(pointer) => ctx.controls.handle_pointer(pointer, &ctx.camera),
            HostEvent::Key(KeyCommand::ToggleHud) => self.show_hud = !self.show_hud,
            HostEvent::Key(KeyCommand::ResetView) => ctx.controls.reset(),
            HostEvent::Key(KeyCommand::Control(key)) => ctx.controls.handle_key(key, &ctx.camera),
        }
    }

    /// One iteration: damped camera update, animation, draw
    pub fn step(&mut self, ctx: &mut SceneContext) -> DrawStats {
        ctx.controls.update(&mut ctx.camera);

        for id in &ctx.animated {
            if let Some(object) = ctx.scene.get_mut(*id) {
                object.transform.rotate_xy(ctx.rotation_step);
            }
        }

        let stats = ctx.renderer.draw(&ctx.scene, &ctx.camera);
        self.frames += 1;
        self.update_fps();
        stats
    }

    /// Runs until the host shuts down
    pub fn run(&mut self, ctx: &mut SceneContext, host: &mut impl Host) -> Result<()> {
        self.state = LoopState::Running;
        info!("render loop running");

        while let Some(events) = host.next_frame()? {
            for event in events {
                self.dispatch(ctx, event);
            }
            self.step(ctx);

            let hud = self.hud_visible().then(|| self.hud_lines(ctx));
            host.present(ctx.renderer.frame(), hud.as_deref())?;
        }

        self.state = LoopState::Stopped;
        info!(frames = self.frames, "host shut down, render loop stopped");
        Ok(())
    }

    fn update_fps(&mut self) {
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
            debug!(fps = self.fps, frames = self.frames, "frame rate");
        }
    }

    /// Debug overlay text
    pub fn hud_lines(&self, ctx: &SceneContext) -> Vec<String> {
        let camera = &ctx.camera;
        let orbit = ctx.controls.current();
        let goal = ctx.controls.goal();
        let stats = ctx.renderer.stats();
        let rotation = ctx
            .animated
            .first()
            .and_then(|id| ctx.scene.get(*id))
            .map(|object| object.transform.rotation)
            .unwrap_or_default();

        vec![
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            format!("FPS: {:.2}  Frame: {}", self.fps, self.frames),
            format!(
                "Camera: ({:.2}, {:.2}, {:.2})  Distance: {:.2} -> {:.2}",
                camera.position[0],
                camera.position[1],
                camera.position[2],
                orbit.radius,
                goal.radius
            ),
            format!("Rotation X: {:.3}, Y: {:.3}", rotation[0], rotation[1]),
            format!(
                "Objects: {} ({} points, {} culled)  Lights: {}",
                stats.objects,
                stats.points,
                stats.culled,
                ctx.scene.lights().len()
            ),
            format!(
                "Surface: {}x{}  Aspect: {:.3}",
                ctx.renderer.size().0,
                ctx.renderer.size().1,
                camera.aspect
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::constellation::CONSTELLATIONS;
    use crate::controls::PointerButton;
    use crate::starfield::tests::SequenceSource;
    use std::collections::VecDeque;

    /// Replays scripted event batches, one per frame, then shuts down
    struct ScriptedHost {
        script: VecDeque<Vec<HostEvent>>,
        presented: Vec<(usize, usize, bool)>,
    }

    impl ScriptedHost {
        fn new(script: Vec<Vec<HostEvent>>) -> Self {
            Self {
                script: script.into(),
                presented: Vec::new(),
            }
        }
    }

    impl Host for ScriptedHost {
        fn next_frame(&mut self) -> Result<Option<Vec<HostEvent>>> {
            Ok(self.script.pop_front())
        }

        fn present(&mut self, frame: &FrameBuffer, hud: Option<&[String]>) -> Result<()> {
            self.presented.push((frame.width(), frame.height(), hud.is_some()));
            Ok(())
        }
    }

    fn context(star_count: usize) -> SceneContext {
        let config = SceneConfig {
            star_count,
            ..SceneConfig::default()
        };
        let mut rng = SequenceSource::new(vec![0.1, 0.9, 0.4, 0.6, 0.3]);
        SceneContext::build(&config, &CONSTELLATIONS, &mut rng, 64, 32)
    }

    fn rotation(ctx: &SceneContext, index: usize) -> [f64; 3] {
        ctx.scene.get(ctx.animated[index]).unwrap().transform.rotation
    }

    #[test]
    fn rotation_advances_by_fixed_step_per_frame() {
        let mut ctx = context(0);
        let mut driver = RenderLoop::new();

        for k in 1..=40 {
            driver.step(&mut ctx);
            let dodecahedron = rotation(&ctx, 0);
            let edges = rotation(&ctx, 1);
            assert_eq!(dodecahedron, edges);
            assert!((dodecahedron[0] - k as f64 * 0.005).abs() < 1e-12);
            assert!((dodecahedron[1] - k as f64 * 0.005).abs() < 1e-12);
            assert_eq!(dodecahedron[2], 0.0);
        }
        assert_eq!(driver.frames(), 40);
    }

    #[test]
    fn rotation_wraps_modulo_full_turn() {
        let mut ctx = context(0);
        ctx.rotation_step = 1.0;
        let mut driver = RenderLoop::new();
        for _ in 0..7 {
            driver.step(&mut ctx);
        }
        let expected = 7.0f64.rem_euclid(std::f64::consts::TAU);
        assert!((rotation(&ctx, 0)[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn run_presents_one_frame_per_tick_and_stops_with_host() {
        let mut ctx = context(10);
        let mut host = ScriptedHost::new(vec![vec![], vec![], vec![]]);
        let mut driver = RenderLoop::new();
        assert_eq!(driver.state(), LoopState::Init);

        driver.run(&mut ctx, &mut host).unwrap();
        assert_eq!(driver.frames(), 3);
        assert_eq!(host.presented.len(), 3);
        assert_eq!(driver.state(), LoopState::Stopped);
    }

    #[test]
    fn resize_before_a_tick_reaches_that_frame() {
        let mut ctx = context(0);
        let mut host = ScriptedHost::new(vec![
            vec![],
            vec![HostEvent::Resize { width: 100, height: 40 }],
            vec![HostEvent::Resize { width: 100, height: 40 }],
        ]);
        RenderLoop::new().run(&mut ctx, &mut host).unwrap();

        assert_eq!(host.presented[0], (64, 32, false));
        assert_eq!(host.presented[1], (100, 40, false));
        assert_eq!(host.presented[2], (100, 40, false));
        assert_eq!(ctx.camera.aspect, 100.0 / 40.0);
    }

    #[test]
    fn hud_toggles_and_drag_moves_camera() {
        let mut ctx = context(0);
        let start = ctx.camera.position;
        let mut host = ScriptedHost::new(vec![
            vec![
                HostEvent::Key(KeyCommand::ToggleHud),
                HostEvent::Pointer(PointerEvent::Down {
                    button: PointerButton::Primary,
                    x: 10.0,
                    y: 10.0,
                }),
                HostEvent::Pointer(PointerEvent::Move { x: 20.0, y: 10.0 }),
            ],
            vec![HostEvent::Pointer(PointerEvent::Up {
                button: PointerButton::Primary,
            })],
            vec![HostEvent::Key(KeyCommand::ToggleHud)],
        ]);
        let mut driver = RenderLoop::new();
        driver.run(&mut ctx, &mut host).unwrap();

        let hud: Vec<bool> = host.presented.iter().map(|p| p.2).collect();
        assert_eq!(hud, vec![true, true, false]);
        assert!(!driver.hud_visible());
        assert_ne!(ctx.camera.position, start);
    }

    #[test]
    fn reset_view_returns_camera_home() {
        let mut ctx = context(0);
        let mut driver = RenderLoop::new();
        driver.dispatch(&mut ctx, HostEvent::Key(KeyCommand::Control(ControlKey::ZoomIn)));
        for _ in 0..5 {
            driver.step(&mut ctx);
        }
        assert!(ctx.camera.position[2] < 15.0);

        driver.dispatch(&mut ctx, HostEvent::Key(KeyCommand::ResetView));
        driver.step(&mut ctx);
        assert!((ctx.camera.position[2] - 15.0).abs() < 1e-9);
    }

    #[test]
    fn hud_reports_scene_contents() {
        let mut ctx = context(0);
        let mut driver = RenderLoop::new();
        driver.step(&mut ctx);
        let lines = driver.hud_lines(&ctx);
        assert!(lines[0].starts_with("starscape"));
        assert!(lines[2].ends_with("Distance: 15.00 -> 15.00"));
        assert!(lines.iter().any(|l| l.contains("Lights: 3")));
        assert!(lines.iter().any(|l| l.contains("Objects: 30")));
    }
}
