mod camera;
mod config;
mod constellation;
mod controls;
mod error;
mod geometry;
mod graphics;
mod math;
mod render_loop;
mod renderer;
mod scene;
mod starfield;
mod state;
mod terminal;
mod vertex;
mod viewport;

use clap::Parser;
use config::SceneConfig;
use constellation::CONSTELLATIONS;
use rand::rngs::StdRng;
use rand::SeedableRng;
use render_loop::RenderLoop;
use state::SceneContext;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use terminal::TerminalHost;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Rotating wireframe solids in a field of stars, drawn in the terminal.
///
/// Drag with the left mouse button to orbit, the right button to pan, and
/// scroll to zoom. Arrow keys pan, +/- zoom, r resets the view, d toggles
/// debug info and q quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Number of randomly placed stars
    #[arg(short, long, default_value_t = 1000)]
    stars: usize,

    /// Radius of each random star
    #[arg(long, default_value_t = 0.1)]
    star_size: f64,

    /// Frame rate cap
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Fraction of the remaining camera motion applied per frame
    #[arg(long, default_value_t = 0.1)]
    damping: f64,

    /// Disable mouse wheel and key zoom
    #[arg(long)]
    no_zoom: bool,

    /// Radians the solids turn about X and Y per frame
    #[arg(long, default_value_t = 0.005)]
    rotation_speed: f64,

    /// Seed for a reproducible star field
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (the terminal is used for drawing)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn scene_config(&self) -> SceneConfig {
        SceneConfig {
            star_count: self.stars,
            star_size: self.star_size,
            rotation_step: self.rotation_speed,
            damping_factor: self.damping,
            enable_zoom: !self.no_zoom,
            fps: self.fps,
            seed: self.seed,
            ..SceneConfig::default()
        }
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.scene_config();
    config.validate()?;
    init_logging(&cli)?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (width, height) = terminal::surface_size()?;
    let mut ctx = SceneContext::build(&config, &CONSTELLATIONS, &mut rng, width, height);

    let mut driver = RenderLoop::new();
    {
        let mut host = TerminalHost::new(config.fps)?;
        driver.run(&mut ctx, &mut host)?;
    }

    info!(frames = driver.frames(), state = ?driver.state(), "exited");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_reference_scene() {
        let cli = Cli::parse_from(["starscape"]);
        assert_eq!(cli.scene_config(), SceneConfig::default());
    }

    #[test]
    fn flags_reach_the_config() {
        let cli = Cli::parse_from([
            "starscape",
            "--stars",
            "5",
            "--no-zoom",
            "--seed",
            "9",
            "--damping",
            "0.5",
        ]);
        let config = cli.scene_config();
        assert_eq!(config.star_count, 5);
        assert!(!config.enable_zoom);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.damping_factor, 0.5);
    }
}
