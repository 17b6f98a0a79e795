use crate::error::{Error, Result};

/// Tunables for building and animating the scene
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// Number of randomly placed stars
    pub star_count: usize,
    /// Radius of each random star
    pub star_size: f64,
    /// Radians added to the animated objects' X and Y rotation per frame
    pub rotation_step: f64,
    pub damping_factor: f64,
    pub enable_zoom: bool,
    /// Frame rate cap of the terminal host
    pub fps: u32,
    /// Vertical field of view in degrees
    pub fov: f64,
    /// Initial camera distance along +Z
    pub camera_distance: f64,
    /// Fixed seed for the star field; random when absent
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            star_count: 1000,
            star_size: 0.1,
            rotation_step: 0.005,
            damping_factor: 0.1,
            enable_zoom: true,
            fps: 60,
            fov: 75.0,
            camera_distance: 15.0,
            seed: None,
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.damping_factor > 0.0 && self.damping_factor <= 1.0) {
            return Err(Error::Config(format!(
                "damping factor must be in (0, 1], got {}",
                self.damping_factor
            )));
        }
        if !(self.star_size > 0.0 && self.star_size.is_finite()) {
            return Err(Error::Config(format!(
                "star size must be positive, got {}",
                self.star_size
            )));
        }
        if self.fps == 0 {
            return Err(Error::Config("fps must be at least 1".to_string()));
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(Error::Config(format!(
                "field of view must be in (0, 180), got {}",
                self.fov
            )));
        }
        if !self.rotation_step.is_finite() {
            return Err(Error::Config("rotation step must be finite".to_string()));
        }
        Ok(())
    }
}
