/*
 * Sketch Configuration Module
 *
 * Everything the host needs to start a sketch: which one, how big the window
 * is and the tuning for the flock or crystal. Loaded from a RON file when a
 * path is given on the command line, otherwise defaults are used.
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::crystal::CrystalConfig;
use crate::error::ConfigError;
use crate::params::FlockParams;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sketch {
    Flocking,
    Crystal,
}

impl FromStr for Sketch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flocking" | "flock" | "boids" => Ok(Sketch::Flocking),
            "crystal" | "crystallize" | "dla" => Ok(Sketch::Crystal),
            _ => Err(ConfigError::InvalidParameter("sketch must be `flocking` or `crystal`")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub sketch: Sketch,
    pub window_width: u32,
    pub window_height: u32,
    pub initial_boids: usize,
    /// Max speed of the initial boids is drawn from this range.
    pub min_speed: f32,
    pub max_speed: f32,
    pub max_force: f32,
    /// Boids added with the mouse.
    pub click_speed: f32,
    pub click_force: f32,
    /// Diffusion steps run per frame by the crystal sketch.
    pub iterations_per_frame: usize,
    /// Fixed RNG seed; entropy when absent.
    pub seed: Option<u64>,
    pub flock: FlockParams,
    pub crystal: CrystalConfig,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            sketch: Sketch::Flocking,
            window_width: 1024,
            window_height: 768,
            initial_boids: 1000,
            min_speed: 1.0,
            max_speed: 3.0,
            max_force: 0.1,
            click_speed: 2.0,
            click_force: 0.05,
            iterations_per_frame: 200_000,
            seed: None,
            flock: FlockParams::default(),
            crystal: CrystalConfig::default(),
        }
    }
}

impl SketchConfig {
    /// Reads and validates a RON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron(&contents)?;
        info!("Loaded sketch config from {}", path.display());
        Ok(config)
    }

    pub fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        let config: SketchConfig = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::InvalidDomain {
                width: self.window_width as f32,
                height: self.window_height as f32,
            });
        }
        if !(self.min_speed > 0.0 && self.min_speed <= self.max_speed) {
            return Err(ConfigError::InvalidParameter("speeds must be positive with min_speed <= max_speed"));
        }
        if !(self.max_force > 0.0 && self.click_speed > 0.0 && self.click_force > 0.0) {
            return Err(ConfigError::InvalidParameter("speeds and forces must be positive"));
        }
        self.crystal.validate()
    }
}

/// What the binary was asked to run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    pub sketch: Option<Sketch>,
    pub config_path: Option<PathBuf>,
}

impl LaunchOptions {
    /// Parses `[flocking|crystal] [config.ron]` in either order.
    pub fn parse<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = LaunchOptions::default();
        for arg in args {
            let arg = arg.as_ref();
            if arg.ends_with(".ron") {
                options.config_path = Some(PathBuf::from(arg));
            } else {
                options.sketch = Some(arg.parse()?);
            }
        }
        Ok(options)
    }

    /// Loads the config file if one was given and applies the sketch choice.
    pub fn resolve(&self) -> Result<SketchConfig, ConfigError> {
        let mut config = match &self.config_path {
            Some(path) => SketchConfig::load(path)?,
            None => SketchConfig::default(),
        };
        if let Some(sketch) = self.sketch {
            config.sketch = sketch;
        }
        Ok(config)
    }
}
