/*
 * Application Module
 *
 * This module defines the nannou model and frame loop for both sketches.
 * The simulation itself (`Simulation`) does not depend on a window, so the
 * same stepping code runs headless in tests and benches.
 *
 * The frame loop is single threaded: one `update` steps the simulation,
 * then one `view` draws it.
 */

use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};
use tracing::info;

use crate::config::{Sketch, SketchConfig};
use crate::crystal::Crystal;
use crate::debug::DebugInfo;
use crate::error::ConfigError;
use crate::flock::{Flock, FrameTime};
use crate::params::FlockParams;
use crate::{input, renderer};

/// A running sketch, independent of any window.
pub enum Simulation {
    Flocking { flock: Flock, params: FlockParams },
    Crystal { crystal: Crystal, iterations_per_frame: usize },
}

impl Simulation {
    pub fn new(config: &SketchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (width, height) = (config.window_width as f32, config.window_height as f32);

        match config.sketch {
            Sketch::Flocking => {
                let params = config.flock.clone();
                let mut flock = match config.seed {
                    Some(seed) => Flock::with_seed(width, height, &params, seed)?,
                    None => Flock::new(width, height, &params)?,
                };
                let mut rng = match config.seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
                    None => StdRng::from_entropy(),
                };

                let center = flock.center();
                for _ in 0..config.initial_boids {
                    let max_speed = rng.gen_range(config.min_speed..=config.max_speed);
                    flock.spawn_boid(center, max_speed, config.max_force);
                }
                info!("Flocking sketch started with {} boids", flock.len());

                Ok(Simulation::Flocking { flock, params })
            }
            Sketch::Crystal => {
                let mut crystal = match config.seed {
                    Some(seed) => Crystal::with_seed(width, height, config.crystal.clone(), seed)?,
                    None => Crystal::new(width, height, config.crystal.clone())?,
                };
                crystal.add_particle(pt2(width / 2.0, height / 2.0));

                Ok(Simulation::Crystal {
                    crystal,
                    iterations_per_frame: config.iterations_per_frame,
                })
            }
        }
    }

    /// Advances the sketch by one frame. Returns the number of particles
    /// that stuck (always zero for the flock).
    pub fn step(&mut self, time: FrameTime) -> usize {
        match self {
            Simulation::Flocking { flock, params } => {
                flock.update(params, time);
                0
            }
            Simulation::Crystal { crystal, iterations_per_frame } => crystal.update(*iterations_per_frame),
        }
    }

    /// Boids in the flock or stuck particles in the crystal.
    pub fn agent_count(&self) -> usize {
        match self {
            Simulation::Flocking { flock, .. } => flock.len(),
            Simulation::Crystal { crystal, .. } => crystal.len(),
        }
    }
}

// Main model for the application
pub struct Model {
    pub simulation: Simulation,
    pub config: SketchConfig,
    pub debug_info: DebugInfo,
    pub show_info: bool,
    pub show_walls: bool,
    /// Sparks drained from the crystal this frame, drawn once.
    pub sparks: Vec<Point2>,
}

impl Model {
    /// Domain extents the simulation runs in.
    pub fn domain(&self) -> Vec2 {
        vec2(self.config.window_width as f32, self.config.window_height as f32)
    }
}

// The simulation is built before nannou starts so configuration errors reach
// the caller instead of surfacing inside the model function.
static PENDING: Mutex<Option<(Simulation, SketchConfig)>> = Mutex::new(None);

/// Builds the sketch described by `config` and runs it until the window closes.
pub fn run(config: SketchConfig) -> Result<(), ConfigError> {
    let simulation = Simulation::new(&config)?;
    *PENDING.lock().unwrap_or_else(PoisonError::into_inner) = Some((simulation, config));
    nannou::app(model).update(update).run();
    Ok(())
}

fn model(app: &App) -> Model {
    let (simulation, config) = PENDING
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
        .expect("app::run stores the simulation before starting nannou");

    let title = match config.sketch {
        Sketch::Flocking => "Flocking",
        Sketch::Crystal => "Crystallize",
    };

    app.new_window()
        .title(title)
        .size(config.window_width, config.window_height)
        .view(renderer::view)
        .received_character(input::received_character)
        .mouse_pressed(input::mouse_pressed)
        .build()
        .unwrap();

    Model {
        simulation,
        config,
        debug_info: DebugInfo::default(),
        show_info: false,
        show_walls: true,
        sparks: Vec::new(),
    }
}

fn update(app: &App, model: &mut Model, update: Update) {
    let stuck = model.simulation.step(FrameTime::new(update.since_start, update.since_last));

    if let Simulation::Crystal { crystal, .. } = &mut model.simulation {
        model.sparks = crystal.take_sparks();
    }

    let count = model.simulation.agent_count();
    model.debug_info.record_frame(app.fps(), update.since_last, count);
    model.debug_info.stuck_last_frame = stuck;
}
