/*
 * cellspace - Module Definitions
 *
 * The simulation core (grid, agents, aggregates, configuration) runs without
 * a window. The host modules (app, renderer, input, ui) wrap it in a nannou
 * sketch.
 */

// Re-export key components for easier access
pub use agent::Agent;
pub use boid::Boid;
pub use config::{LaunchOptions, Sketch, SketchConfig};
pub use crystal::{Crystal, CrystalConfig};
pub use error::ConfigError;
pub use flock::{Flock, FrameTime};
pub use params::{Containment, FlockParams};
pub use particle::{Annulus, Particle};
pub use spatial_grid::{Neighbor, SpatialGrid};
pub use walls::{Wall, Walls};

// Simulation core
pub mod agent;
pub mod boid;
pub mod config;
pub mod crystal;
pub mod debug;
pub mod error;
pub mod flock;
pub mod params;
pub mod particle;
pub mod spatial_grid;
pub mod walls;

// nannou host
pub mod app;
pub mod input;
pub mod renderer;
pub mod ui;

// Base drawing radius of a boid before the throb animation
pub const BOID_SIZE: f32 = 6.0;
