/*
 * Crystal Module
 *
 * Diffusion-limited aggregation. A set of stuck particles grows from a seed
 * while free particles random-walk around it. A free particle that comes
 * within `min_distance` of any stuck one sticks; one that strays beyond the
 * outer spawn radius is put back on the annulus just outside the aggregate.
 *
 * Each iteration first advances and classifies every free particle against
 * the current aggregate, then applies the resulting stick and reposition
 * transitions, so the stuck list is never mutated while being read.
 */

use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::particle::{Annulus, Particle};
use crate::spatial_grid::SpatialGrid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrystalConfig {
    /// Starting radius, restored on reset.
    pub min_radius: f32,
    /// Inner spawn radius is `inner_radius_scale * radius + 1`.
    pub inner_radius_scale: f32,
    /// Outer spawn radius is `outer_radius_scale * radius`; free particles
    /// beyond it are repositioned.
    pub outer_radius_scale: f32,
    /// Radius of the grid query made by the touch test.
    pub query_radius: f32,
    /// A free particle this close to a stuck one sticks (diagonal adjacency).
    pub min_distance: f32,
    pub cells_x: usize,
    pub cells_y: usize,
    pub free_particles: usize,
    pub max_reposition_attempts: usize,
    /// RGB tag given to each particle as it sticks.
    pub color: [u8; 3],
    /// Draw the aggregate as a hue gradient in attachment order instead of
    /// the tag color.
    pub hue_gradient: bool,
}

impl Default for CrystalConfig {
    fn default() -> Self {
        Self {
            min_radius: 20.0,
            inner_radius_scale: 1.1,
            outer_radius_scale: 2.0,
            query_radius: 2.0,
            min_distance: std::f32::consts::SQRT_2,
            cells_x: 128,
            cells_y: 80,
            free_particles: 1,
            max_reposition_attempts: 1000,
            color: [255, 255, 255],
            hue_gradient: true,
        }
    }
}

impl CrystalConfig {
    pub fn stuck_color(&self) -> Rgb<u8> {
        let [r, g, b] = self.color;
        rgb(r, g, b)
    }

    /// Spawn ring for an aggregate of the given radius.
    pub fn annulus(&self, radius: f32) -> Annulus {
        Annulus {
            inner: self.inner_radius_scale * radius + 1.0,
            outer: self.outer_radius_scale * radius,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_radius.is_finite() && self.min_radius > 0.0) {
            return Err(ConfigError::InvalidParameter("min_radius must be positive"));
        }
        if !(self.min_distance > 0.0 && self.query_radius > self.min_distance) {
            return Err(ConfigError::InvalidParameter(
                "query_radius must exceed a positive min_distance",
            ));
        }
        if self.free_particles == 0 {
            return Err(ConfigError::InvalidParameter("free_particles must be at least 1"));
        }
        // The ring only widens with the radius if the outer scale is larger
        let annulus = self.annulus(self.min_radius);
        if annulus.inner >= annulus.outer || self.outer_radius_scale <= self.inner_radius_scale {
            return Err(ConfigError::InvalidAnnulus {
                inner: annulus.inner,
                outer: annulus.outer,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Transition {
    Stick,
    Reposition,
}

pub struct Crystal {
    config: CrystalConfig,
    bounds: Vec2,
    stuck: Vec<Particle>,
    grid: SpatialGrid,
    center: Option<Point2>,
    radius: f32,
    free: Vec<Particle>,
    sparks: Vec<Point2>,
    rng: StdRng,
    // Reused between iterations to avoid a per-step allocation
    transitions: Vec<(usize, Transition)>,
}

impl Crystal {
    /// Creates an empty crystal over a `width` x `height` domain. Nothing
    /// moves until the first `add_particle` seeds it.
    pub fn new(width: f32, height: f32, config: CrystalConfig) -> Result<Self, ConfigError> {
        Self::build(width, height, config, StdRng::from_entropy())
    }

    pub fn with_seed(width: f32, height: f32, config: CrystalConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::build(width, height, config, StdRng::seed_from_u64(seed))
    }

    fn build(width: f32, height: f32, config: CrystalConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = SpatialGrid::new(width, height, config.cells_x, config.cells_y)?;

        info!(
            "Created crystal over {}x{} domain with a {}x{} grid",
            width, height, config.cells_x, config.cells_y
        );

        Ok(Self {
            radius: config.min_radius,
            config,
            bounds: vec2(width, height),
            stuck: Vec::new(),
            grid,
            center: None,
            free: Vec::new(),
            sparks: Vec::new(),
            rng,
            transitions: Vec::new(),
        })
    }

    pub fn config(&self) -> &CrystalConfig {
        &self.config
    }

    /// Number of stuck particles.
    pub fn len(&self) -> usize {
        self.stuck.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stuck.is_empty()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn center(&self) -> Option<Point2> {
        self.center
    }

    /// Stuck particles in attachment order.
    pub fn stuck(&self) -> &[Particle] {
        &self.stuck
    }

    pub fn free_particles(&self) -> &[Particle] {
        &self.free
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Current spawn ring.
    pub fn annulus(&self) -> Annulus {
        self.config.annulus(self.radius)
    }

    /// Positions that stuck since the last call.
    pub fn take_sparks(&mut self) -> Vec<Point2> {
        std::mem::take(&mut self.sparks)
    }

    /// Sticks a particle at `position`. The first particle added to an empty
    /// crystal becomes the center and releases the free particles.
    pub fn add_particle(&mut self, position: Point2) {
        let index = self.stuck.len();
        let mut particle = Particle::new(position);
        particle.color = self.config.stuck_color();
        self.stuck.push(particle);
        self.grid.insert(index, &self.stuck[index]);

        if index == 0 {
            self.center = Some(position);
            info!("Seeded crystal at ({:.1}, {:.1})", position.x, position.y);
            self.spawn_free_particles(position);
        }

        if let Some(center) = self.center {
            self.radius = self.radius.max(center.distance(position));
        }
    }

    /// Whether a free particle at `position` is close enough to stick.
    pub fn is_touching(&self, position: Point2) -> bool {
        let mut touching = false;
        let min_distance = self.config.min_distance;
        self.grid
            .for_each_within(&self.stuck, position, self.config.query_radius, |neighbor| {
                if neighbor.distance <= min_distance {
                    touching = true;
                }
            });
        touching
    }

    /// Runs `iterations` diffusion steps. Returns how many particles stuck.
    pub fn update(&mut self, iterations: usize) -> usize {
        let Some(center) = self.center else {
            return 0;
        };
        if self.stuck.is_empty() {
            return 0;
        }

        let mut stuck_count = 0;
        let mut transitions = std::mem::take(&mut self.transitions);

        for _ in 0..iterations {
            for particle in &mut self.free {
                particle.step(&mut self.rng);
            }

            let outer = self.annulus().outer;
            transitions.clear();
            for (i, particle) in self.free.iter().enumerate() {
                if self.is_touching(particle.position) {
                    transitions.push((i, Transition::Stick));
                } else if center.distance(particle.position) > outer {
                    transitions.push((i, Transition::Reposition));
                }
            }

            for &(i, transition) in &transitions {
                if transition == Transition::Stick {
                    let position = self.free[i].position;
                    self.add_particle(position);
                    self.sparks.push(position);
                    stuck_count += 1;
                    debug!(
                        "Particle stuck at ({:.1}, {:.1}), radius now {:.1}",
                        position.x, position.y, self.radius
                    );
                }
                self.reposition(i, center);
            }
        }

        self.transitions = transitions;
        stuck_count
    }

    /// Clears the aggregate and restores the starting radius. The free
    /// particles are respawned around the previous center.
    pub fn reset(&mut self) {
        self.stuck.clear();
        self.grid.clear();
        self.sparks.clear();
        self.radius = self.config.min_radius;
        info!("Crystal reset");

        if let Some(center) = self.center {
            self.spawn_free_particles(center);
        }
    }

    /// Resets and plants a fresh seed where the first one was.
    pub fn reseed(&mut self) {
        self.reset();
        if let Some(center) = self.center {
            self.add_particle(center);
        }
    }

    fn spawn_free_particles(&mut self, center: Point2) {
        self.free.clear();
        for i in 0..self.config.free_particles {
            self.free.push(Particle::new(center));
            self.reposition(i, center);
        }
    }

    fn reposition(&mut self, index: usize, center: Point2) {
        let annulus = self.annulus();
        let placed = self.free[index].reposition(
            center,
            annulus,
            self.bounds,
            self.config.max_reposition_attempts,
            &mut self.rng,
        );
        if !placed {
            warn!(
                "No spawn point on annulus [{:.1}, {:.1}] inside the domain, clamped instead",
                annulus.inner, annulus.outer
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crystal() -> Crystal {
        Crystal::with_seed(1000.0, 1000.0, CrystalConfig::default(), 42).unwrap()
    }

    #[test]
    fn rejects_empty_annulus() {
        let config = CrystalConfig {
            inner_radius_scale: 2.0,
            outer_radius_scale: 1.0,
            ..CrystalConfig::default()
        };
        assert!(matches!(
            Crystal::new(1000.0, 1000.0, config),
            Err(ConfigError::InvalidAnnulus { .. })
        ));
    }

    #[test]
    fn rejects_query_radius_below_touch_distance() {
        let config = CrystalConfig {
            query_radius: 1.0,
            ..CrystalConfig::default()
        };
        assert!(Crystal::new(1000.0, 1000.0, config).is_err());
    }

    #[test]
    fn first_particle_seeds_center_and_free_particles() {
        let mut crystal = crystal();
        assert_eq!(crystal.update(100), 0);
        assert!(crystal.free_particles().is_empty());

        crystal.add_particle(pt2(500.0, 500.0));
        assert_eq!(crystal.center(), Some(pt2(500.0, 500.0)));
        assert_eq!(crystal.len(), 1);
        assert_eq!(crystal.radius(), 20.0);
        assert_eq!(crystal.free_particles().len(), 1);

        let r = crystal.free_particles()[0].position.distance(pt2(500.0, 500.0));
        let annulus = crystal.annulus();
        assert!(r >= annulus.inner - 1e-3 && r <= annulus.outer + 1e-3);
    }

    #[test]
    fn touch_threshold_includes_diagonal_neighbors() {
        let mut crystal = crystal();
        crystal.add_particle(pt2(500.0, 500.0));
        let eps = 1e-3;
        let sqrt2 = std::f32::consts::SQRT_2;
        assert!(crystal.is_touching(pt2(501.0, 501.0)));
        assert!(crystal.is_touching(pt2(500.0 + sqrt2 - eps, 500.0)));
        assert!(!crystal.is_touching(pt2(500.0 + sqrt2 + eps, 500.0)));
        assert!(!crystal.is_touching(pt2(502.0, 500.0)));
    }

    #[test]
    fn added_particles_grow_the_radius() {
        let mut crystal = crystal();
        crystal.add_particle(pt2(500.0, 500.0));
        crystal.add_particle(pt2(530.0, 500.0));
        assert_eq!(crystal.radius(), 30.0);
        crystal.add_particle(pt2(505.0, 500.0));
        assert_eq!(crystal.radius(), 30.0);
        assert_eq!(crystal.annulus().outer, 60.0);
    }

    #[test]
    fn stuck_particles_take_the_crystal_color() {
        let config = CrystalConfig {
            color: [0, 128, 255],
            ..CrystalConfig::default()
        };
        let mut crystal = Crystal::with_seed(1000.0, 1000.0, config, 5).unwrap();
        crystal.add_particle(pt2(500.0, 500.0));
        while crystal.len() < 3 {
            crystal.update(1000);
        }
        for particle in crystal.stuck() {
            assert_eq!(particle.color, rgb(0, 128, 255));
        }
        assert_eq!(crystal.free_particles()[0].color, rgb(255, 255, 255));
    }

    #[test]
    fn reset_clears_and_reseed_restores_center() {
        let mut crystal = crystal();
        crystal.add_particle(pt2(500.0, 500.0));
        crystal.add_particle(pt2(540.0, 500.0));
        crystal.reset();
        assert!(crystal.is_empty());
        assert!(crystal.grid().is_empty());
        assert_eq!(crystal.radius(), 20.0);
        assert!(!crystal.is_touching(pt2(500.0, 501.0)));
        assert_eq!(crystal.update(50), 0);

        crystal.reseed();
        assert_eq!(crystal.len(), 1);
        assert_eq!(crystal.stuck()[0].position, pt2(500.0, 500.0));
    }

    #[test]
    fn free_particles_stay_near_the_aggregate() {
        let mut crystal = crystal();
        crystal.add_particle(pt2(500.0, 500.0));
        for _ in 0..200 {
            crystal.update(50);
            let outer = crystal.annulus().outer;
            for particle in crystal.free_particles() {
                assert!(particle.position.distance(pt2(500.0, 500.0)) <= outer + 1e-3);
            }
        }
    }

    #[test]
    fn sparks_are_drained_once() {
        let mut crystal = crystal();
        crystal.add_particle(pt2(500.0, 500.0));
        let mut stuck = 0;
        while stuck == 0 {
            stuck = crystal.update(1000);
        }
        assert_eq!(crystal.take_sparks().len(), stuck);
        assert!(crystal.take_sparks().is_empty());
    }
}
