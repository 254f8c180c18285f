/*
 * Flock Module
 *
 * The Flock owns the boids, the spatial grid sized for them and the wall
 * enclosure. It drives the per-frame update: for each boid, query neighbors,
 * compute steering, integrate motion, then relocate it in the grid.
 *
 * Boids are only ever moved through the flock, which pairs every position
 * change with a grid relocate so membership cannot drift out of sync.
 */

use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::boid::Boid;
use crate::error::ConfigError;
use crate::params::{Containment, FlockParams};
use crate::spatial_grid::SpatialGrid;
use crate::walls::Walls;

// Rebuild the grid once the ideal cell size drifts this far from the current one
const CELL_RESIZE_THRESHOLD: f32 = 5.0;

/// Timing handed in by the host each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    /// Time since the sketch started, drives the throb animation.
    pub elapsed_ms: f32,
    /// Length of the last frame, scales the wander jitter.
    pub delta_secs: f32,
}

impl FrameTime {
    pub fn new(elapsed: Duration, delta: Duration) -> Self {
        Self {
            elapsed_ms: elapsed.as_secs_f32() * 1000.0,
            delta_secs: delta.as_secs_f32(),
        }
    }

    /// A frame of `delta_secs` at a fixed point in time, for headless runs.
    pub fn fixed(delta_secs: f32) -> Self {
        Self { elapsed_ms: 0.0, delta_secs }
    }
}

pub struct Flock {
    boids: Vec<Boid>,
    grid: SpatialGrid,
    // Cell size the grid was built for; actual cells may be slightly larger
    cell_size: f32,
    walls: Walls,
    containment: Containment,
    rng: StdRng,
}

impl Flock {
    /// Creates an empty flock over a `width` x `height` domain enclosed by the
    /// default octagon of walls.
    pub fn new(width: f32, height: f32, params: &FlockParams) -> Result<Self, ConfigError> {
        Self::build(width, height, params, StdRng::from_entropy())
    }

    pub fn with_seed(width: f32, height: f32, params: &FlockParams, seed: u64) -> Result<Self, ConfigError> {
        Self::build(width, height, params, StdRng::seed_from_u64(seed))
    }

    fn build(width: f32, height: f32, params: &FlockParams, rng: StdRng) -> Result<Self, ConfigError> {
        // Size the cells so that a query never has to search more than four cells
        let cell_size = Self::cell_size_for(params);
        let mut grid = SpatialGrid::with_cell_size(width, height, cell_size)?;
        let none: [Boid; 0] = [];
        grid.set_wrap_mode(params.containment == Containment::Wrap, &none);

        info!(
            "Created flock over {}x{} domain with a {}x{} grid ({:?} containment)",
            width,
            height,
            grid.cells_x(),
            grid.cells_y(),
            params.containment
        );

        Ok(Self {
            boids: Vec::new(),
            grid,
            cell_size,
            walls: Walls::octagon(width, height, width / 8.0),
            containment: params.containment,
            rng,
        })
    }

    fn cell_size_for(params: &FlockParams) -> f32 {
        2.0 * params.max_query_radius()
    }

    /// Replaces the enclosure used in wall mode.
    pub fn with_walls(mut self, walls: Walls) -> Self {
        self.walls = walls;
        self
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn walls(&self) -> &Walls {
        &self.walls
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn containment(&self) -> Containment {
        self.containment
    }

    pub fn center(&self) -> Point2 {
        pt2(self.grid.width() / 2.0, self.grid.height() / 2.0)
    }

    /// Appends a boid and indexes it. Returns its index.
    pub fn add_boid(&mut self, boid: Boid) -> usize {
        let index = self.boids.len();
        self.boids.push(boid);
        self.grid.insert(index, &self.boids[index]);
        index
    }

    /// Builds a boid with the flock's own randomness and adds it.
    pub fn spawn_boid(&mut self, position: Point2, max_speed: f32, max_force: f32) -> usize {
        let boid = Boid::new(position, max_speed, max_force, &mut self.rng);
        self.add_boid(boid)
    }

    /// Moves a boid and keeps the grid in step with it.
    pub fn move_boid(&mut self, index: usize, position: Point2) {
        let previous = self.boids[index].position;
        self.boids[index].position = position;
        self.grid.relocate(index, &self.boids[index], previous);
    }

    /// Switches between walls and wrap-around. Entering wall mode pulls any
    /// boid outside the enclosure back to the center.
    pub fn set_containment(&mut self, containment: Containment) {
        if self.containment == containment {
            return;
        }
        self.containment = containment;
        self.grid.set_wrap_mode(containment == Containment::Wrap, &self.boids);
        info!("Flock containment switched to {:?}", containment);

        if containment == Containment::Walls {
            self.ensure_containment();
        }
    }

    fn resize_grid_if_needed(&mut self, params: &FlockParams) {
        let desired = Self::cell_size_for(params);
        if (desired - self.cell_size).abs() <= CELL_RESIZE_THRESHOLD {
            return;
        }

        match SpatialGrid::with_cell_size(self.grid.width(), self.grid.height(), desired) {
            Ok(mut grid) => {
                grid.set_wrap_mode(self.grid.wrap_mode(), &self.boids);
                grid.rebuild(&self.boids);
                debug!("Resized flock grid to {}x{} cells", grid.cells_x(), grid.cells_y());
                self.grid = grid;
                self.cell_size = desired;
            }
            Err(e) => warn!("Keeping current flock grid: {}", e),
        }
    }

    /// Advances every boid by one step. Returns how many boids got past the
    /// walls and were sent back to the center (always zero when wrapping).
    pub fn update(&mut self, params: &FlockParams, time: FrameTime) -> usize {
        self.set_containment(params.containment);
        self.resize_grid_if_needed(params);

        let radius = params.max_query_radius();
        let walls = match self.containment {
            Containment::Walls => Some(&self.walls),
            Containment::Wrap => None,
        };

        for i in 0..self.boids.len() {
            let neighbors = self.grid.query_neighbors(&self.boids, self.boids[i].position, radius);
            let mut forces = self.boids[i].flocking_forces(&self.boids, &neighbors, walls, params);

            let boid = &mut self.boids[i];
            forces.wander = boid.wander(params, time.delta_secs, &mut self.rng);
            boid.apply_force(forces.weighted_sum(params));

            let previous = boid.position;
            boid.update_motion(time.elapsed_ms);
            self.grid.relocate(i, &self.boids[i], previous);
        }

        match self.containment {
            Containment::Walls => self.ensure_containment(),
            Containment::Wrap => 0,
        }
    }

    /// Teleports every boid outside the wall enclosure to the domain center.
    /// Returns how many were moved.
    pub fn ensure_containment(&mut self) -> usize {
        if self.walls.is_empty() {
            return 0;
        }

        let center = self.center();
        let mut teleported = 0;
        for i in 0..self.boids.len() {
            if !self.walls.contains(self.boids[i].position) {
                self.move_boid(i, center);
                teleported += 1;
            }
        }

        if teleported > 0 {
            debug!("Returned {} escaped boids to the center", teleported);
        }
        teleported
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;

    fn flock() -> Flock {
        Flock::with_seed(800.0, 600.0, &FlockParams::default(), 11).unwrap()
    }

    fn assert_indexed(flock: &Flock) {
        assert_eq!(flock.grid.len(), flock.boids.len());
        for (i, boid) in flock.boids.iter().enumerate() {
            assert!(flock.grid.contains(i, boid), "boid {} missing from its cell", i);
        }
    }

    #[test]
    fn invalid_domain_is_rejected() {
        assert!(Flock::new(-1.0, 600.0, &FlockParams::default()).is_err());
    }

    #[test]
    fn update_keeps_grid_membership_in_sync() {
        let mut flock = flock();
        for i in 0..60 {
            flock.spawn_boid(pt2(300.0 + i as f32, 300.0), 2.0, 0.1);
        }
        let params = FlockParams::default();
        for _ in 0..30 {
            flock.update(&params, FrameTime::fixed(1.0 / 60.0));
            assert_indexed(&flock);
        }
    }

    #[test]
    fn boids_added_mid_run_are_indexed() {
        let mut flock = flock();
        let params = FlockParams::default();
        flock.spawn_boid(pt2(400.0, 300.0), 2.0, 0.1);
        flock.update(&params, FrameTime::fixed(1.0 / 60.0));
        let index = flock.spawn_boid(pt2(100.0, 300.0), 2.0, 0.05);
        assert_eq!(index, 1);
        assert_indexed(&flock);
    }

    #[test]
    fn switching_modes_rebuilds_membership() {
        let mut flock = flock();
        flock.spawn_boid(pt2(400.0, 300.0), 2.0, 0.1);
        flock.set_containment(Containment::Wrap);
        flock.move_boid(0, pt2(-20.0, 300.0));
        assert_indexed(&flock);
        assert_eq!(flock.grid.query(flock.boids(), pt2(790.0, 300.0), 40.0), vec![0]);

        flock.set_containment(Containment::Walls);
        assert_eq!(flock.boids[0].position(), flock.center());
        assert_indexed(&flock);
    }

    #[test]
    fn velocities_stay_under_max_speed() {
        let mut flock = flock();
        for i in 0..40 {
            flock.spawn_boid(pt2(380.0 + (i % 8) as f32 * 5.0, 280.0 + (i / 8) as f32 * 5.0), 3.0, 0.1);
        }
        let params = FlockParams::default();
        for _ in 0..50 {
            flock.update(&params, FrameTime::fixed(1.0 / 30.0));
            for boid in flock.boids() {
                assert!(boid.velocity.length() <= boid.max_speed + 1e-4);
            }
        }
    }
}
