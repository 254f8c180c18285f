/*
 * Boid Module
 *
 * This module defines the Boid struct and its steering behaviors.
 * Each boid combines five steering forces every step:
 * 1. Separation: Avoid crowding neighbors
 * 2. Alignment: Steer towards the average heading of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 * 4. Wander: Smooth, temporally correlated random steering
 * 5. Wall avoidance: Feelers push the boid away from walls before it hits them
 *
 * Neighbor lists come from `SpatialGrid::query_neighbors`, whose offsets are
 * already wrap-aware, so these behaviors never look at raw position deltas.
 */

use nannou::prelude::*;
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, TAU};

use crate::agent::Agent;
use crate::params::FlockParams;
use crate::spatial_grid::Neighbor;
use crate::walls::Walls;
use crate::BOID_SIZE;

/// Milliseconds per radian of the throb animation.
pub const THROB_PERIOD: f32 = 250.0;

// Inside this distance `arrive` brakes linearly
const ARRIVAL_DISTANCE: f32 = 100.0;

#[derive(Clone, Debug)]
pub struct Boid {
    pub position: Point2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub max_speed: f32,
    pub max_force: f32,
    /// Drawing radius, pulses with elapsed time.
    pub radius: f32,
    pub color: Rgb<u8>,
    throb_offset: f32,
    wander_target: Vec2,
}

/// The unweighted output of every behavior for one step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SteeringForces {
    pub separation: Vec2,
    pub alignment: Vec2,
    pub cohesion: Vec2,
    pub wander: Vec2,
    pub avoid_walls: Vec2,
}

impl SteeringForces {
    pub fn weighted_sum(&self, params: &FlockParams) -> Vec2 {
        self.separation * params.separation_weight
            + self.alignment * params.alignment_weight
            + self.cohesion * params.cohesion_weight
            + self.wander * params.wander_weight
            + self.avoid_walls * params.wall_weight
    }
}

impl Agent for Boid {
    fn position(&self) -> Point2 {
        self.position
    }

    fn set_position(&mut self, position: Point2) {
        self.position = position;
    }
}

impl Boid {
    pub fn new<R: Rng>(position: Point2, max_speed: f32, max_force: f32, rng: &mut R) -> Self {
        // Random initial velocity
        let velocity = vec2(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        let color = rgb(rng.gen::<u8>(), rng.gen::<u8>(), rng.gen::<u8>());
        let theta = rng.gen_range(0.0..TAU);

        Self {
            position,
            velocity,
            acceleration: Vec2::ZERO,
            max_speed,
            max_force,
            radius: BOID_SIZE,
            color,
            throb_offset: rng.gen_range(0.0..THROB_PERIOD),
            wander_target: vec2(theta.cos(), theta.sin()),
        }
    }

    // Apply a force to the boid
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// Current heading in radians, measured from the +x axis.
    pub fn heading(&self) -> f32 {
        self.velocity.y.atan2(self.velocity.x)
    }

    /// Integrates one step: velocity += acceleration (capped at `max_speed`),
    /// position += velocity, acceleration reset. Also recomputes the throb
    /// radius from `elapsed_ms`.
    pub fn update_motion(&mut self, elapsed_ms: f32) {
        self.radius = BOID_SIZE * (1.0 + 0.5 * (self.throb_offset + elapsed_ms / THROB_PERIOD).sin());

        self.velocity = limit(self.velocity + self.acceleration, self.max_speed);
        self.position += self.velocity;
        self.acceleration = Vec2::ZERO;
    }

    /// Steering vector towards `target`: desired velocity minus current
    /// velocity, capped at `max_force`. With `slowdown` the desired speed
    /// shrinks linearly inside `ARRIVAL_DISTANCE`.
    pub fn steer(&self, target: Point2, slowdown: bool) -> Vec2 {
        let desired = target - self.position;
        let d = desired.length();
        if d <= 0.0 {
            return Vec2::ZERO;
        }

        let speed = if slowdown && d < ARRIVAL_DISTANCE {
            self.max_speed * (d / ARRIVAL_DISTANCE)
        } else {
            self.max_speed
        };
        limit(desired / d * speed - self.velocity, self.max_force)
    }

    pub fn seek(&mut self, target: Point2) {
        let force = self.steer(target, false);
        self.apply_force(force);
    }

    pub fn arrive(&mut self, target: Point2) {
        let force = self.steer(target, true);
        self.apply_force(force);
    }

    // Reynolds: Steering = Desired - Velocity, with desired at full speed along `direction`
    fn steer_along(&self, direction: Vec2) -> Vec2 {
        if direction.length() > 0.0 {
            limit(direction.normalize() * self.max_speed - self.velocity, self.max_force)
        } else {
            Vec2::ZERO
        }
    }

    // Calculate separation force (avoid crowding neighbors)
    pub fn separation(&self, neighbors: &[Neighbor], separation_distance: f32) -> Vec2 {
        let mut steering = Vec2::ZERO;
        let mut count = 0;

        for neighbor in neighbors {
            let d = neighbor.distance;
            if d > 0.0 && d < separation_distance {
                // Point away from the neighbor, weighted by inverse distance
                steering -= neighbor.offset / d / d;
                count += 1;
            }
        }

        if count == 0 {
            return Vec2::ZERO;
        }
        self.steer_along(steering / count as f32)
    }

    // Calculate alignment force (steer towards average heading of neighbors)
    pub fn alignment(&self, boids: &[Boid], neighbors: &[Neighbor], neighborhood_size: f32) -> Vec2 {
        let mut heading = Vec2::ZERO;
        let mut count = 0;

        for neighbor in neighbors {
            if neighbor.distance > 0.0 && neighbor.distance < neighborhood_size {
                heading += boids[neighbor.index].velocity;
                count += 1;
            }
        }

        if count == 0 {
            return Vec2::ZERO;
        }
        self.steer_along(heading / count as f32)
    }

    // Calculate cohesion force (steer towards average position of neighbors)
    pub fn cohesion(&self, neighbors: &[Neighbor], neighborhood_size: f32) -> Vec2 {
        let mut offset_sum = Vec2::ZERO;
        let mut count = 0;

        for neighbor in neighbors {
            if neighbor.distance > 0.0 && neighbor.distance < neighborhood_size {
                offset_sum += neighbor.offset;
                count += 1;
            }
        }

        if count == 0 {
            return Vec2::ZERO;
        }
        // Centroid of the nearest images, seen from this boid
        self.steer(self.position + offset_sum / count as f32, false)
    }

    /// Jitters the persistent wander target, projects it ahead of the boid and
    /// steers towards it. `dt` is the frame delta in seconds.
    pub fn wander<R: Rng>(&mut self, params: &FlockParams, dt: f32, rng: &mut R) -> Vec2 {
        let jitter = params.wander_jitter * dt;
        self.wander_target += vec2(rng.gen_range(-1.0..=1.0) * jitter, rng.gen_range(-1.0..=1.0) * jitter);
        self.wander_target = self.wander_target.normalize_or_zero() * params.wander_radius;
        if self.wander_target == Vec2::ZERO {
            self.wander_target = vec2(params.wander_radius, 0.0);
        }

        let local_target = self.wander_target + vec2(params.wander_distance, 0.0);
        let world_target = self.to_world(local_target);
        self.steer(world_target, false)
    }

    /// Converts a point in boid-local coordinates (x along the heading) to
    /// world coordinates.
    pub fn to_world(&self, local: Point2) -> Point2 {
        self.position + rotate(local, self.heading())
    }

    /// Tips of the three feelers: straight ahead, then two shorter ones at
    /// -45 and +45 degrees. Lengths scale with speed.
    pub fn feelers(&self, feeler_length: f32) -> [Point2; 3] {
        [
            self.position + self.velocity * feeler_length,
            self.position + rotate(self.velocity, FRAC_PI_2 * 3.5) * (feeler_length / 2.0),
            self.position + rotate(self.velocity, FRAC_PI_2 * 0.5) * (feeler_length / 2.0),
        ]
    }

    /// Pushes along the normal of the closest wall a feeler crosses, scaled
    /// by how far that feeler overshoots the wall.
    pub fn avoid_walls(&self, walls: &Walls, feeler_length: f32) -> Vec2 {
        let closest = self
            .feelers(feeler_length)
            .into_iter()
            .filter_map(|feeler| {
                walls
                    .closest_intersection(self.position, feeler)
                    .map(|(wall, hit)| (wall, hit, feeler))
            })
            .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance));

        match closest {
            Some((wall, hit, feeler)) => wall.normal() * (feeler - hit.point).length(),
            None => Vec2::ZERO,
        }
    }

    /// Every behavior except wander, which needs mutable state and randomness.
    pub fn flocking_forces(
        &self,
        boids: &[Boid],
        neighbors: &[Neighbor],
        walls: Option<&Walls>,
        params: &FlockParams,
    ) -> SteeringForces {
        SteeringForces {
            separation: self.separation(neighbors, params.separation_distance),
            alignment: self.alignment(boids, neighbors, params.neighborhood_size),
            cohesion: self.cohesion(neighbors, params.neighborhood_size),
            wander: Vec2::ZERO,
            avoid_walls: walls.map_or(Vec2::ZERO, |walls| self.avoid_walls(walls, params.feeler_length)),
        }
    }
}

/// Caps the magnitude of `v` at `max`.
#[inline]
pub fn limit(v: Vec2, max: f32) -> Vec2 {
    let length_squared = v.length_squared();
    if length_squared > max * max {
        v * (max / length_squared.sqrt())
    } else {
        v
    }
}

#[inline]
fn rotate(v: Vec2, theta: f32) -> Vec2 {
    let (sin, cos) = theta.sin_cos();
    vec2(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}
