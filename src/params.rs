/*
 * Simulation Parameters Module
 *
 * This module defines the FlockParams struct that contains all the adjustable
 * steering parameters for the flocking simulation. The host owns one instance,
 * tweaks it from keyboard input and passes it by reference to every
 * `Flock::update` call, so no boid holds hidden shared state.
 */

use serde::{Deserialize, Serialize};

/// How boids are kept on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Containment {
    /// Walls repel boids and escapees are teleported back to the center.
    Walls,
    /// The domain is a torus; neighbor queries see across the edges.
    Wrap,
}

impl Containment {
    pub fn toggled(self) -> Self {
        match self {
            Containment::Walls => Containment::Wrap,
            Containment::Wrap => Containment::Walls,
        }
    }
}

// Parameters for the simulation that can be adjusted at runtime
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockParams {
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub wander_weight: f32,
    pub wall_weight: f32,
    /// Radius for alignment and cohesion.
    pub neighborhood_size: f32,
    /// Radius for separation.
    pub separation_distance: f32,
    pub wander_radius: f32,
    pub wander_distance: f32,
    /// Jitter per second applied to the wander target.
    pub wander_jitter: f32,
    pub feeler_length: f32,
    pub containment: Containment,
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 0.5,
            wander_weight: 1.0,
            wall_weight: 1.5,
            neighborhood_size: 25.0,
            separation_distance: 20.0,
            wander_radius: 1.0,
            wander_distance: 2.0,
            wander_jitter: 40.0,
            feeler_length: 32.0,
            containment: Containment::Walls,
        }
    }
}

impl FlockParams {
    /// Largest radius any behavior queries with.
    pub fn max_query_radius(&self) -> f32 {
        self.neighborhood_size.max(self.separation_distance)
    }

    pub fn adjust_alignment(&mut self, delta: f32) {
        self.alignment_weight = clamp_to(self.alignment_weight + delta, Self::weight_range());
    }

    pub fn adjust_cohesion(&mut self, delta: f32) {
        self.cohesion_weight = clamp_to(self.cohesion_weight + delta, Self::weight_range());
    }

    pub fn adjust_separation(&mut self, delta: f32) {
        self.separation_weight = clamp_to(self.separation_weight + delta, Self::weight_range());
    }

    pub fn adjust_neighborhood_size(&mut self, delta: f32) {
        self.neighborhood_size = clamp_to(self.neighborhood_size + delta, Self::radius_range());
    }

    pub fn adjust_separation_distance(&mut self, delta: f32) {
        self.separation_distance = clamp_to(self.separation_distance + delta, Self::radius_range());
    }

    pub fn toggle_containment(&mut self) {
        self.containment = self.containment.toggled();
    }

    // Get parameter ranges for keyboard adjustment
    pub fn weight_range() -> std::ops::RangeInclusive<f32> {
        0.0..=10.0
    }

    pub fn radius_range() -> std::ops::RangeInclusive<f32> {
        1.0..=100.0
    }
}

fn clamp_to(value: f32, range: std::ops::RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjustments_stay_in_range() {
        let mut params = FlockParams::default();
        for _ in 0..20 {
            params.adjust_alignment(-1.0);
            params.adjust_neighborhood_size(10.0);
        }
        assert_eq!(params.alignment_weight, 0.0);
        assert_eq!(params.neighborhood_size, 100.0);
    }

    #[test]
    fn containment_toggles_back_and_forth() {
        let mut params = FlockParams::default();
        params.toggle_containment();
        assert_eq!(params.containment, Containment::Wrap);
        params.toggle_containment();
        assert_eq!(params.containment, Containment::Walls);
    }
}
