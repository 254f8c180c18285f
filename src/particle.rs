/*
 * Particle Module
 *
 * A diffusing particle for the crystal sketch. Free particles take unit
 * steps along one of the four axis directions and are respawned on an
 * annulus around the aggregate whenever they drift too far out.
 */

use nannou::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

use crate::agent::Agent;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Point2,
    pub color: Rgb<u8>,
}

/// The ring `[inner, outer]` free particles are (re)spawned on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Annulus {
    pub inner: f32,
    pub outer: f32,
}

impl Annulus {
    /// Uniform angle, uniform radius. Not area-uniform, which biases spawns
    /// slightly towards the inner edge.
    pub fn sample<R: Rng>(&self, center: Point2, rng: &mut R) -> Point2 {
        let radius = if self.outer > self.inner {
            rng.gen_range(self.inner..=self.outer)
        } else {
            self.inner
        };
        let theta = rng.gen_range(0.0..TAU);
        center + vec2(theta.cos(), theta.sin()) * radius
    }
}

impl Agent for Particle {
    fn position(&self) -> Point2 {
        self.position
    }

    fn set_position(&mut self, position: Point2) {
        self.position = position;
    }
}

impl Particle {
    pub fn new(position: Point2) -> Self {
        Self {
            position,
            color: rgb(255, 255, 255),
        }
    }

    /// One unit step up, right, down or left with equal probability.
    pub fn step<R: Rng>(&mut self, rng: &mut R) {
        let delta = match rng.gen_range(0..4) {
            0 => vec2(0.0, 1.0),
            1 => vec2(1.0, 0.0),
            2 => vec2(0.0, -1.0),
            _ => vec2(-1.0, 0.0),
        };
        self.position += delta;
    }

    /// Moves the particle to a random point of `annulus` around `center` that
    /// lies inside the `[0, bounds.x) x [0, bounds.y)` domain.
    ///
    /// Sampling is retried up to `max_attempts` times. If every sample falls
    /// outside the domain the last one is clamped onto it and `false` is
    /// returned.
    pub fn reposition<R: Rng>(
        &mut self,
        center: Point2,
        annulus: Annulus,
        bounds: Vec2,
        max_attempts: usize,
        rng: &mut R,
    ) -> bool {
        let mut candidate = center;
        for _ in 0..max_attempts.max(1) {
            candidate = annulus.sample(center, rng);
            if in_bounds(candidate, bounds) {
                self.position = candidate;
                return true;
            }
        }

        self.position = pt2(candidate.x.clamp(0.0, bounds.x), candidate.y.clamp(0.0, bounds.y));
        false
    }
}

fn in_bounds(p: Point2, bounds: Vec2) -> bool {
    p.x >= 0.0 && p.x < bounds.x && p.y >= 0.0 && p.y < bounds.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn steps_are_single_axis_units() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut particle = Particle::new(pt2(10.0, 10.0));
        let mut seen = [false; 4];
        for _ in 0..200 {
            let before = particle.position;
            particle.step(&mut rng);
            let d = particle.position - before;
            assert_eq!(d.x.abs() + d.y.abs(), 1.0);
            let dir = match (d.x as i32, d.y as i32) {
                (0, 1) => 0,
                (1, 0) => 1,
                (0, -1) => 2,
                _ => 3,
            };
            seen[dir] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn reposition_lands_on_annulus_inside_domain() {
        let mut rng = StdRng::seed_from_u64(5);
        let center = pt2(500.0, 500.0);
        let annulus = Annulus { inner: 23.0, outer: 40.0 };
        let mut particle = Particle::new(center);
        for _ in 0..100 {
            assert!(particle.reposition(center, annulus, vec2(1000.0, 1000.0), 1000, &mut rng));
            let r = particle.position.distance(center);
            assert!(r >= 23.0 - 1e-3 && r <= 40.0 + 1e-3);
        }
    }

    #[test]
    fn reposition_near_corner_rejects_outside_samples() {
        let mut rng = StdRng::seed_from_u64(8);
        let center = pt2(2.0, 2.0);
        let annulus = Annulus { inner: 10.0, outer: 20.0 };
        let mut particle = Particle::new(center);
        for _ in 0..50 {
            assert!(particle.reposition(center, annulus, vec2(100.0, 100.0), 1000, &mut rng));
            assert!(particle.position.x >= 0.0 && particle.position.y >= 0.0);
        }
    }

    #[test]
    fn reposition_falls_back_to_clamping() {
        let mut rng = StdRng::seed_from_u64(1);
        // Every point of this ring lies outside a 10x10 domain
        let center = pt2(5.0, 5.0);
        let annulus = Annulus { inner: 100.0, outer: 110.0 };
        let mut particle = Particle::new(center);
        assert!(!particle.reposition(center, annulus, vec2(10.0, 10.0), 20, &mut rng));
        let p = particle.position;
        assert!((0.0..=10.0).contains(&p.x) && (0.0..=10.0).contains(&p.y));
    }
}
