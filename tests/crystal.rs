// Diffusion-limited aggregation: growth, bounds and reset.

use nannou::prelude::*;

use cellspace::{Crystal, CrystalConfig};

fn seed_position() -> Point2 {
    pt2(500.0, 500.0)
}

fn seeded_crystal(seed: u64) -> Crystal {
    let mut crystal = Crystal::with_seed(1000.0, 1000.0, CrystalConfig::default(), seed).unwrap();
    crystal.add_particle(seed_position());
    crystal
}

#[test]
fn fixed_seed_grows_within_ten_thousand_iterations() {
    let mut crystal = seeded_crystal(1);
    crystal.update(10_000);
    assert!(crystal.len() >= 2, "only {} particles after 10k steps", crystal.len());
    assert!(crystal.radius() <= 1000.0);
}

#[test]
fn radius_never_shrinks_while_growing() {
    let mut crystal = seeded_crystal(99);
    let mut last_radius = crystal.radius();
    let mut last_len = crystal.len();
    while crystal.len() < 40 {
        crystal.update(1_000);
        assert!(crystal.radius() >= last_radius);
        assert!(crystal.len() >= last_len);
        last_radius = crystal.radius();
        last_len = crystal.len();
    }

    for particle in crystal.stuck() {
        assert!(particle.position.distance(seed_position()) <= crystal.radius() + 1e-3);
    }
}

#[test]
fn every_stuck_particle_touched_an_earlier_one() {
    let mut crystal = seeded_crystal(7);
    while crystal.len() < 25 {
        crystal.update(1_000);
    }

    let stuck = crystal.stuck();
    for (i, particle) in stuck.iter().enumerate().skip(1) {
        let touched = stuck[..i]
            .iter()
            .any(|earlier| earlier.position.distance(particle.position) <= std::f32::consts::SQRT_2 + 1e-4);
        assert!(touched, "particle {} stuck without a neighbor", i);
    }
}

#[test]
fn touch_threshold_is_inclusive_at_min_distance() {
    let crystal = seeded_crystal(1);
    let min_distance = crystal.config().min_distance;
    let eps = 1e-3;
    for direction in [vec2(1.0, 0.0), vec2(0.0, -1.0), vec2(1.0, 1.0).normalize()] {
        assert!(crystal.is_touching(seed_position() + direction * (min_distance - eps)));
        assert!(!crystal.is_touching(seed_position() + direction * (min_distance + eps)));
    }
}

#[test]
fn reset_restores_the_initial_state() {
    let mut crystal = seeded_crystal(3);
    while crystal.len() < 5 {
        crystal.update(1_000);
    }

    crystal.reset();
    assert_eq!(crystal.len(), 0);
    assert!(crystal.grid().is_empty());
    assert_eq!(crystal.radius(), crystal.config().min_radius);
    assert!(!crystal.is_touching(seed_position()));

    crystal.reseed();
    assert_eq!(crystal.len(), 1);
    assert_eq!(crystal.center(), Some(seed_position()));
    assert_eq!(crystal.free_particles().len(), 1);
}

#[test]
fn several_free_particles_walk_at_once() {
    let config = CrystalConfig {
        free_particles: 16,
        ..CrystalConfig::default()
    };
    let mut crystal = Crystal::with_seed(1000.0, 1000.0, config, 11).unwrap();
    crystal.add_particle(seed_position());
    assert_eq!(crystal.free_particles().len(), 16);

    let mut stuck = 0;
    for _ in 0..20 {
        stuck += crystal.update(1_000);
    }
    assert_eq!(crystal.len(), 1 + stuck);
    assert_eq!(crystal.grid().len(), crystal.len());
    assert_eq!(crystal.free_particles().len(), 16);
}
