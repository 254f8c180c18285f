/*
 * Renderer Module
 *
 * This module draws both sketches. The simulation works in a y-down domain
 * with the origin in the top-left corner; nannou draws with the origin in
 * the window center and y pointing up, so every position goes through
 * `domain_to_screen` on its way out.
 */

use nannou::prelude::*;

use crate::app::{Model, Simulation};
use crate::boid::Boid;
use crate::crystal::Crystal;
use crate::flock::Flock;
use crate::params::Containment;
use crate::ui;

const SPARK_RADIUS: f32 = 2.0;

pub fn domain_to_screen(p: Point2, domain: Vec2) -> Point2 {
    pt2(p.x - domain.x / 2.0, domain.y / 2.0 - p.y)
}

pub fn screen_to_domain(p: Point2, domain: Vec2) -> Point2 {
    pt2(p.x + domain.x / 2.0, domain.y / 2.0 - p.y)
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let domain = model.domain();
    match &model.simulation {
        Simulation::Flocking { flock, .. } => draw_flock(&draw, flock, model.show_walls, domain),
        Simulation::Crystal { crystal, .. } => draw_crystal(&draw, crystal, &model.sparks, domain),
    }

    if model.show_info {
        ui::draw_info(&draw, model, app.window_rect());
    }

    draw.to_frame(app, &frame).unwrap();
}

fn draw_flock(draw: &Draw, flock: &Flock, show_walls: bool, domain: Vec2) {
    let wrap = flock.containment() == Containment::Wrap;

    if show_walls && !wrap {
        for wall in flock.walls().segments() {
            draw.line()
                .start(domain_to_screen(wall.start, domain))
                .end(domain_to_screen(wall.end, domain))
                .color(WHITE)
                .stroke_weight(1.0);
        }
    }

    for boid in flock.boids() {
        draw_boid(draw, boid, wrap, domain);
    }
}

// Draw a triangle pointing along the velocity
fn draw_boid(draw: &Draw, boid: &Boid, wrap: bool, domain: Vec2) {
    let position = if wrap {
        pt2(boid.position.x.rem_euclid(domain.x), boid.position.y.rem_euclid(domain.y))
    } else {
        boid.position
    };

    let mut forward = boid.velocity.normalize_or_zero();
    if forward == Vec2::ZERO {
        forward = vec2(1.0, 0.0);
    }
    let side = forward.perp();
    let r = boid.radius;
    let points = [
        position + forward * (2.0 * r),
        position - forward * (2.0 * r) + side * r,
        position - forward * (2.0 * r) - side * r,
    ]
    .map(|p| domain_to_screen(p, domain));

    let (red, green, blue) = boid.color.into_components();
    let (red, green, blue) = (red as f32 / 255.0, green as f32 / 255.0, blue as f32 / 255.0);
    draw.polygon()
        .color(rgba(red, green, blue, 0.5))
        .stroke(rgb(red, green, blue))
        .stroke_weight(1.0)
        .points(points);
}

fn draw_crystal(draw: &Draw, crystal: &Crystal, sparks: &[Point2], domain: Vec2) {
    // Hue runs from red to blue in attachment order
    let n = crystal.len().max(1) as f32;
    let gradient = crystal.config().hue_gradient;
    for (i, particle) in crystal.stuck().iter().enumerate() {
        let rect = draw
            .rect()
            .xy(domain_to_screen(particle.position, domain))
            .w_h(1.0, 1.0);
        if gradient {
            rect.color(hsv(240.0 / 360.0 * i as f32 / n, 1.0, 1.0));
        } else {
            rect.color(particle.color);
        }
    }

    for particle in crystal.free_particles() {
        draw.rect()
            .xy(domain_to_screen(particle.position, domain))
            .w_h(1.0, 1.0)
            .color(particle.color);
    }

    for &spark in sparks {
        draw.ellipse()
            .xy(domain_to_screen(spark, domain))
            .radius(SPARK_RADIUS)
            .color(WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_mapping_round_trips_and_flips_y() {
        let domain = vec2(800.0, 600.0);
        assert_eq!(domain_to_screen(pt2(0.0, 0.0), domain), pt2(-400.0, 300.0));
        assert_eq!(domain_to_screen(pt2(400.0, 300.0), domain), pt2(0.0, 0.0));
        let p = pt2(123.0, 456.0);
        assert_eq!(screen_to_domain(domain_to_screen(p, domain), domain), p);
    }
}
