/*
 * Input Module
 *
 * Keyboard and mouse handling for both sketches. Keys go through
 * `received_character` so upper and lower case can do different things.
 *
 * Flocking:
 * - a/A z/Z: alignment up/down by 0.1/1
 * - d/D c/C: cohesion up/down by 0.1/1
 * - s/S x/X: separation up/down by 0.1/1
 * - h/n: neighborhood size up/down by 1
 * - j/m: separation distance up/down by 1
 * - w: toggle walls and wrap-around
 * - q: show or hide walls
 * - click: add a boid under the mouse
 *
 * Crystal:
 * - r: reseed the crystal
 *
 * Both: i toggles the info overlay.
 */

use nannou::prelude::*;
use nannou::winit::event::MouseButton;
use tracing::info;

use crate::app::{Model, Simulation};
use crate::params::{Containment, FlockParams};

/// What a key does to the flocking parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FlockCommand {
    Alignment(f32),
    Cohesion(f32),
    Separation(f32),
    NeighborhoodSize(f32),
    SeparationDistance(f32),
    ToggleContainment,
    ToggleWalls,
}

impl FlockCommand {
    pub fn from_char(c: char) -> Option<Self> {
        use FlockCommand::*;
        let command = match c {
            'a' => Alignment(0.1),
            'A' => Alignment(1.0),
            'z' => Alignment(-0.1),
            'Z' => Alignment(-1.0),
            'd' => Cohesion(0.1),
            'D' => Cohesion(1.0),
            'c' => Cohesion(-0.1),
            'C' => Cohesion(-1.0),
            's' => Separation(0.1),
            'S' => Separation(1.0),
            'x' => Separation(-0.1),
            'X' => Separation(-1.0),
            'h' | 'H' => NeighborhoodSize(1.0),
            'n' | 'N' => NeighborhoodSize(-1.0),
            'j' | 'J' => SeparationDistance(1.0),
            'm' | 'M' => SeparationDistance(-1.0),
            'w' => ToggleContainment,
            'q' => ToggleWalls,
            _ => return None,
        };
        Some(command)
    }

    /// Applies the command. Returns whether the walls should now be shown,
    /// given whether they were.
    pub fn apply(self, params: &mut FlockParams, show_walls: bool) -> bool {
        use FlockCommand::*;
        match self {
            Alignment(delta) => params.adjust_alignment(delta),
            Cohesion(delta) => params.adjust_cohesion(delta),
            Separation(delta) => params.adjust_separation(delta),
            NeighborhoodSize(delta) => params.adjust_neighborhood_size(delta),
            SeparationDistance(delta) => params.adjust_separation_distance(delta),
            ToggleContainment => {
                params.toggle_containment();
                // Walls are hidden while they have no effect
                return params.containment == Containment::Walls && show_walls;
            }
            ToggleWalls => return !show_walls,
        }
        show_walls
    }
}

pub fn received_character(_app: &App, model: &mut Model, c: char) {
    if c == 'i' {
        model.show_info = !model.show_info;
        return;
    }

    match &mut model.simulation {
        Simulation::Flocking { params, .. } => {
            if let Some(command) = FlockCommand::from_char(c) {
                model.show_walls = command.apply(params, model.show_walls);
                if command == FlockCommand::ToggleContainment {
                    info!("Containment set to {:?}", params.containment);
                }
            }
        }
        Simulation::Crystal { crystal, .. } => {
            if c == 'r' {
                crystal.reseed();
                model.sparks.clear();
            }
        }
    }
}

pub fn mouse_pressed(app: &App, model: &mut Model, _button: MouseButton) {
    let domain = model.domain();
    let position = crate::renderer::screen_to_domain(pt2(app.mouse.x, app.mouse.y), domain);
    let (speed, force) = (model.config.click_speed, model.config.click_force);

    if let Simulation::Flocking { flock, .. } = &mut model.simulation {
        flock.spawn_boid(position, speed, force);
    }
}
