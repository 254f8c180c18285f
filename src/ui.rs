/*
 * UI Module
 *
 * The info overlay toggled with `i`: frame rate plus the values the keyboard
 * controls, drawn as plain text in the top-left corner.
 */

use nannou::prelude::*;

use crate::app::{Model, Simulation};
use crate::debug::DebugInfo;
use crate::params::FlockParams;

pub fn info_lines(simulation: &Simulation, debug_info: &DebugInfo) -> Vec<String> {
    let mut lines = vec![format!(
        "{:4.1} fps  {:.2} ms",
        debug_info.fps,
        debug_info.frame_time_ms()
    )];

    match simulation {
        Simulation::Flocking { flock, params } => {
            lines.push(format!("boids: {}  containment: {:?}", flock.len(), params.containment));
            lines.push(flock_line(params));
        }
        Simulation::Crystal { crystal, .. } => {
            lines.push(format!(
                "crystal size={}  crystal radius={:4.0}  stuck this frame={}",
                crystal.len(),
                crystal.radius(),
                debug_info.stuck_last_frame
            ));
        }
    }
    lines
}

fn flock_line(params: &FlockParams) -> String {
    format!(
        "alignment: {:4.1}  cohesion: {:4.1}  separation: {:4.1}  neighborhood: {:4.1}  separation distance: {:4.1}",
        params.alignment_weight,
        params.cohesion_weight,
        params.separation_weight,
        params.neighborhood_size,
        params.separation_distance
    )
}

pub fn draw_info(draw: &Draw, model: &Model, window_rect: Rect) {
    let margin = 16.0;
    let line_height = 20.0;
    let panel_width = window_rect.w() - 2.0 * margin;

    for (i, text) in info_lines(&model.simulation, &model.debug_info).iter().enumerate() {
        let y = window_rect.top() - margin - i as f32 * line_height;
        draw.text(text)
            .x_y(window_rect.left() + margin + panel_width / 2.0, y)
            .w(panel_width)
            .left_justify()
            .color(WHITE)
            .font_size(14);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Sketch, SketchConfig};

    #[test]
    fn crystal_info_reports_size_and_radius() {
        let config = SketchConfig {
            sketch: Sketch::Crystal,
            seed: Some(1),
            ..SketchConfig::default()
        };
        let simulation = Simulation::new(&config).unwrap();
        let lines = info_lines(&simulation, &DebugInfo::default());
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("crystal size=1"));
        assert!(lines[1].contains("radius=  20"));
    }

    #[test]
    fn flock_info_lists_weights() {
        let line = flock_line(&FlockParams::default());
        assert!(line.contains("alignment:  1.0"));
        assert!(line.contains("neighborhood: 25.0"));
    }
}
