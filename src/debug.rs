/*
 * Debug Information Module
 *
 * Frame statistics shown by the info overlay. The host refreshes them once
 * per update; nothing in the simulation reads them.
 */

use std::time::Duration;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    /// Boids in the flock or stuck particles in the crystal.
    pub agent_count: usize,
    /// Particles that stuck during the last frame.
    pub stuck_last_frame: usize,
}

impl DebugInfo {
    pub fn record_frame(&mut self, fps: f32, frame_time: Duration, agent_count: usize) {
        self.fps = fps;
        self.frame_time = frame_time;
        self.agent_count = agent_count;
    }

    pub fn frame_time_ms(&self) -> f64 {
        self.frame_time.as_secs_f64() * 1000.0
    }
}
