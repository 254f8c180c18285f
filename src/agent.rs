/*
 * Agent Module
 *
 * The capability the spatial grid needs from anything it indexes: a readable
 * and writable position. Boids and DLA particles both implement it.
 */

use nannou::prelude::*;

pub trait Agent {
    fn position(&self) -> Point2;

    /// Moves the agent. Owners that keep the agent in a `SpatialGrid` must
    /// follow this with `SpatialGrid::relocate` using the previous position.
    fn set_position(&mut self, position: Point2);
}

impl Agent for Point2 {
    fn position(&self) -> Point2 {
        *self
    }

    fn set_position(&mut self, position: Point2) {
        *self = position;
    }
}
