/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct for efficient neighbor lookups.
 * It divides a fixed width x height domain into a cells_x x cells_y grid of
 * buckets, allowing radius queries to touch only the handful of cells that
 * overlap the query box instead of scanning every agent.
 *
 * The grid never owns agents. Buckets hold keys (indices into the owner's
 * agent slice) and positions are read back from that slice during queries.
 * Owners must pair every position change with `relocate`.
 *
 * Two topologies are supported:
 * - Clamped: the query box is clipped to the domain and positions outside the
 *   domain fall into the nearest edge cell.
 * - Wrapped (toroidal): positions map onto the domain with a Euclidean
 *   remainder and distances are measured to the nearest periodic image, so
 *   agents across an edge seam are neighbors.
 */

use nannou::prelude::*;
use std::ops::RangeInclusive;

use crate::agent::Agent;
use crate::error::ConfigError;

/// A query hit: the member's key, its offset from the query target and the
/// length of that offset. In wrap mode the offset points at the nearest
/// periodic image of the member.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub offset: Vec2,
    pub distance: f32,
}

#[derive(Clone, Debug)]
pub struct SpatialGrid {
    width: f32,
    height: f32,
    cells_x: usize,
    cells_y: usize,
    cell_width: f32,
    cell_height: f32,
    wrap_mode: bool,
    grid: Vec<Vec<usize>>,
    len: usize,
}

impl SpatialGrid {
    pub fn new(width: f32, height: f32, cells_x: usize, cells_y: usize) -> Result<Self, ConfigError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidDomain { width, height });
        }
        if cells_x == 0 || cells_y == 0 {
            return Err(ConfigError::ZeroCells { cells_x, cells_y });
        }

        let mut grid = Vec::with_capacity(cells_x * cells_y);
        grid.resize_with(cells_x * cells_y, Vec::new);

        Ok(Self {
            width,
            height,
            cells_x,
            cells_y,
            cell_width: width / cells_x as f32,
            cell_height: height / cells_y as f32,
            wrap_mode: false,
            grid,
            len: 0,
        })
    }

    /// Sizes the grid so each cell is at least `cell_size` wide, which keeps a
    /// query of radius `cell_size / 2` inside a 2x2 block of cells.
    pub fn with_cell_size(width: f32, height: f32, cell_size: f32) -> Result<Self, ConfigError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(ConfigError::InvalidParameter("cell size must be positive"));
        }
        let cells_x = ((width / cell_size).floor() as usize).max(1);
        let cells_y = ((height / cell_size).floor() as usize).max(1);
        Self::new(width, height, cells_x, cells_y)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn cells_x(&self) -> usize {
        self.cells_x
    }

    pub fn cells_y(&self) -> usize {
        self.cells_y
    }

    pub fn cell_size(&self) -> Vec2 {
        vec2(self.cell_width, self.cell_height)
    }

    pub fn wrap_mode(&self) -> bool {
        self.wrap_mode
    }

    /// Number of keys currently stored across all buckets.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // Map one coordinate onto its cell along an axis
    #[inline]
    fn axis_cell(&self, value: f32, extent: f32, cell: f32, count: usize) -> usize {
        let value = if self.wrap_mode { value.rem_euclid(extent) } else { value };
        // Clamping covers positions on the far edge and outside the domain;
        // NaN casts to zero.
        (value / cell).floor().clamp(0.0, (count - 1) as f32) as usize
    }

    /// Row-major bucket index (`col + row * cells_x`) for a position. Always
    /// within `0..cells_x * cells_y`.
    #[inline]
    pub fn cell_index(&self, position: Point2) -> usize {
        let col = self.axis_cell(position.x, self.width, self.cell_width, self.cells_x);
        let row = self.axis_cell(position.y, self.height, self.cell_height, self.cells_y);
        col + row * self.cells_x
    }

    /// Adds `key` to the bucket for the agent's current position.
    pub fn insert<A: Agent>(&mut self, key: usize, agent: &A) {
        let cell_index = self.cell_index(agent.position());
        self.grid[cell_index].push(key);
        self.len += 1;
    }

    /// Moves `key` between buckets after its agent moved away from `previous`.
    /// Returns true when the key changed buckets.
    pub fn relocate<A: Agent>(&mut self, key: usize, agent: &A, previous: Point2) -> bool {
        let old_index = self.cell_index(previous);
        let new_index = self.cell_index(agent.position());
        if old_index == new_index {
            return false;
        }

        let removed = Self::take_from_bucket(&mut self.grid[old_index], key);
        debug_assert!(removed, "relocated key {} was not in its previous cell", key);
        self.grid[new_index].push(key);
        if !removed {
            self.len += 1;
        }
        true
    }

    /// Removes `key`, looked up by the position it was last indexed at.
    pub fn remove(&mut self, key: usize, position: Point2) -> bool {
        let cell_index = self.cell_index(position);
        let removed = Self::take_from_bucket(&mut self.grid[cell_index], key);
        if removed {
            self.len -= 1;
        }
        removed
    }

    fn take_from_bucket(bucket: &mut Vec<usize>, key: usize) -> bool {
        match bucket.iter().position(|&k| k == key) {
            Some(slot) => {
                bucket.swap_remove(slot);
                true
            }
            None => false,
        }
    }

    /// Whether `key` sits in the bucket matching the agent's current position.
    pub fn contains<A: Agent>(&self, key: usize, agent: &A) -> bool {
        self.grid[self.cell_index(agent.position())].contains(&key)
    }

    // Clear the grid
    pub fn clear(&mut self) {
        for cell in &mut self.grid {
            cell.clear();
        }
        self.len = 0;
    }

    /// Clears the grid and indexes every agent of the slice under its index.
    pub fn rebuild<A: Agent>(&mut self, agents: &[A]) {
        self.clear();
        for (i, agent) in agents.iter().enumerate() {
            self.insert(i, agent);
        }
    }

    /// Switches topology. The cell mapping differs between the modes for
    /// positions outside the domain, so membership is rebuilt from `agents`.
    pub fn set_wrap_mode<A: Agent>(&mut self, wrap: bool, agents: &[A]) {
        if self.wrap_mode != wrap {
            self.wrap_mode = wrap;
            self.rebuild(agents);
        }
    }

    /// Vector from `from` to `to`. In wrap mode each component is reduced to
    /// the nearest periodic image.
    #[inline]
    pub fn offset(&self, from: Point2, to: Point2) -> Vec2 {
        let mut d = to - from;
        if self.wrap_mode {
            d.x -= self.width * (d.x / self.width).round();
            d.y -= self.height * (d.y / self.height).round();
        }
        d
    }

    // Span of cells along one axis touched by [center - radius, center + radius].
    // Wrapped spans may run past either end and are folded back with rem_euclid.
    fn axis_span(&self, center: f32, radius: f32, extent: f32, cell: f32, count: usize) -> RangeInclusive<isize> {
        let full = 0..=count as isize - 1;
        if !self.wrap_mode {
            let lo = self.axis_cell(center - radius, extent, cell, count);
            let hi = self.axis_cell(center + radius, extent, cell, count);
            return lo as isize..=hi as isize;
        }

        if 2.0 * radius >= extent {
            return full;
        }
        let center = center.rem_euclid(extent);
        let lo = ((center - radius) / cell).floor() as isize;
        let hi = ((center + radius) / cell).floor() as isize;
        if hi - lo + 1 >= count as isize {
            return full;
        }
        lo..=hi
    }

    /// Visits every agent strictly closer than `radius` to `target`.
    ///
    /// The query box is converted to a rectangle of cells first; only members
    /// of those cells get the exact distance test.
    pub fn for_each_within<A, F>(&self, agents: &[A], target: Point2, radius: f32, mut visit: F)
    where
        A: Agent,
        F: FnMut(Neighbor),
    {
        if self.len == 0 || radius.is_nan() || radius <= 0.0 {
            return;
        }

        let cols = self.axis_span(target.x, radius, self.width, self.cell_width, self.cells_x);
        let rows = self.axis_span(target.y, radius, self.height, self.cell_height, self.cells_y);
        let (cells_x, cells_y) = (self.cells_x as isize, self.cells_y as isize);

        for row in rows {
            let row_offset = row.rem_euclid(cells_y) as usize * self.cells_x;
            for col in cols.clone() {
                let col = col.rem_euclid(cells_x) as usize;
                for &key in &self.grid[row_offset + col] {
                    let offset = self.offset(target, agents[key].position());
                    let distance = offset.length();
                    if distance < radius {
                        visit(Neighbor { index: key, offset, distance });
                    }
                }
            }
        }
    }

    /// Keys of all agents within `radius` of `target`.
    pub fn query<A: Agent>(&self, agents: &[A], target: Point2, radius: f32) -> Vec<usize> {
        let mut result = Vec::new();
        self.for_each_within(agents, target, radius, |n| result.push(n.index));
        result
    }

    /// Like `query`, keeping the offset and distance of each hit.
    pub fn query_neighbors<A: Agent>(&self, agents: &[A], target: Point2, radius: f32) -> Vec<Neighbor> {
        let mut result = Vec::new();
        self.for_each_within(agents, target, radius, |n| result.push(n));
        result
    }
}
