/*
 * Walls Module
 *
 * Line-segment walls that boids steer away from, plus the enclosure test used
 * to catch boids that slipped through anyway.
 *
 * Walls are ordered so that `normal()` points into the enclosure (clockwise
 * winding in the y-down domain coordinates the simulation uses).
 */

use nannou::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wall {
    pub start: Point2,
    pub end: Point2,
}

/// Where a ray hit a wall and how far that is from the ray origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub point: Point2,
    pub distance: f32,
}

impl Wall {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Unit normal `(-dy, dx)` of the wall direction.
    pub fn normal(&self) -> Vec2 {
        let d = self.end - self.start;
        vec2(-d.y, d.x).normalize_or_zero()
    }

    /// Intersects the segment `from -> to` with this wall using the two
    /// parameter determinant form. Parallel segments and hits at or beyond
    /// either segment's end points report no intersection.
    pub fn intersect(&self, from: Point2, to: Point2) -> Option<Intersection> {
        let ray = to - from;
        let wall = self.end - self.start;

        let det = ray.x * wall.y - ray.y * wall.x;
        if det == 0.0 {
            return None;
        }

        let r_numerator = (from.y - self.start.y) * wall.x - (from.x - self.start.x) * wall.y;
        let s_numerator = (from.y - self.start.y) * ray.x - (from.x - self.start.x) * ray.y;
        let r = r_numerator / det;
        let s = s_numerator / det;

        if 0.0 < r && r < 1.0 && 0.0 < s && s < 1.0 {
            let point = from + ray * r;
            Some(Intersection { point, distance: from.distance(point) })
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Walls {
    segments: Vec<Wall>,
}

impl Walls {
    pub fn new(segments: Vec<Wall>) -> Self {
        Self { segments }
    }

    /// Rectangle with its corners cut off at `corner` units along each edge.
    /// Edges sit one unit inside the domain so they stay on screen.
    pub fn octagon(width: f32, height: f32, corner: f32) -> Self {
        let d = corner;
        let (w, h) = (width, height);
        let points = [
            pt2(d, 1.0),
            pt2(w - d, 1.0),
            pt2(w - 1.0, d),
            pt2(w - 1.0, h - d),
            pt2(w - d, h - 1.0),
            pt2(d, h - 1.0),
            pt2(1.0, h - d),
            pt2(1.0, d),
        ];
        let segments = (0..points.len())
            .map(|i| Wall::new(points[i], points[(i + 1) % points.len()]))
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[Wall] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Closest hit of the segment `from -> to` against all walls.
    pub fn closest_intersection(&self, from: Point2, to: Point2) -> Option<(Wall, Intersection)> {
        self.segments
            .iter()
            .filter_map(|wall| wall.intersect(from, to).map(|hit| (*wall, hit)))
            .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
    }

    /// Parity test: a horizontal ray from `point` towards +x crosses the
    /// boundary an odd number of times when the point is enclosed.
    pub fn contains(&self, point: Point2) -> bool {
        let mut crossings = 0;
        for wall in &self.segments {
            let (a, b) = (wall.start, wall.end);
            if (a.y > point.y) != (b.y > point.y) {
                let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if x > point.x {
                    crossings += 1;
                }
            }
        }
        crossings % 2 == 1
    }
}
