//! Geometry engine: edge projection, attachment reconstruction, and
//! orthogonal routing.
//!
//! Everything here is a pure function over plain values. Degenerate inputs
//! (zero or negative room sizes, zero-length segments) are clamped to a valid
//! answer instead of being rejected, so recomputing geometry in the middle of
//! an edit can never fail.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::consts::COMPASS_STEP_DEG;
use crate::entity::{Attachment, Node, Shape, null_as_default};

/// A point in plan coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// One straight piece of a corridor or wall.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Segment {
    #[serde(deserialize_with = "null_as_default")]
    pub x1: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub y1: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub x2: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub y2: f64,
}

impl Segment {
    #[must_use]
    pub fn new(from: Point, to: Point) -> Self {
        Self { x1: from.x, y1: from.y, x2: to.x, y2: to.y }
    }

    #[must_use]
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    #[must_use]
    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.start().distance_to(self.end())
    }

    /// Returns `true` if the segment is horizontal or vertical.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_axis_aligned(&self) -> bool {
        self.x1 == self.x2 || self.y1 == self.y2
    }

    /// Copy of this segment shifted by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self { x1: self.x1 + dx, y1: self.y1 + dy, x2: self.x2 + dx, y2: self.y2 + dy }
    }
}

/// A side of a rectangle room or one of the eight compass points of a circle room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl Edge {
    /// The four sides of a rectangle, in tie-break order.
    pub const SIDES: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

    /// The eight compass points of a circle, in tie-break order.
    pub const COMPASS: [Edge; 8] = [
        Edge::East,
        Edge::Southeast,
        Edge::South,
        Edge::Southwest,
        Edge::West,
        Edge::Northwest,
        Edge::North,
        Edge::Northeast,
    ];

    /// Returns `true` for rectangle sides, `false` for compass points.
    #[must_use]
    pub fn is_side(self) -> bool {
        matches!(self, Edge::Left | Edge::Right | Edge::Top | Edge::Bottom)
    }

    /// Direction of a compass point in degrees, measured like `atan2` in
    /// screen space (y grows downward, so south is +90).
    #[must_use]
    pub fn compass_degrees(self) -> Option<f64> {
        let steps = match self {
            Edge::East => 0.0,
            Edge::Southeast => 1.0,
            Edge::South => 2.0,
            Edge::Southwest => 3.0,
            Edge::West => 4.0,
            Edge::Northwest => -3.0,
            Edge::North => -2.0,
            Edge::Northeast => -1.0,
            Edge::Left | Edge::Right | Edge::Top | Edge::Bottom => return None,
        };
        Some(steps * COMPASS_STEP_DEG)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Top => "top",
            Edge::Bottom => "bottom",
            Edge::North => "north",
            Edge::Northeast => "northeast",
            Edge::East => "east",
            Edge::Southeast => "southeast",
            Edge::South => "south",
            Edge::Southwest => "southwest",
            Edge::West => "west",
            Edge::Northwest => "northwest",
        }
    }
}

/// The outline of a room: just enough to project onto and rebuild from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomFrame {
    pub shape: Shape,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RoomFrame {
    /// Circle radius derived from the bounding box; never negative.
    #[must_use]
    pub fn radius(&self) -> f64 {
        (self.width.min(self.height) / 2.0).max(0.0)
    }

    /// Centre of the room. Circles are centred on their radius from the
    /// top-left corner, so a non-square bounding box keeps the circle in its
    /// top-left square.
    #[must_use]
    pub fn center(&self) -> Point {
        match self.shape {
            Shape::Circle => {
                let r = self.radius();
                Point::new(self.x + r, self.y + r)
            }
            Shape::Rectangle => Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0),
        }
    }

    /// Returns `true` if `point` lies inside the room (boundary included).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        match self.shape {
            Shape::Circle => point.distance_to(self.center()) <= self.radius(),
            Shape::Rectangle => {
                point.x >= self.x
                    && point.x <= self.x + self.width
                    && point.y >= self.y
                    && point.y <= self.y + self.height
            }
        }
    }
}

/// Where a point landed on a room edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeHit {
    pub edge: Edge,
    /// Position along the edge in `[0, 1]`. Always `0.5` for compass points.
    pub relative_position: f64,
    /// The point on the edge the hit snaps to.
    pub point: Point,
}

/// Project `point` onto the nearest edge of `frame` within `threshold`.
///
/// Rectangles consider the four sides; a side only qualifies when the
/// point's other coordinate falls within the side's span. Circles snap to
/// the nearest of eight compass points when the point is within `threshold`
/// of the rim.
#[must_use]
pub fn project_edge(frame: &RoomFrame, point: Point, threshold: f64) -> Option<EdgeHit> {
    match frame.shape {
        Shape::Rectangle => project_side(frame, point, threshold),
        Shape::Circle => project_compass(frame, point, threshold),
    }
}

fn project_side(frame: &RoomFrame, point: Point, threshold: f64) -> Option<EdgeHit> {
    let left = frame.x;
    let right = frame.x + frame.width.max(0.0);
    let top = frame.y;
    let bottom = frame.y + frame.height.max(0.0);

    let within_y = point.y >= top && point.y <= bottom;
    let within_x = point.x >= left && point.x <= right;

    let candidates = [
        (Edge::Left, (point.x - left).abs(), within_y),
        (Edge::Right, (point.x - right).abs(), within_y),
        (Edge::Top, (point.y - top).abs(), within_x),
        (Edge::Bottom, (point.y - bottom).abs(), within_x),
    ];

    let mut best: Option<(Edge, f64)> = None;
    for (edge, distance, within) in candidates {
        if !within || distance > threshold {
            continue;
        }
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((edge, distance));
        }
    }

    let (edge, _) = best?;
    let relative_position = match edge {
        Edge::Left | Edge::Right => fraction(point.y - frame.y, frame.height),
        _ => fraction(point.x - frame.x, frame.width),
    };
    Some(EdgeHit { edge, relative_position, point: side_point(frame, edge, relative_position) })
}

fn project_compass(frame: &RoomFrame, point: Point, threshold: f64) -> Option<EdgeHit> {
    let center = frame.center();
    let radius = frame.radius();
    let dx = point.x - center.x;
    let dy = point.y - center.y;

    if (dx.hypot(dy) - radius).abs() > threshold {
        return None;
    }

    let edge = nearest_compass(dy.atan2(dx).to_degrees());
    Some(EdgeHit { edge, relative_position: 0.5, point: compass_point(center, radius, edge) })
}

/// Pick the compass point whose direction is closest to `degrees`.
fn nearest_compass(degrees: f64) -> Edge {
    let mut best = Edge::East;
    let mut best_diff = f64::INFINITY;
    for edge in Edge::COMPASS {
        let Some(angle) = edge.compass_degrees() else {
            continue;
        };
        let mut diff = (degrees - angle).abs();
        if diff > 180.0 {
            diff = 360.0 - diff;
        }
        if diff < best_diff {
            best_diff = diff;
            best = edge;
        }
    }
    best
}

fn compass_point(center: Point, radius: f64, edge: Edge) -> Point {
    let radians = edge.compass_degrees().unwrap_or_default().to_radians();
    Point::new(center.x + radius * radians.cos(), center.y + radius * radians.sin())
}

/// Point at fraction `t` along a rectangle side.
fn side_point(frame: &RoomFrame, edge: Edge, t: f64) -> Point {
    let width = frame.width.max(0.0);
    let height = frame.height.max(0.0);
    match edge {
        Edge::Left => Point::new(frame.x, frame.y + height * t),
        Edge::Right => Point::new(frame.x + width, frame.y + height * t),
        Edge::Top => Point::new(frame.x + width * t, frame.y),
        _ => Point::new(frame.x + width * t, frame.y + height),
    }
}

/// `offset / span` clamped to `[0, 1]`; zero-length spans map to 0.
fn fraction(offset: f64, span: f64) -> f64 {
    if span > 0.0 { (offset / span).clamp(0.0, 1.0) } else { 0.0 }
}

/// Rebuild the absolute position of an attached node from the room's
/// current outline.
///
/// Rectangle sides slide with the stored relative position. Compass points
/// are recomputed from the current centre and radius and ignore the
/// relative position.
#[must_use]
pub fn reanchor(attachment: &Attachment, frame: &RoomFrame) -> Point {
    if attachment.edge.is_side() {
        let t = attachment.relative_position.clamp(0.0, 1.0);
        side_point(frame, attachment.edge, t)
    } else {
        compass_point(frame.center(), frame.radius(), attachment.edge)
    }
}

/// Connect two points with axis-aligned segments.
///
/// Aligned points produce one segment. Otherwise the path runs horizontally
/// from `a` to `(b.x, a.y)` and then vertically to `b`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn route(a: Point, b: Point) -> Vec<Segment> {
    if a.x == b.x || a.y == b.y {
        return vec![Segment::new(a, b)];
    }
    let corner = Point::new(b.x, a.y);
    vec![Segment::new(a, corner), Segment::new(corner, b)]
}

/// Route every consecutive pair of nodes and concatenate the result.
#[must_use]
pub fn rebuild_segments(nodes: &[Node]) -> Vec<Segment> {
    nodes
        .windows(2)
        .flat_map(|pair| route(pair[0].point(), pair[1].point()))
        .collect()
}

/// Closest point to `point` on `segment` (endpoints included).
#[must_use]
pub fn closest_point_on_segment(point: Point, segment: &Segment) -> Point {
    let dx = segment.x2 - segment.x1;
    let dy = segment.y2 - segment.y1;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= 0.0 {
        return segment.start();
    }

    let t = ((point.x - segment.x1) * dx + (point.y - segment.y1) * dy) / len_sq;
    if t <= 0.0 {
        segment.start()
    } else if t >= 1.0 {
        segment.end()
    } else {
        Point::new(segment.x1 + t * dx, segment.y1 + t * dy)
    }
}

/// Shortest distance from `point` to `segment`.
#[must_use]
pub fn distance_to_segment(point: Point, segment: &Segment) -> f64 {
    point.distance_to(closest_point_on_segment(point, segment))
}
