#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{EDGE_SNAP_THRESHOLD, MARKER_HIT_RADIUS};
use crate::doc::Document;
use crate::entity::{EntityId, Hallway, Room};
use crate::geometry::{self, EdgeHit, Point};

/// What a point landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    /// A marker inside a room, by index into [`Room::markers`].
    RoomMarker { room_id: EntityId, index: usize },
    Room(EntityId),
    Hallway(EntityId),
}

/// A corridor under a point, with the closest point on its centreline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HallwayPick {
    pub hallway_id: EntityId,
    pub point: Point,
}

/// A room edge near a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePick {
    pub room_id: EntityId,
    pub hit: EdgeHit,
}

impl Document {
    /// Pick whatever is under `point`: room markers first, then rooms, then
    /// corridors (within half their width of a segment).
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<Hit> {
        if let Some((room_id, index)) = self.marker_at(point) {
            return Some(Hit::RoomMarker { room_id, index });
        }
        if let Some(room) = self.room_at(point) {
            return Some(Hit::Room(room.id));
        }
        self.hallways
            .iter()
            .find(|h| near_hallway(h, point, h.width / 2.0))
            .map(|h| Hit::Hallway(h.id))
    }

    /// First room containing `point`. Circle rooms use their disc, not the
    /// bounding box.
    #[must_use]
    pub fn room_at(&self, point: Point) -> Option<&Room> {
        self.rooms.iter().find(|room| room.frame().contains(point))
    }

    /// First room marker within [`MARKER_HIT_RADIUS`] of `point`, as
    /// `(room_id, marker_index)`.
    #[must_use]
    pub fn marker_at(&self, point: Point) -> Option<(EntityId, usize)> {
        self.rooms.iter().find_map(|room| {
            room.markers
                .iter()
                .position(|m| point.distance_to(Point::new(room.x + m.x, room.y + m.y)) <= MARKER_HIT_RADIUS)
                .map(|index| (room.id, index))
        })
    }

    /// First corridor with a segment within the snap distance of `point`.
    /// Used to branch a new corridor off an existing one.
    #[must_use]
    pub fn hallway_at(&self, point: Point) -> Option<HallwayPick> {
        self.hallways.iter().find_map(|hallway| {
            hallway
                .segments
                .iter()
                .find(|s| geometry::distance_to_segment(point, s) <= EDGE_SNAP_THRESHOLD)
                .map(|s| HallwayPick { hallway_id: hallway.id, point: geometry::closest_point_on_segment(point, s) })
        })
    }

    /// First room with an edge within `threshold` of `point`.
    #[must_use]
    pub fn edge_at(&self, point: Point, threshold: f64) -> Option<EdgePick> {
        self.rooms.iter().find_map(|room| {
            geometry::project_edge(&room.frame(), point, threshold).map(|hit| EdgePick { room_id: room.id, hit })
        })
    }
}

fn near_hallway(hallway: &Hallway, point: Point, threshold: f64) -> bool {
    hallway.segments.iter().any(|s| geometry::distance_to_segment(point, s) <= threshold)
}
