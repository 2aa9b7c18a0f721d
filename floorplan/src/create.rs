//! Validated creation: the editor's "draw" operations.
//!
//! Each operation checks its input first and only then allocates an id, so
//! a rejected drawing never burns an id or leaves a partial entity behind.

#[cfg(test)]
#[path = "create_test.rs"]
mod create_test;

use tracing::debug;

use crate::consts::{
    CORRIDOR_WIDTH, COPY_SUFFIX, EDGE_SNAP_THRESHOLD, MARKER_SIZE, MIN_PATH_NODES, MIN_ROOM_RADIUS, MIN_ROOM_SIZE,
};
use crate::doc::Document;
use crate::entity::{
    Attachment, EndpointMarker, Entity, EntityId, EntityKind, Hallway, MarkerKind, Node, Room, RoomMarker, Shape,
    StandaloneLabel, StandaloneMarker, Wall,
};
use crate::geometry::Point;

/// Why a create operation was refused. Nothing is added when one is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationWarning {
    #[error("room {width}x{height} is smaller than the minimum {min}x{min}")]
    RoomTooSmall { width: f64, height: f64, min: f64 },
    #[error("circle radius {radius} is smaller than the minimum {min}")]
    RadiusTooSmall { radius: f64, min: f64 },
    #[error("{kind} needs at least {min} nodes, got {count}")]
    TooFewNodes { kind: EntityKind, count: usize, min: usize },
    #[error("room {0} not found")]
    RoomNotFound(EntityId),
}

impl Document {
    /// Draw a rectangle room between two opposite corners.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationWarning::RoomTooSmall`] if either side is shorter
    /// than [`MIN_ROOM_SIZE`].
    pub fn create_room(&mut self, from: Point, to: Point) -> Result<EntityId, ValidationWarning> {
        let width = (to.x - from.x).abs();
        let height = (to.y - from.y).abs();
        if width < MIN_ROOM_SIZE || height < MIN_ROOM_SIZE {
            return Err(ValidationWarning::RoomTooSmall { width, height, min: MIN_ROOM_SIZE });
        }

        let id = self.allocate_id();
        let room = Room::new(id, Shape::Rectangle, from.x.min(to.x), from.y.min(to.y), width, height);
        self.add(Entity::Room(room));
        debug!(room_id = id, width, height, "room created");
        Ok(id)
    }

    /// Draw a circle room from its centre and a point on its rim.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationWarning::RadiusTooSmall`] if the radius is below
    /// [`MIN_ROOM_RADIUS`].
    pub fn create_circle_room(&mut self, center: Point, rim: Point) -> Result<EntityId, ValidationWarning> {
        let radius = center.distance_to(rim);
        if radius < MIN_ROOM_RADIUS {
            return Err(ValidationWarning::RadiusTooSmall { radius, min: MIN_ROOM_RADIUS });
        }

        let id = self.allocate_id();
        let diameter = radius * 2.0;
        let room = Room::new(id, Shape::Circle, center.x - radius, center.y - radius, diameter, diameter);
        self.add(Entity::Room(room));
        debug!(room_id = id, radius, "circle room created");
        Ok(id)
    }

    /// Create a corridor routed through `nodes`, with a door at each end.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationWarning::TooFewNodes`] for fewer than two nodes.
    pub fn create_hallway(&mut self, nodes: Vec<Node>) -> Result<EntityId, ValidationWarning> {
        check_node_count(EntityKind::Hallway, &nodes)?;

        let id = self.allocate_id();
        let mut hallway = Hallway::from_nodes(id, nodes, CORRIDOR_WIDTH);
        hallway.start_marker = Some(EndpointMarker::new(MarkerKind::Door));
        hallway.end_marker = Some(EndpointMarker::new(MarkerKind::Door));
        debug!(hallway_id = id, segments = hallway.segments.len(), "hallway created");
        self.add(Entity::Hallway(hallway));
        Ok(id)
    }

    /// Create a wall routed through `nodes`, owned by `parent_room_id` when given.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationWarning::TooFewNodes`] for fewer than two nodes and
    /// [`ValidationWarning::RoomNotFound`] if the parent room does not exist.
    pub fn create_wall(
        &mut self,
        nodes: Vec<Node>,
        parent_room_id: Option<EntityId>,
    ) -> Result<EntityId, ValidationWarning> {
        check_node_count(EntityKind::Wall, &nodes)?;
        if let Some(parent_id) = parent_room_id {
            if self.room(parent_id).is_none() {
                return Err(ValidationWarning::RoomNotFound(parent_id));
            }
        }

        let id = self.allocate_id();
        let wall = Wall::from_nodes(id, nodes, CORRIDOR_WIDTH, parent_room_id);
        debug!(wall_id = id, parent_room_id, "wall created");
        self.add(Entity::Wall(wall));
        Ok(id)
    }

    pub fn create_standalone_marker(&mut self, kind: MarkerKind, at: Point) -> EntityId {
        let id = self.allocate_id();
        self.add(Entity::StandaloneMarker(StandaloneMarker::new(id, kind, at.x, at.y)));
        id
    }

    pub fn create_standalone_label(&mut self, text: impl Into<String>, at: Point) -> EntityId {
        let id = self.allocate_id();
        self.add(Entity::StandaloneLabel(StandaloneLabel::new(id, text, at.x, at.y)));
        id
    }

    /// Build a path node at `point`, snapped and attached to the nearest
    /// room edge within `threshold` if there is one.
    #[must_use]
    pub fn attach_node(&self, point: Point, threshold: f64) -> Node {
        match self.edge_at(point, threshold) {
            Some(pick) => Node::attached(
                pick.hit.point,
                Attachment {
                    room_id: pick.room_id,
                    edge: pick.hit.edge,
                    relative_position: pick.hit.relative_position,
                },
            ),
            None => Node::new(point),
        }
    }

    /// [`Document::attach_node`] with the default snap distance.
    #[must_use]
    pub fn snap_node(&self, point: Point) -> Node {
        self.attach_node(point, EDGE_SNAP_THRESHOLD)
    }

    /// Paste a copy of a room centred on `center`.
    ///
    /// The copy keeps shape, size and markers. Its label gets a copy suffix.
    /// Labels and owned walls stay with the original.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationWarning::RoomNotFound`] if `id` does not exist.
    pub fn duplicate_room(&mut self, id: EntityId, center: Point) -> Result<EntityId, ValidationWarning> {
        let source = self.room(id).ok_or(ValidationWarning::RoomNotFound(id))?;
        let (shape, width, height) = (source.shape, source.width, source.height);
        let label = if source.label.is_empty() { String::new() } else { format!("{}{COPY_SUFFIX}", source.label) };
        let markers = source.markers.clone();
        let floor = source.floor;

        let new_id = self.allocate_id();
        let mut room = Room::new(new_id, shape, center.x - width / 2.0, center.y - height / 2.0, width, height);
        room.label = label;
        room.markers = markers;
        room.floor = floor;
        self.add(Entity::Room(room));
        debug!(source_id = id, room_id = new_id, "room duplicated");
        Ok(new_id)
    }

    /// Place a marker inside a room at absolute point `at`, clamped so the
    /// marker glyph stays within the room. Returns the marker's index.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationWarning::RoomNotFound`] if `room_id` does not exist.
    pub fn add_room_marker(
        &mut self,
        room_id: EntityId,
        kind: MarkerKind,
        at: Point,
    ) -> Result<usize, ValidationWarning> {
        let room = self.room_mut(room_id).ok_or(ValidationWarning::RoomNotFound(room_id))?;
        let x = clamp_inside(at.x - room.x, room.width);
        let y = clamp_inside(at.y - room.y, room.height);
        room.markers.push(RoomMarker::new(kind, x, y));
        Ok(room.markers.len() - 1)
    }
}

fn check_node_count(kind: EntityKind, nodes: &[Node]) -> Result<(), ValidationWarning> {
    if nodes.len() < MIN_PATH_NODES {
        return Err(ValidationWarning::TooFewNodes { kind, count: nodes.len(), min: MIN_PATH_NODES });
    }
    Ok(())
}

/// `max(0, min(span - MARKER_SIZE, offset))`.
fn clamp_inside(offset: f64, span: f64) -> f64 {
    offset.min(span - MARKER_SIZE).max(0.0)
}
