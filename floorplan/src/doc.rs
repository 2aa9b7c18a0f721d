//! Document model: the entity collections, id allocation, and the rules
//! that keep attached corridors and walls glued to their rooms.
//!
//! A [`Document`] owns five collections. Rooms own their markers, labels
//! and walls; corridors and walls only *refer* to rooms through node
//! attachments, resolved by id on demand. Removing a room therefore never
//! touches an attached corridor: its attachment simply stops resolving.
//!
//! Geometry is recomputed eagerly: moving or resizing a room reanchors
//! every node attached to it and reroutes the owning corridor or wall
//! before the call returns.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use tracing::{debug, warn};

use crate::consts::{DEFAULT_MAP_NAME, DEFAULT_VERSION};
use crate::entity::{
    Entity, EntityId, EntityKind, EntityRef, Hallway, Node, Room, StandaloneLabel, StandaloneMarker, Wall,
};
use crate::geometry::{self, RoomFrame, Segment};

/// A node attachment found while scanning corridors and walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentSite {
    /// `Hallway` or `Wall`.
    pub kind: EntityKind,
    pub entity_id: EntityId,
    pub node_index: usize,
    /// The room the node names; may no longer exist.
    pub room_id: EntityId,
}

/// A floorplan and everything on it.
#[derive(Debug, Clone)]
pub struct Document {
    pub version: String,
    pub map_name: String,
    pub rooms: Vec<Room>,
    pub hallways: Vec<Hallway>,
    /// Standalone walls only; room-owned walls live in [`Room::walls`].
    pub walls: Vec<Wall>,
    pub standalone_markers: Vec<StandaloneMarker>,
    pub standalone_labels: Vec<StandaloneLabel>,
    next_id: EntityId,
}

impl PartialEq for Document {
    /// Structural equality over the content; the id allocator is not compared.
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.map_name == other.map_name
            && self.rooms == other.rooms
            && self.hallways == other.hallways
            && self.walls == other.walls
            && self.standalone_markers == other.standalone_markers
            && self.standalone_labels == other.standalone_labels
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: DEFAULT_VERSION.to_owned(),
            map_name: DEFAULT_MAP_NAME.to_owned(),
            rooms: Vec::new(),
            hallways: Vec::new(),
            walls: Vec::new(),
            standalone_markers: Vec::new(),
            standalone_labels: Vec::new(),
            next_id: 1,
        }
    }

    /// Create an empty document with a name.
    #[must_use]
    pub fn named(map_name: impl Into<String>) -> Self {
        Self { map_name: map_name.into(), ..Self::new() }
    }

    // =========================================================================
    // ID ALLOCATION
    // =========================================================================

    /// The id the next create operation will hand out.
    #[must_use]
    pub fn next_id(&self) -> EntityId {
        self.next_id
    }

    /// Hand out the next id and advance the counter. The counter saturates
    /// at `u64::MAX` instead of wrapping.
    pub fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Reset the allocator to one past the largest id in any collection,
    /// room-owned walls included. Call after every bulk load.
    pub fn recompute_id_counter(&mut self) {
        let max = self
            .rooms
            .iter()
            .flat_map(|room| std::iter::once(room.id).chain(room.walls.iter().map(|w| w.id)))
            .chain(self.hallways.iter().map(|h| h.id))
            .chain(self.walls.iter().map(|w| w.id))
            .chain(self.standalone_markers.iter().map(|m| m.id))
            .chain(self.standalone_labels.iter().map(|l| l.id))
            .max()
            .unwrap_or(0);
        self.next_id = max.saturating_add(1);
        debug!(next_id = self.next_id, "id counter recomputed");
    }

    /// Swap in a fully decoded document and recompute the allocator.
    ///
    /// Decoders build `incoming` off to the side; the live document is only
    /// touched once decoding has succeeded.
    pub fn replace(&mut self, incoming: Document) {
        *self = incoming;
        self.recompute_id_counter();
    }

    // =========================================================================
    // ADD / GET / REMOVE
    // =========================================================================

    /// Append an entity without allocating an id.
    ///
    /// A wall with a `parent_room_id` goes into that room's walls. If the
    /// room does not exist the wall is kept as a standalone wall instead.
    pub fn add(&mut self, entity: Entity) {
        match entity {
            Entity::Room(room) => self.rooms.push(room),
            Entity::Hallway(hallway) => self.hallways.push(hallway),
            Entity::Wall(mut wall) => {
                if let Some(parent_id) = wall.parent_room_id {
                    if let Some(room) = self.room_mut(parent_id) {
                        room.walls.push(wall);
                        return;
                    }
                    warn!(wall_id = wall.id, parent_id, "wall parent room not found; storing as standalone");
                    wall.parent_room_id = None;
                }
                self.walls.push(wall);
            }
            Entity::StandaloneMarker(marker) => self.standalone_markers.push(marker),
            Entity::StandaloneLabel(label) => self.standalone_labels.push(label),
        }
    }

    /// Look up an entity by kind and id. Walls are searched in the
    /// standalone collection first, then in every room.
    #[must_use]
    pub fn get(&self, kind: EntityKind, id: EntityId) -> Option<EntityRef<'_>> {
        match kind {
            EntityKind::Room => self.room(id).map(EntityRef::Room),
            EntityKind::Hallway => self.hallway(id).map(EntityRef::Hallway),
            EntityKind::Wall => self.wall(id).map(EntityRef::Wall),
            EntityKind::StandaloneMarker => self.standalone_marker(id).map(EntityRef::StandaloneMarker),
            EntityKind::StandaloneLabel => self.standalone_label(id).map(EntityRef::StandaloneLabel),
        }
    }

    #[must_use]
    pub fn room(&self, id: EntityId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn room_mut(&mut self, id: EntityId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.id == id)
    }

    #[must_use]
    pub fn hallway(&self, id: EntityId) -> Option<&Hallway> {
        self.hallways.iter().find(|h| h.id == id)
    }

    pub fn hallway_mut(&mut self, id: EntityId) -> Option<&mut Hallway> {
        self.hallways.iter_mut().find(|h| h.id == id)
    }

    #[must_use]
    pub fn wall(&self, id: EntityId) -> Option<&Wall> {
        self.walls
            .iter()
            .find(|w| w.id == id)
            .or_else(|| self.rooms.iter().flat_map(|r| r.walls.iter()).find(|w| w.id == id))
    }

    pub fn wall_mut(&mut self, id: EntityId) -> Option<&mut Wall> {
        if let Some(index) = self.walls.iter().position(|w| w.id == id) {
            return self.walls.get_mut(index);
        }
        self.rooms.iter_mut().flat_map(|r| r.walls.iter_mut()).find(|w| w.id == id)
    }

    #[must_use]
    pub fn standalone_marker(&self, id: EntityId) -> Option<&StandaloneMarker> {
        self.standalone_markers.iter().find(|m| m.id == id)
    }

    pub fn standalone_marker_mut(&mut self, id: EntityId) -> Option<&mut StandaloneMarker> {
        self.standalone_markers.iter_mut().find(|m| m.id == id)
    }

    #[must_use]
    pub fn standalone_label(&self, id: EntityId) -> Option<&StandaloneLabel> {
        self.standalone_labels.iter().find(|l| l.id == id)
    }

    pub fn standalone_label_mut(&mut self, id: EntityId) -> Option<&mut StandaloneLabel> {
        self.standalone_labels.iter_mut().find(|l| l.id == id)
    }

    /// Remove an entity by kind and id, returning it if it was present.
    ///
    /// Removing a room drops its markers, labels and owned walls with it.
    /// Corridors and walls attached to the room are left alone; their
    /// attachments become stale. Removing a wall searches the standalone
    /// collection and every room.
    pub fn remove(&mut self, kind: EntityKind, id: EntityId) -> Option<Entity> {
        match kind {
            EntityKind::Room => {
                let room = take_by_id(&mut self.rooms, id, |r| r.id)?;
                let stale = self.attached_to(id).len();
                debug!(
                    room_id = id,
                    markers = room.markers.len(),
                    labels = room.labels.len(),
                    walls = room.walls.len(),
                    stale_attachments = stale,
                    "room removed"
                );
                Some(Entity::Room(room))
            }
            EntityKind::Hallway => take_by_id(&mut self.hallways, id, |h| h.id).map(Entity::Hallway),
            EntityKind::Wall => {
                if let Some(wall) = take_by_id(&mut self.walls, id, |w| w.id) {
                    return Some(Entity::Wall(wall));
                }
                self.rooms
                    .iter_mut()
                    .find_map(|room| take_by_id(&mut room.walls, id, |w| w.id))
                    .map(Entity::Wall)
            }
            EntityKind::StandaloneMarker => {
                take_by_id(&mut self.standalone_markers, id, |m| m.id).map(Entity::StandaloneMarker)
            }
            EntityKind::StandaloneLabel => {
                take_by_id(&mut self.standalone_labels, id, |l| l.id).map(Entity::StandaloneLabel)
            }
        }
    }

    // =========================================================================
    // ATTACHMENTS
    // =========================================================================

    /// Every node attachment in corridors, standalone walls and room walls.
    #[must_use]
    pub fn attachment_sites(&self) -> Vec<AttachmentSite> {
        let hallways = self.hallways.iter().map(|h| (EntityKind::Hallway, h.id, h.nodes.as_slice()));
        let walls = self
            .walls
            .iter()
            .chain(self.rooms.iter().flat_map(|r| r.walls.iter()))
            .map(|w| (EntityKind::Wall, w.id, w.nodes.as_slice()));

        hallways
            .chain(walls)
            .flat_map(|(kind, entity_id, nodes)| {
                nodes.iter().enumerate().filter_map(move |(node_index, node)| {
                    node.attached_room.map(|a| AttachmentSite { kind, entity_id, node_index, room_id: a.room_id })
                })
            })
            .collect()
    }

    /// Attachments that name `room_id`.
    #[must_use]
    pub fn attached_to(&self, room_id: EntityId) -> Vec<AttachmentSite> {
        self.attachment_sites()
            .into_iter()
            .filter(|site| site.room_id == room_id)
            .collect()
    }

    /// Attachments whose room no longer exists. These are left in place:
    /// they are never reanchored and never guessed onto another room.
    #[must_use]
    pub fn stale_attachments(&self) -> Vec<AttachmentSite> {
        self.attachment_sites()
            .into_iter()
            .filter(|site| self.room(site.room_id).is_none())
            .collect()
    }

    /// Reanchor every node attached to `room_id` to the room's current
    /// outline and reroute the corridors and walls those nodes belong to.
    ///
    /// Returns the number of nodes reanchored. Calling it again without
    /// moving the room changes nothing.
    pub fn on_room_moved(&mut self, room_id: EntityId) -> usize {
        let Some(frame) = self.room(room_id).map(Room::frame) else {
            return 0;
        };

        let mut moved = 0;
        for hallway in &mut self.hallways {
            moved += reanchor_path(&mut hallway.nodes, &mut hallway.segments, room_id, &frame);
        }
        for wall in &mut self.walls {
            moved += reanchor_path(&mut wall.nodes, &mut wall.segments, room_id, &frame);
        }
        for room in &mut self.rooms {
            for wall in &mut room.walls {
                moved += reanchor_path(&mut wall.nodes, &mut wall.segments, room_id, &frame);
            }
        }

        debug!(room_id, nodes = moved, "attachments reanchored");
        moved
    }

    /// Move a room's top-left corner to `(x, y)`.
    ///
    /// Owned walls travel with the room; attached corridors and walls are
    /// reanchored. Returns `false` if the room does not exist.
    pub fn move_room(&mut self, id: EntityId, x: f64, y: f64) -> bool {
        let Some(room) = self.room_mut(id) else {
            return false;
        };
        let dx = x - room.x;
        let dy = y - room.y;
        room.x = x;
        room.y = y;
        for wall in &mut room.walls {
            wall.translate(dx, dy);
        }
        self.on_room_moved(id);
        true
    }

    /// Resize a room's bounding box and reanchor everything attached to it.
    /// Returns `false` if the room does not exist.
    pub fn resize_room(&mut self, id: EntityId, width: f64, height: f64) -> bool {
        let Some(room) = self.room_mut(id) else {
            return false;
        };
        room.width = width;
        room.height = height;
        self.on_room_moved(id);
        true
    }
}

/// Remove and return the first item whose id matches, keeping order.
fn take_by_id<T>(items: &mut Vec<T>, id: EntityId, id_of: impl Fn(&T) -> EntityId) -> Option<T> {
    let index = items.iter().position(|item| id_of(item) == id)?;
    Some(items.remove(index))
}

/// Reanchor the nodes of one corridor or wall that are attached to
/// `room_id`, rerouting its segments if any node moved.
fn reanchor_path(nodes: &mut [Node], segments: &mut Vec<Segment>, room_id: EntityId, frame: &RoomFrame) -> usize {
    let mut count = 0;
    for node in nodes.iter_mut() {
        let point = match &node.attached_room {
            Some(attachment) if attachment.room_id == room_id => geometry::reanchor(attachment, frame),
            _ => continue,
        };
        node.x = point.x;
        node.y = point.y;
        count += 1;
    }
    if count > 0 {
        *segments = geometry::rebuild_segments(nodes);
    }
    count
}
