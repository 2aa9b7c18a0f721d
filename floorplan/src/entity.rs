//! Entity types: rooms, corridors, walls, markers, and labels.
//!
//! Each kind has exactly one in-memory shape, built through its `new`
//! constructor whether it comes from an edit or from a decoder. Serde
//! derives describe the expanded (field-named) JSON form; every field has a
//! default so partial or older documents still load.

#[cfg(test)]
#[path = "entity_test.rs"]
mod entity_test;

use std::fmt;

use serde::de::{self, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::consts::{CORRIDOR_WIDTH, DEFAULT_FLOOR, MAX_SAFE_ID};
use crate::geometry::{self, Edge, Point, RoomFrame, Segment};

/// Integer identifier, unique within one collection.
pub type EntityId = u64;

/// Outline of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Shape {
    #[default]
    Rectangle,
    Circle,
}

impl Shape {
    /// Parse a shape name. Anything unrecognised is a rectangle.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if name == "circle" { Shape::Circle } else { Shape::Rectangle }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Rectangle => "rectangle",
            Shape::Circle => "circle",
        }
    }
}

impl From<String> for Shape {
    fn from(name: String) -> Self {
        Shape::parse(&name)
    }
}

impl From<Shape> for String {
    fn from(shape: Shape) -> Self {
        shape.as_str().to_owned()
    }
}

/// Kind of a point marker. Unknown names are kept verbatim so they survive
/// a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarkerKind {
    Terminal,
    Hazard,
    Loot,
    Npc,
    Door,
    Ladder,
    Window,
    Airlock,
    Elevator,
    Grate,
    #[default]
    Custom,
    Other(String),
}

impl MarkerKind {
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "terminal" => MarkerKind::Terminal,
            "hazard" => MarkerKind::Hazard,
            "loot" => MarkerKind::Loot,
            "npc" => MarkerKind::Npc,
            "door" => MarkerKind::Door,
            "ladder" => MarkerKind::Ladder,
            "window" => MarkerKind::Window,
            "airlock" => MarkerKind::Airlock,
            "elevator" => MarkerKind::Elevator,
            "grate" => MarkerKind::Grate,
            "custom" => MarkerKind::Custom,
            other => MarkerKind::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            MarkerKind::Terminal => "terminal",
            MarkerKind::Hazard => "hazard",
            MarkerKind::Loot => "loot",
            MarkerKind::Npc => "npc",
            MarkerKind::Door => "door",
            MarkerKind::Ladder => "ladder",
            MarkerKind::Window => "window",
            MarkerKind::Airlock => "airlock",
            MarkerKind::Elevator => "elevator",
            MarkerKind::Grate => "grate",
            MarkerKind::Custom => "custom",
            MarkerKind::Other(name) => name,
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for MarkerKind {
    fn from(name: String) -> Self {
        MarkerKind::parse(&name)
    }
}

impl From<MarkerKind> for String {
    fn from(kind: MarkerKind) -> Self {
        match kind {
            MarkerKind::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

fn default_half() -> f64 {
    0.5
}

fn null_as_half<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_else(default_half))
}

/// Ids are written as integers, but older files sometimes carry integral
/// floats (`3.0`). Both are accepted up to [`MAX_SAFE_ID`].
fn integral_id<'de, D>(deserializer: D) -> Result<EntityId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(u64),
        Float(f64),
    }

    let id = match RawId::deserialize(deserializer)? {
        RawId::Int(n) => Some(n),
        RawId::Float(f) => float_id(f),
    };
    id.filter(|n| *n <= MAX_SAFE_ID)
        .ok_or_else(|| de::Error::custom(format!("id must be an integer between 0 and {MAX_SAFE_ID}")))
}

#[allow(clippy::float_cmp, clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn float_id(f: f64) -> Option<EntityId> {
    (f >= 0.0 && f.fract() == 0.0 && f <= MAX_SAFE_ID as f64).then(|| f as EntityId)
}

fn lenient_attachment<'de, D>(deserializer: D) -> Result<Option<Attachment>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeAttachment {
        Valid(Attachment),
        Invalid(IgnoredAny),
    }

    match Option::<MaybeAttachment>::deserialize(deserializer)? {
        Some(MaybeAttachment::Valid(attachment)) => Ok(Some(attachment)),
        Some(MaybeAttachment::Invalid(IgnoredAny)) => {
            warn!("unreadable node attachment dropped");
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// ROOMS
// =============================================================================

/// A marker placed inside a room (position relative to the room's top-left)
/// or along a corridor (absolute position).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomMarker {
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    #[serde(deserialize_with = "null_as_default")]
    pub x: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub y: f64,
    pub visible: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub rotation: f64,
}

impl RoomMarker {
    #[must_use]
    pub fn new(kind: MarkerKind, x: f64, y: f64) -> Self {
        Self { kind, x, y, visible: true, label: String::new(), rotation: 0.0 }
    }
}

impl Default for RoomMarker {
    fn default() -> Self {
        Self::new(MarkerKind::default(), 0.0, 0.0)
    }
}

/// Free text inside a room, positioned relative to the room's top-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomLabel {
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub x: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub y: f64,
    pub visible: bool,
}

impl RoomLabel {
    #[must_use]
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self { text: text.into(), x, y, visible: true }
    }
}

impl Default for RoomLabel {
    fn default() -> Self {
        Self::new("", 0.0, 0.0)
    }
}

/// A rectangle or circle room.
///
/// A circle's radius is always `min(width, height) / 2`; it is derived on
/// demand and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Room {
    #[serde(deserialize_with = "integral_id")]
    pub id: EntityId,
    pub shape: Shape,
    /// Left edge of the bounding box.
    #[serde(deserialize_with = "null_as_default")]
    pub x: f64,
    /// Top edge of the bounding box.
    #[serde(deserialize_with = "null_as_default")]
    pub y: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub width: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub height: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    pub label_visible: bool,
    pub visible: bool,
    /// Fill colour override; renderers use their theme colour when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub markers: Vec<RoomMarker>,
    #[serde(deserialize_with = "null_as_default")]
    pub labels: Vec<RoomLabel>,
    /// Walls owned by this room, in absolute coordinates.
    #[serde(deserialize_with = "null_as_default")]
    pub walls: Vec<Wall>,
    pub floor: i64,
}

impl Room {
    #[must_use]
    pub fn new(id: EntityId, shape: Shape, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id,
            shape,
            x,
            y,
            width,
            height,
            label: String::new(),
            label_visible: true,
            visible: true,
            color: None,
            markers: Vec::new(),
            labels: Vec::new(),
            walls: Vec::new(),
            floor: DEFAULT_FLOOR,
        }
    }

    /// Radius of a circle room; `None` for rectangles.
    #[must_use]
    pub fn radius(&self) -> Option<f64> {
        match self.shape {
            Shape::Circle => Some(self.frame().radius()),
            Shape::Rectangle => None,
        }
    }

    #[must_use]
    pub fn frame(&self) -> RoomFrame {
        RoomFrame { shape: self.shape, x: self.x, y: self.y, width: self.width, height: self.height }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.frame().center()
    }
}

impl Default for Room {
    fn default() -> Self {
        Self::new(0, Shape::Rectangle, 0.0, 0.0, 0.0, 0.0)
    }
}

// =============================================================================
// CORRIDORS AND WALLS
// =============================================================================

/// Weak link from a node to a room edge. `room_id` is resolved by lookup
/// and may name a room that no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(deserialize_with = "integral_id")]
    pub room_id: EntityId,
    pub edge: Edge,
    #[serde(default = "default_half", deserialize_with = "null_as_half")]
    pub relative_position: f64,
}

/// An ordered waypoint of a corridor or wall.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default, deserialize_with = "null_as_default")]
    pub x: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub y: f64,
    /// An attachment that cannot be read (unknown edge, bad room id) leaves
    /// the node free rather than failing the whole document.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_attachment")]
    pub attached_room: Option<Attachment>,
}

impl Node {
    #[must_use]
    pub fn new(point: Point) -> Self {
        Self { x: point.x, y: point.y, attached_room: None }
    }

    #[must_use]
    pub fn attached(point: Point, attachment: Attachment) -> Self {
        Self { x: point.x, y: point.y, attached_room: Some(attachment) }
    }

    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Marker drawn at the first or last node of a corridor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointMarker {
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    pub visible: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub rotation: f64,
}

impl EndpointMarker {
    #[must_use]
    pub fn new(kind: MarkerKind) -> Self {
        Self { kind, visible: true, rotation: 0.0 }
    }
}

impl Default for EndpointMarker {
    fn default() -> Self {
        Self::new(MarkerKind::Door)
    }
}

/// A corridor between rooms. `is_secret` only changes how it is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Hallway {
    #[serde(deserialize_with = "integral_id")]
    pub id: EntityId,
    #[serde(deserialize_with = "null_as_default")]
    pub segments: Vec<Segment>,
    #[serde(deserialize_with = "null_as_default")]
    pub width: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    pub is_secret: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub nodes: Vec<Node>,
    pub start_marker: Option<EndpointMarker>,
    pub end_marker: Option<EndpointMarker>,
    #[serde(deserialize_with = "null_as_default")]
    pub markers: Vec<RoomMarker>,
    pub visible: bool,
    pub floor: i64,
}

impl Hallway {
    #[must_use]
    pub fn new(id: EntityId, segments: Vec<Segment>, width: f64) -> Self {
        Self {
            id,
            segments,
            width,
            label: String::new(),
            is_secret: false,
            nodes: Vec::new(),
            start_marker: None,
            end_marker: None,
            markers: Vec::new(),
            visible: true,
            floor: DEFAULT_FLOOR,
        }
    }

    /// Corridor whose segments are routed through `nodes`.
    #[must_use]
    pub fn from_nodes(id: EntityId, nodes: Vec<Node>, width: f64) -> Self {
        let mut hallway = Self::new(id, geometry::rebuild_segments(&nodes), width);
        hallway.nodes = nodes;
        hallway
    }

    /// Toggle the secret flag. Every endpoint marker follows it: secret
    /// corridors end in grates, ordinary ones in doors.
    pub fn set_secret(&mut self, is_secret: bool) {
        self.is_secret = is_secret;
        let kind = if is_secret { MarkerKind::Grate } else { MarkerKind::Door };
        for marker in [&mut self.start_marker, &mut self.end_marker].into_iter().flatten() {
            marker.kind = kind.clone();
        }
    }
}

impl Default for Hallway {
    fn default() -> Self {
        Self::new(0, Vec::new(), CORRIDOR_WIDTH)
    }
}

/// A wall, either standalone (`parent_room_id` is `None`) or owned by a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Wall {
    #[serde(deserialize_with = "integral_id")]
    pub id: EntityId,
    #[serde(deserialize_with = "null_as_default")]
    pub segments: Vec<Segment>,
    #[serde(deserialize_with = "null_as_default")]
    pub width: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub nodes: Vec<Node>,
    pub visible: bool,
    pub is_dotted: bool,
    pub parent_room_id: Option<EntityId>,
    pub floor: i64,
}

impl Wall {
    #[must_use]
    pub fn new(id: EntityId, segments: Vec<Segment>, width: f64, parent_room_id: Option<EntityId>) -> Self {
        Self {
            id,
            segments,
            width,
            label: String::new(),
            nodes: Vec::new(),
            visible: true,
            is_dotted: false,
            parent_room_id,
            floor: DEFAULT_FLOOR,
        }
    }

    #[must_use]
    pub fn from_nodes(id: EntityId, nodes: Vec<Node>, width: f64, parent_room_id: Option<EntityId>) -> Self {
        let mut wall = Self::new(id, geometry::rebuild_segments(&nodes), width, parent_room_id);
        wall.nodes = nodes;
        wall
    }

    /// Shift every segment and node by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for segment in &mut self.segments {
            *segment = segment.translated(dx, dy);
        }
        for node in &mut self.nodes {
            node.x += dx;
            node.y += dy;
        }
    }
}

impl Default for Wall {
    fn default() -> Self {
        Self::new(0, Vec::new(), CORRIDOR_WIDTH, None)
    }
}

// =============================================================================
// STANDALONE MARKERS AND LABELS
// =============================================================================

/// A marker placed anywhere on the map, in absolute coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandaloneMarker {
    #[serde(deserialize_with = "integral_id")]
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    #[serde(deserialize_with = "null_as_default")]
    pub x: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub y: f64,
    pub visible: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub rotation: f64,
    pub floor: i64,
}

impl StandaloneMarker {
    #[must_use]
    pub fn new(id: EntityId, kind: MarkerKind, x: f64, y: f64) -> Self {
        Self { id, kind, x, y, visible: true, label: String::new(), rotation: 0.0, floor: DEFAULT_FLOOR }
    }
}

impl Default for StandaloneMarker {
    fn default() -> Self {
        Self::new(0, MarkerKind::default(), 0.0, 0.0)
    }
}

/// Free text placed anywhere on the map, in absolute coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandaloneLabel {
    #[serde(deserialize_with = "integral_id")]
    pub id: EntityId,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub x: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub y: f64,
    pub visible: bool,
    pub floor: i64,
}

impl StandaloneLabel {
    #[must_use]
    pub fn new(id: EntityId, text: impl Into<String>, x: f64, y: f64) -> Self {
        Self { id, text: text.into(), x, y, visible: true, floor: DEFAULT_FLOOR }
    }
}

impl Default for StandaloneLabel {
    fn default() -> Self {
        Self::new(0, "", 0.0, 0.0)
    }
}

// =============================================================================
// TAGGED UNIONS
// =============================================================================

/// Names one of the five entity collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Room,
    Hallway,
    Wall,
    StandaloneMarker,
    StandaloneLabel,
}

impl EntityKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Room => "room",
            EntityKind::Hallway => "hallway",
            EntityKind::Wall => "wall",
            EntityKind::StandaloneMarker => "standaloneMarker",
            EntityKind::StandaloneLabel => "standaloneLabel",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An owned entity of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Room(Room),
    Hallway(Hallway),
    Wall(Wall),
    StandaloneMarker(StandaloneMarker),
    StandaloneLabel(StandaloneLabel),
}

impl Entity {
    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Room(e) => e.id,
            Entity::Hallway(e) => e.id,
            Entity::Wall(e) => e.id,
            Entity::StandaloneMarker(e) => e.id,
            Entity::StandaloneLabel(e) => e.id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Room(_) => EntityKind::Room,
            Entity::Hallway(_) => EntityKind::Hallway,
            Entity::Wall(_) => EntityKind::Wall,
            Entity::StandaloneMarker(_) => EntityKind::StandaloneMarker,
            Entity::StandaloneLabel(_) => EntityKind::StandaloneLabel,
        }
    }
}

/// A borrowed entity of any kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityRef<'a> {
    Room(&'a Room),
    Hallway(&'a Hallway),
    Wall(&'a Wall),
    StandaloneMarker(&'a StandaloneMarker),
    StandaloneLabel(&'a StandaloneLabel),
}

impl EntityRef<'_> {
    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            EntityRef::Room(e) => e.id,
            EntityRef::Hallway(e) => e.id,
            EntityRef::Wall(e) => e.id,
            EntityRef::StandaloneMarker(e) => e.id,
            EntityRef::StandaloneLabel(e) => e.id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Room(_) => EntityKind::Room,
            EntityRef::Hallway(_) => EntityKind::Hallway,
            EntityRef::Wall(_) => EntityKind::Wall,
            EntityRef::StandaloneMarker(_) => EntityKind::StandaloneMarker,
            EntityRef::StandaloneLabel(_) => EntityKind::StandaloneLabel,
        }
    }
}
