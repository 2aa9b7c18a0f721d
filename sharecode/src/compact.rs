//! Compact codec: documents to and from positional-array JSON.
//!
//! The top level is a keyed object (`v`, `n`, `r`, `h`, `w`, `sm`, `sl`);
//! every entity inside it is a tuple following the layouts in
//! [`crate::layout`]. Encoding always writes the newest layout. Decoding
//! accepts any older, shorter tuple and fills in defaults.

#[cfg(test)]
#[path = "compact_test.rs"]
mod compact_test;

use floorplan::consts::{CORRIDOR_WIDTH, DEFAULT_FLOOR, DEFAULT_MAP_NAME, DEFAULT_VERSION};
use floorplan::doc::Document;
use floorplan::entity::{
    EndpointMarker, Entity, EntityId, Hallway, MarkerKind, Node, Room, RoomLabel, RoomMarker, Shape, StandaloneLabel,
    StandaloneMarker, Wall,
};
use floorplan::geometry::Segment;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value, json};
use tracing::debug;

use crate::error::{DecodeError, EncodeError};
use crate::layout::{FormatError, MAX_SAFE_INTEGER, ROOM_WALL_V2, Tuple, TupleKind};

/// The compact top-level object.
///
/// `corridors` and `secretPassages` are only read, and only when `h` is
/// absent; they are never written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompactDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sm: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sl: Option<Vec<Value>>,
    #[serde(default, skip_serializing)]
    pub corridors: Option<Vec<Value>>,
    #[serde(default, rename = "secretPassages", skip_serializing)]
    pub secret_passages: Option<Vec<Value>>,
}

// =============================================================================
// ENCODE
// =============================================================================

/// Encode a document in the newest layout.
#[must_use]
pub fn encode(doc: &Document) -> CompactDoc {
    CompactDoc {
        v: Some(doc.version.clone()),
        n: Some(doc.map_name.clone()),
        r: Some(doc.rooms.iter().map(encode_room).collect()),
        h: Some(doc.hallways.iter().map(encode_hallway).collect()),
        w: Some(doc.walls.iter().map(encode_wall).collect()),
        sm: Some(doc.standalone_markers.iter().map(encode_standalone_marker).collect()),
        sl: Some(doc.standalone_labels.iter().map(encode_standalone_label).collect()),
        corridors: None,
        secret_passages: None,
    }
}

/// Encode a document as compact JSON text.
///
/// # Errors
///
/// Returns [`EncodeError::Json`] if serialization fails.
pub fn to_json(doc: &Document) -> Result<String, EncodeError> {
    Ok(serde_json::to_string(&encode(doc))?)
}

/// A JSON number, written as an integer when the value is integral.
/// Non-finite values become `null`, which every number slot, segment
/// coordinate and node field decodes as its default.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub(crate) fn num(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

fn flag(b: bool) -> Value {
    Value::from(u8::from(b))
}

fn encode_room(room: &Room) -> Value {
    Value::Array(vec![
        Value::from(room.id),
        num(room.x),
        num(room.y),
        num(room.width),
        num(room.height),
        Value::from(room.label.as_str()),
        flag(room.visible),
        Value::Array(room.markers.iter().map(encode_marker).collect()),
        Value::from(room.shape.as_str()),
        Value::Array(room.walls.iter().map(encode_wall).collect()),
        Value::Array(room.labels.iter().map(encode_room_label).collect()),
        Value::from(room.floor),
        flag(room.label_visible),
        room.color.as_deref().map_or(Value::Null, Value::from),
    ])
}

fn encode_hallway(hallway: &Hallway) -> Value {
    Value::Array(vec![
        Value::from(hallway.id),
        encode_segments(&hallway.segments),
        num(hallway.width),
        Value::from(hallway.label.as_str()),
        flag(hallway.is_secret),
        flag(hallway.visible),
        encode_nodes(&hallway.nodes),
        hallway.start_marker.as_ref().map_or(Value::Null, encode_endpoint),
        hallway.end_marker.as_ref().map_or(Value::Null, encode_endpoint),
        Value::Array(hallway.markers.iter().map(encode_marker).collect()),
        Value::from(hallway.floor),
    ])
}

fn encode_wall(wall: &Wall) -> Value {
    Value::Array(vec![
        Value::from(wall.id),
        encode_segments(&wall.segments),
        num(wall.width),
        Value::from(wall.label.as_str()),
        encode_nodes(&wall.nodes),
        flag(wall.visible),
        flag(wall.is_dotted),
        Value::from(wall.floor),
    ])
}

fn encode_standalone_marker(marker: &StandaloneMarker) -> Value {
    Value::Array(vec![
        Value::from(marker.id),
        Value::from(marker.kind.as_str()),
        num(marker.x),
        num(marker.y),
        flag(marker.visible),
        Value::from(marker.label.as_str()),
        num(marker.rotation),
        Value::from(marker.floor),
    ])
}

fn encode_standalone_label(label: &StandaloneLabel) -> Value {
    Value::Array(vec![
        Value::from(label.id),
        Value::from(label.text.as_str()),
        num(label.x),
        num(label.y),
        flag(label.visible),
        Value::from(label.floor),
    ])
}

fn encode_marker(marker: &RoomMarker) -> Value {
    Value::Array(vec![
        Value::from(marker.kind.as_str()),
        num(marker.x),
        num(marker.y),
        flag(marker.visible),
        Value::from(marker.label.as_str()),
        num(marker.rotation),
    ])
}

fn encode_endpoint(marker: &EndpointMarker) -> Value {
    Value::Array(vec![Value::from(marker.kind.as_str()), flag(marker.visible), num(marker.rotation)])
}

fn encode_room_label(label: &RoomLabel) -> Value {
    Value::Array(vec![Value::from(label.text.as_str()), num(label.x), num(label.y), flag(label.visible)])
}

fn encode_segments(segments: &[Segment]) -> Value {
    segments
        .iter()
        .map(|s| Value::Array(vec![num(s.x1), num(s.y1), num(s.x2), num(s.y2)]))
        .collect()
}

/// Nodes stay keyed objects inside the compact form.
fn encode_nodes(nodes: &[Node]) -> Value {
    nodes
        .iter()
        .map(|node| {
            let mut map = Map::new();
            map.insert("x".into(), num(node.x));
            map.insert("y".into(), num(node.y));
            if let Some(a) = node.attached_room {
                map.insert(
                    "attachedRoom".into(),
                    json!({
                        "roomId": a.room_id,
                        "edge": a.edge.as_str(),
                        "relativePosition": num(a.relative_position),
                    }),
                );
            }
            Value::Object(map)
        })
        .collect()
}

// =============================================================================
// DECODE
// =============================================================================

/// Decode a compact document into a fresh [`Document`] and recompute its id
/// counter.
///
/// # Errors
///
/// Returns the first [`FormatError`] met; nothing partial is returned.
pub fn decode(compact: &CompactDoc) -> Result<Document, FormatError> {
    let mut doc = Document::new();
    doc.version = non_empty(compact.v.as_deref(), DEFAULT_VERSION);
    doc.map_name = non_empty(compact.n.as_deref(), DEFAULT_MAP_NAME);

    let mut generation = 1;
    let mut track = |t: &Tuple<'_>| generation = generation.max(t.generation());

    for (i, value) in compact.r.iter().flatten().enumerate() {
        let t = Tuple::new(TupleKind::Room, value, i)?;
        track(&t);
        doc.add(Entity::Room(decode_room(&t)?));
    }

    if let Some(hallways) = &compact.h {
        for (i, value) in hallways.iter().enumerate() {
            let t = Tuple::new(TupleKind::Hallway, value, i)?;
            track(&t);
            doc.add(Entity::Hallway(decode_hallway(&t)?));
        }
    } else {
        let corridors = compact.corridors.iter().flatten().map(|v| (v, false));
        let secret = compact.secret_passages.iter().flatten().map(|v| (v, true));
        for (i, (value, is_secret)) in corridors.chain(secret).enumerate() {
            doc.add(Entity::Hallway(decode_legacy_corridor(value, is_secret, i)?));
        }
        if !doc.hallways.is_empty() {
            debug!(hallways = doc.hallways.len(), "legacy corridors folded into hallways");
        }
    }

    for (i, value) in compact.w.iter().flatten().enumerate() {
        let t = Tuple::new(TupleKind::Wall, value, i)?;
        track(&t);
        doc.add(Entity::Wall(decode_wall(&t)?));
    }
    for (i, value) in compact.sm.iter().flatten().enumerate() {
        let t = Tuple::new(TupleKind::StandaloneMarker, value, i)?;
        track(&t);
        doc.add(Entity::StandaloneMarker(decode_standalone_marker(&t)?));
    }
    for (i, value) in compact.sl.iter().flatten().enumerate() {
        let t = Tuple::new(TupleKind::StandaloneLabel, value, i)?;
        track(&t);
        doc.add(Entity::StandaloneLabel(decode_standalone_label(&t)?));
    }

    doc.recompute_id_counter();
    debug!(
        generation,
        rooms = doc.rooms.len(),
        hallways = doc.hallways.len(),
        walls = doc.walls.len(),
        "compact document decoded"
    );
    Ok(doc)
}

/// Parse compact JSON text into a fresh document.
///
/// # Errors
///
/// Returns [`DecodeError::Json`] for malformed JSON or a top-level field of
/// the wrong type, and [`DecodeError::Format`] for malformed tuples.
pub fn from_json(text: &str) -> Result<Document, DecodeError> {
    let compact: CompactDoc = serde_json::from_str(text)?;
    Ok(decode(&compact)?)
}

fn non_empty(value: Option<&str>, default: &str) -> String {
    value.filter(|s| !s.is_empty()).unwrap_or(default).to_owned()
}

fn marker_kind(t: &Tuple<'_>, index: usize, default: MarkerKind) -> Result<MarkerKind, FormatError> {
    Ok(t.optional_text(index)?.map_or(default, |name| MarkerKind::parse(&name)))
}

fn decode_room(t: &Tuple<'_>) -> Result<Room, FormatError> {
    let id = t.id(0)?;
    let shape = t.optional_text(8)?.map_or(Shape::Rectangle, |name| Shape::parse(&name));
    let mut room = Room::new(id, shape, t.number(1)?, t.number(2)?, t.number(3)?, t.number(4)?);
    room.label = t.text(5)?;
    room.visible = t.flag_or(6, true)?;
    room.markers = t.tuples(7, TupleKind::Marker)?.iter().map(decode_marker).collect::<Result<_, _>>()?;
    room.walls = t
        .list(9)?
        .iter()
        .enumerate()
        .map(|(i, value)| decode_room_wall(value, i, id))
        .collect::<Result<_, _>>()?;
    room.labels = t.tuples(10, TupleKind::RoomLabel)?.iter().map(decode_room_label).collect::<Result<_, _>>()?;
    room.floor = t.integer_or(11, DEFAULT_FLOOR)?;
    room.label_visible = t.flag_or(12, true)?;
    room.color = t.optional_text(13)?;
    Ok(room)
}

/// Room-owned walls come in two shapes: the current wall layout and the
/// six-slot generation 2 layout, told apart by length.
fn decode_room_wall(value: &Value, index: usize, room_id: EntityId) -> Result<Wall, FormatError> {
    let is_v2 = value.as_array().is_some_and(|items| items.len() == ROOM_WALL_V2.len());
    let mut wall = if is_v2 {
        let t = Tuple::new(TupleKind::RoomWallV2, value, index)?;
        let mut wall = Wall::new(t.id(0)?, t.segments(1)?, t.number_or(2, CORRIDOR_WIDTH)?, None);
        wall.label = t.text(3)?;
        wall.nodes = t.nodes(4)?;
        wall.is_dotted = t.flag_or(5, false)?;
        wall
    } else {
        decode_wall(&Tuple::new(TupleKind::Wall, value, index)?)?
    };
    wall.parent_room_id = Some(room_id);
    Ok(wall)
}

fn decode_hallway(t: &Tuple<'_>) -> Result<Hallway, FormatError> {
    let mut hallway = Hallway::new(t.id(0)?, t.segments(1)?, t.number_or(2, CORRIDOR_WIDTH)?);
    hallway.label = t.text(3)?;
    hallway.is_secret = t.flag_or(4, false)?;
    hallway.visible = t.flag_or(5, true)?;
    hallway.nodes = t.nodes(6)?;
    hallway.start_marker = decode_endpoint_slot(t, 7)?;
    hallway.end_marker = decode_endpoint_slot(t, 8)?;
    hallway.markers = t.tuples(9, TupleKind::Marker)?.iter().map(decode_marker).collect::<Result<_, _>>()?;
    hallway.floor = t.integer_or(10, DEFAULT_FLOOR)?;
    Ok(hallway)
}

fn decode_wall(t: &Tuple<'_>) -> Result<Wall, FormatError> {
    let mut wall = Wall::new(t.id(0)?, t.segments(1)?, t.number_or(2, CORRIDOR_WIDTH)?, None);
    wall.label = t.text(3)?;
    wall.nodes = t.nodes(4)?;
    wall.visible = t.flag_or(5, true)?;
    wall.is_dotted = t.flag_or(6, false)?;
    wall.floor = t.integer_or(7, DEFAULT_FLOOR)?;
    Ok(wall)
}

fn decode_standalone_marker(t: &Tuple<'_>) -> Result<StandaloneMarker, FormatError> {
    let kind = marker_kind(t, 1, MarkerKind::default())?;
    let mut marker = StandaloneMarker::new(t.id(0)?, kind, t.number(2)?, t.number(3)?);
    marker.visible = t.flag_or(4, true)?;
    marker.label = t.text(5)?;
    marker.rotation = t.number(6)?;
    marker.floor = t.integer_or(7, DEFAULT_FLOOR)?;
    Ok(marker)
}

fn decode_standalone_label(t: &Tuple<'_>) -> Result<StandaloneLabel, FormatError> {
    let mut label = StandaloneLabel::new(t.id(0)?, t.text(1)?, t.number(2)?, t.number(3)?);
    label.visible = t.flag_or(4, true)?;
    label.floor = t.integer_or(5, DEFAULT_FLOOR)?;
    Ok(label)
}

fn decode_marker(t: &Tuple<'_>) -> Result<RoomMarker, FormatError> {
    let mut marker = RoomMarker::new(marker_kind(t, 0, MarkerKind::default())?, t.number(1)?, t.number(2)?);
    marker.visible = t.flag_or(3, true)?;
    marker.label = t.text(4)?;
    marker.rotation = t.number(5)?;
    Ok(marker)
}

fn decode_room_label(t: &Tuple<'_>) -> Result<RoomLabel, FormatError> {
    let mut label = RoomLabel::new(t.text(0)?, t.number(1)?, t.number(2)?);
    label.visible = t.flag_or(3, true)?;
    Ok(label)
}

fn decode_endpoint_slot(t: &Tuple<'_>, index: usize) -> Result<Option<EndpointMarker>, FormatError> {
    let Some(value) = t.get(index) else {
        return Ok(None);
    };
    let e = Tuple::new(TupleKind::EndpointMarker, value, index)?;
    let mut marker = EndpointMarker::new(marker_kind(&e, 0, MarkerKind::Door)?);
    marker.visible = e.flag_or(1, true)?;
    marker.rotation = e.number(2)?;
    Ok(Some(marker))
}

/// A pre-hallway corridor: either a keyed object or a hallway tuple.
fn decode_legacy_corridor(value: &Value, is_secret: bool, index: usize) -> Result<Hallway, FormatError> {
    let mut hallway = if value.is_array() {
        decode_hallway(&Tuple::new(TupleKind::Hallway, value, index)?)?
    } else {
        Hallway::deserialize(value)
            .map_err(|e| FormatError::BadLegacyCorridor { index, reason: e.to_string() })?
    };
    hallway.is_secret = is_secret;
    Ok(hallway)
}
