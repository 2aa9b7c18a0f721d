//! Positional tuple layouts and a typed reader over them.
//!
//! Every compact entity is a JSON array whose meaning is fixed by slot
//! position. Layouts only ever grow at the end, so each slot records the
//! schema generation that introduced it. A tuple shorter than the current
//! layout is an older payload; its missing slots take their defaults.
//!
//! | Generation | Added |
//! |-----------:|-------|
//! | 1 | room core, corridor core, wall core, standalone markers, room markers |
//! | 2 | room `shape`/`walls`, corridor nodes and endpoint markers, wall `isDotted`, standalone labels |
//! | 3 | room `labels`, `floor` everywhere, marker `rotation` |
//! | 4 | room `labelVisible` and `color` |

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use std::fmt;

use floorplan::consts::MAX_SAFE_ID;
use floorplan::entity::{EntityId, Node};
use floorplan::geometry::Segment;
use serde::Deserialize;
use serde_json::Value;

/// The newest generation; encoders always write it.
pub const CURRENT_GENERATION: u8 = 4;

/// One position in a tuple layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub name: &'static str,
    /// Schema generation that introduced this slot.
    pub since: u8,
}

const fn slot(name: &'static str, since: u8) -> Slot {
    Slot { name, since }
}

// ── Top-level entities ──────────────────────────────────────────

pub const ROOM: &[Slot] = &[
    slot("id", 1),
    slot("x", 1),
    slot("y", 1),
    slot("width", 1),
    slot("height", 1),
    slot("label", 1),
    slot("visible", 1),
    slot("markers", 1),
    slot("shape", 2),
    slot("walls", 2),
    slot("labels", 3),
    slot("floor", 3),
    slot("labelVisible", 4),
    slot("color", 4),
];

pub const HALLWAY: &[Slot] = &[
    slot("id", 1),
    slot("segments", 1),
    slot("width", 1),
    slot("label", 1),
    slot("isSecret", 1),
    slot("visible", 1),
    slot("nodes", 2),
    slot("startMarker", 2),
    slot("endMarker", 2),
    slot("markers", 3),
    slot("floor", 3),
];

pub const WALL: &[Slot] = &[
    slot("id", 1),
    slot("segments", 1),
    slot("width", 1),
    slot("label", 1),
    slot("nodes", 1),
    slot("visible", 1),
    slot("isDotted", 2),
    slot("floor", 3),
];

/// Room-owned walls as written by generation 2 writers: no `visible` slot,
/// `isDotted` sits where `visible` is now. Recognised by its exact length.
pub const ROOM_WALL_V2: &[Slot] = &[
    slot("id", 2),
    slot("segments", 2),
    slot("width", 2),
    slot("label", 2),
    slot("nodes", 2),
    slot("isDotted", 2),
];

pub const STANDALONE_MARKER: &[Slot] = &[
    slot("id", 1),
    slot("type", 1),
    slot("x", 1),
    slot("y", 1),
    slot("visible", 1),
    slot("label", 1),
    slot("rotation", 3),
    slot("floor", 3),
];

pub const STANDALONE_LABEL: &[Slot] = &[
    slot("id", 2),
    slot("text", 2),
    slot("x", 2),
    slot("y", 2),
    slot("visible", 2),
    slot("floor", 3),
];

// ── Nested tuples ───────────────────────────────────────────────

pub const MARKER: &[Slot] = &[
    slot("type", 1),
    slot("x", 1),
    slot("y", 1),
    slot("visible", 1),
    slot("label", 1),
    slot("rotation", 3),
];

pub const ENDPOINT_MARKER: &[Slot] = &[slot("type", 2), slot("visible", 2), slot("rotation", 3)];

pub const ROOM_LABEL: &[Slot] = &[slot("text", 3), slot("x", 3), slot("y", 3), slot("visible", 3)];

pub const SEGMENT: &[Slot] = &[slot("x1", 1), slot("y1", 1), slot("x2", 1), slot("y2", 1)];

/// Which layout a tuple follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleKind {
    Room,
    Hallway,
    Wall,
    RoomWallV2,
    StandaloneMarker,
    StandaloneLabel,
    Marker,
    EndpointMarker,
    RoomLabel,
    Segment,
}

impl TupleKind {
    #[must_use]
    pub fn layout(self) -> &'static [Slot] {
        match self {
            TupleKind::Room => ROOM,
            TupleKind::Hallway => HALLWAY,
            TupleKind::Wall => WALL,
            TupleKind::RoomWallV2 => ROOM_WALL_V2,
            TupleKind::StandaloneMarker => STANDALONE_MARKER,
            TupleKind::StandaloneLabel => STANDALONE_LABEL,
            TupleKind::Marker => MARKER,
            TupleKind::EndpointMarker => ENDPOINT_MARKER,
            TupleKind::RoomLabel => ROOM_LABEL,
            TupleKind::Segment => SEGMENT,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TupleKind::Room => "room",
            TupleKind::Hallway => "hallway",
            TupleKind::Wall | TupleKind::RoomWallV2 => "wall",
            TupleKind::StandaloneMarker => "standaloneMarker",
            TupleKind::StandaloneLabel => "standaloneLabel",
            TupleKind::Marker => "marker",
            TupleKind::EndpointMarker => "endpointMarker",
            TupleKind::RoomLabel => "roomLabel",
            TupleKind::Segment => "segment",
        }
    }
}

impl fmt::Display for TupleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structurally impossible compact input. Each variant names the tuple kind
/// and slot at fault.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("{kind} #{index} is not an array")]
    NotATuple { kind: TupleKind, index: usize },
    #[error("{kind}.{slot}: expected {expected}, found {found}")]
    WrongType { kind: TupleKind, slot: &'static str, expected: &'static str, found: &'static str },
    #[error("{kind}.{slot}: id must be a non-negative integer")]
    BadId { kind: TupleKind, slot: &'static str },
    #[error("{kind}.{slot}: segment #{index} needs four numbers")]
    BadSegment { kind: TupleKind, slot: &'static str, index: usize },
    #[error("{kind}.{slot}: node #{index} is malformed: {reason}")]
    BadNode { kind: TupleKind, slot: &'static str, index: usize, reason: String },
    #[error("legacy corridor #{index} is malformed: {reason}")]
    BadLegacyCorridor { index: usize, reason: String },
}

/// Generation of a tuple of `len` slots: the newest generation among the
/// slots present.
#[must_use]
pub fn generation_of(layout: &[Slot], len: usize) -> u8 {
    layout.iter().take(len).map(|s| s.since).max().unwrap_or(1)
}

/// JSON type name for error messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read access to one positional tuple.
///
/// Absent slots and explicit `null` read as the slot's default. A present
/// slot of the wrong JSON type is a [`FormatError`].
#[derive(Debug, Clone, Copy)]
pub struct Tuple<'a> {
    kind: TupleKind,
    items: &'a [Value],
}

impl<'a> Tuple<'a> {
    /// View `value` as a `kind` tuple; `index` is its position in the
    /// enclosing list, used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::NotATuple`] if `value` is not an array.
    pub fn new(kind: TupleKind, value: &'a Value, index: usize) -> Result<Self, FormatError> {
        match value {
            Value::Array(items) => Ok(Self { kind, items }),
            _ => Err(FormatError::NotATuple { kind, index }),
        }
    }

    #[must_use]
    pub fn kind(&self) -> TupleKind {
        self.kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn generation(&self) -> u8 {
        generation_of(self.kind.layout(), self.items.len())
    }

    fn slot_name(&self, index: usize) -> &'static str {
        self.kind.layout().get(index).map_or("?", |s| s.name)
    }

    /// The raw slot value; `None` for absent or `null`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.items.get(index).filter(|v| !v.is_null())
    }

    fn wrong_type(&self, index: usize, expected: &'static str, found: &Value) -> FormatError {
        FormatError::WrongType { kind: self.kind, slot: self.slot_name(index), expected, found: type_name(found) }
    }

    /// # Errors
    ///
    /// Returns [`FormatError::BadId`] unless the slot holds an integer
    /// between 0 and 2^53 - 1. Ids have no default.
    #[allow(clippy::float_cmp)]
    pub fn id(&self, index: usize) -> Result<EntityId, FormatError> {
        let bad = || FormatError::BadId { kind: self.kind, slot: self.slot_name(index) };
        let value = self.get(index).ok_or_else(bad)?;
        if let Some(id) = value.as_u64() {
            return if id <= MAX_SAFE_ID { Ok(id) } else { Err(bad()) };
        }
        match value.as_f64() {
            Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= MAX_SAFE_INTEGER => Ok(float_to_id(n)),
            _ => Err(bad()),
        }
    }

    /// # Errors
    ///
    /// Returns [`FormatError::WrongType`] if the slot holds a non-number.
    pub fn number_or(&self, index: usize, default: f64) -> Result<f64, FormatError> {
        match self.get(index) {
            None => Ok(default),
            Some(v) => v.as_f64().ok_or_else(|| self.wrong_type(index, "number", v)),
        }
    }

    /// Number slot defaulting to 0.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::WrongType`] if the slot holds a non-number.
    pub fn number(&self, index: usize) -> Result<f64, FormatError> {
        self.number_or(index, 0.0)
    }

    /// Integer slot (floors). Integral floats are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::WrongType`] for non-numbers and fractional numbers.
    #[allow(clippy::float_cmp)]
    pub fn integer_or(&self, index: usize, default: i64) -> Result<i64, FormatError> {
        let Some(v) = self.get(index) else {
            return Ok(default);
        };
        if let Some(n) = v.as_i64() {
            return Ok(n);
        }
        match v.as_f64() {
            Some(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => Ok(float_to_int(n)),
            _ => Err(self.wrong_type(index, "integer", v)),
        }
    }

    /// Boolean slot. Accepts JSON booleans and numbers (non-zero is true).
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::WrongType`] for any other JSON type.
    #[allow(clippy::float_cmp)]
    pub fn flag_or(&self, index: usize, default: bool) -> Result<bool, FormatError> {
        match self.get(index) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
            Some(v) => Err(self.wrong_type(index, "boolean or 0/1", v)),
        }
    }

    /// String slot defaulting to empty.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::WrongType`] if the slot holds a non-string.
    pub fn text(&self, index: usize) -> Result<String, FormatError> {
        self.optional_text(index).map(Option::unwrap_or_default)
    }

    /// String slot where absence is meaningful.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::WrongType`] if the slot holds a non-string.
    pub fn optional_text(&self, index: usize) -> Result<Option<String>, FormatError> {
        match self.get(index) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(v) => Err(self.wrong_type(index, "string", v)),
        }
    }

    /// Array slot defaulting to empty.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::WrongType`] if the slot holds a non-array.
    pub fn list(&self, index: usize) -> Result<&'a [Value], FormatError> {
        match self.get(index) {
            None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items),
            Some(v) => Err(self.wrong_type(index, "array", v)),
        }
    }

    /// Array of `kind` tuples in slot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the slot or any element is not an array.
    pub fn tuples(&self, index: usize, kind: TupleKind) -> Result<Vec<Tuple<'a>>, FormatError> {
        self.list(index)?
            .iter()
            .enumerate()
            .map(|(i, v)| Tuple::new(kind, v, i))
            .collect()
    }

    /// Array of `[x1, y1, x2, y2]` segments in slot `index`. A `null`
    /// coordinate (how non-finite values are written) reads as 0.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::BadSegment`] for any entry that is not an
    /// array of exactly four numbers or nulls.
    pub fn segments(&self, index: usize) -> Result<Vec<Segment>, FormatError> {
        self.list(index)?
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let bad = || FormatError::BadSegment { kind: self.kind, slot: self.slot_name(index), index: i };
                let coords = v.as_array().filter(|c| c.len() == SEGMENT.len()).ok_or_else(bad)?;
                let n = |k: usize| match &coords[k] {
                    Value::Null => Ok(0.0),
                    c => c.as_f64().ok_or_else(bad),
                };
                Ok(Segment { x1: n(0)?, y1: n(1)?, x2: n(2)?, y2: n(3)? })
            })
            .collect()
    }

    /// Array of keyed node objects in slot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::BadNode`] for any entry that does not
    /// deserialize as a node.
    pub fn nodes(&self, index: usize) -> Result<Vec<Node>, FormatError> {
        self.list(index)?
            .iter()
            .enumerate()
            .map(|(i, v)| {
                if !v.is_object() {
                    return Err(FormatError::BadNode {
                        kind: self.kind,
                        slot: self.slot_name(index),
                        index: i,
                        reason: format!("expected object, found {}", type_name(v)),
                    });
                }
                Node::deserialize(v).map_err(|e| FormatError::BadNode {
                    kind: self.kind,
                    slot: self.slot_name(index),
                    index: i,
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

/// Largest integer an `f64` represents exactly (2^53 - 1).
pub(crate) const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_id(n: f64) -> EntityId {
    n as EntityId
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_int(n: f64) -> i64 {
    n as i64
}
