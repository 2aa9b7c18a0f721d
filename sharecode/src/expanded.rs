//! Expanded JSON: the field-named file form used for import and export.
//!
//! Export writes every collection with camelCase keys, plus a derived
//! `radius` on circle rooms. Import ignores `radius`, fills missing fields
//! with defaults, and folds the legacy `corridors` / `secretPassages`
//! arrays into hallways when `hallways` is absent.

#[cfg(test)]
#[path = "expanded_test.rs"]
mod expanded_test;

use floorplan::consts::{DEFAULT_MAP_NAME, DEFAULT_VERSION};
use floorplan::doc::Document;
use floorplan::entity::{Entity, Hallway, Room, StandaloneLabel, StandaloneMarker, Wall};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DecodeError, EncodeError};

/// Input shape. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ExpandedIn {
    version: Option<String>,
    map_name: Option<String>,
    rooms: Option<Vec<Room>>,
    hallways: Option<Vec<Hallway>>,
    walls: Option<Vec<Wall>>,
    standalone_markers: Option<Vec<StandaloneMarker>>,
    standalone_labels: Option<Vec<StandaloneLabel>>,
    corridors: Option<Vec<Hallway>>,
    secret_passages: Option<Vec<Hallway>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExpandedOut<'a> {
    version: &'a str,
    map_name: &'a str,
    rooms: Vec<RoomOut<'a>>,
    hallways: &'a [Hallway],
    walls: &'a [Wall],
    standalone_markers: &'a [StandaloneMarker],
    standalone_labels: &'a [StandaloneLabel],
}

/// A room plus its derived radius.
#[derive(Serialize)]
struct RoomOut<'a> {
    #[serde(flatten)]
    room: &'a Room,
    #[serde(skip_serializing_if = "Option::is_none")]
    radius: Option<f64>,
}

/// Export a document as pretty-printed expanded JSON.
///
/// # Errors
///
/// Returns [`EncodeError::Json`] if serialization fails.
pub fn to_expanded_json(doc: &Document) -> Result<String, EncodeError> {
    let out = ExpandedOut {
        version: &doc.version,
        map_name: &doc.map_name,
        rooms: doc.rooms.iter().map(|room| RoomOut { room, radius: room.radius() }).collect(),
        hallways: &doc.hallways,
        walls: &doc.walls,
        standalone_markers: &doc.standalone_markers,
        standalone_labels: &doc.standalone_labels,
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Parse expanded JSON into a fresh document and recompute its id counter.
///
/// # Errors
///
/// Returns [`DecodeError::Json`] if the text is not valid JSON or a field
/// has an impossible type.
pub fn from_expanded_json(text: &str) -> Result<Document, DecodeError> {
    let input: ExpandedIn = serde_json::from_str(text)?;

    let mut doc = Document::new();
    doc.version = input.version.filter(|v| !v.is_empty()).unwrap_or_else(|| DEFAULT_VERSION.to_owned());
    doc.map_name = input.map_name.filter(|n| !n.is_empty()).unwrap_or_else(|| DEFAULT_MAP_NAME.to_owned());

    for mut room in input.rooms.unwrap_or_default() {
        for wall in &mut room.walls {
            wall.parent_room_id = Some(room.id);
        }
        doc.add(Entity::Room(room));
    }

    match input.hallways {
        Some(hallways) => hallways.into_iter().for_each(|h| doc.add(Entity::Hallway(h))),
        None => {
            let corridors = input.corridors.unwrap_or_default().into_iter().map(|h| (h, false));
            let secret = input.secret_passages.unwrap_or_default().into_iter().map(|h| (h, true));
            for (mut hallway, is_secret) in corridors.chain(secret) {
                hallway.is_secret = is_secret;
                doc.add(Entity::Hallway(hallway));
            }
            if !doc.hallways.is_empty() {
                debug!(hallways = doc.hallways.len(), "legacy corridors folded into hallways");
            }
        }
    }

    // Standalone walls stay standalone even if they name a parent.
    for mut wall in input.walls.unwrap_or_default() {
        wall.parent_room_id = None;
        doc.walls.push(wall);
    }
    for marker in input.standalone_markers.unwrap_or_default() {
        doc.add(Entity::StandaloneMarker(marker));
    }
    for label in input.standalone_labels.unwrap_or_default() {
        doc.add(Entity::StandaloneLabel(label));
    }

    doc.recompute_id_counter();
    debug!(rooms = doc.rooms.len(), hallways = doc.hallways.len(), next_id = doc.next_id(), "expanded document loaded");
    Ok(doc)
}

/// Parse expanded JSON and, only on success, swap it into `live`.
///
/// # Errors
///
/// Returns the [`DecodeError`] from [`from_expanded_json`]; `live` is untouched.
pub fn import_expanded(live: &mut Document, text: &str) -> Result<(), DecodeError> {
    match from_expanded_json(text) {
        Ok(incoming) => {
            live.replace(incoming);
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "expanded document rejected");
            Err(e)
        }
    }
}
