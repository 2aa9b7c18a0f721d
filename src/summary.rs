//! One-screen overview of a map, printed by `deckplan inspect`.

#[cfg(test)]
#[path = "summary_test.rs"]
mod summary_test;

use floorplan::doc::{AttachmentSite, Document};
use floorplan::entity::{EntityId, EntityKind};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub map_name: String,
    pub version: String,
    pub rooms: usize,
    pub room_walls: usize,
    pub hallways: usize,
    pub secret_hallways: usize,
    pub walls: usize,
    pub standalone_markers: usize,
    pub standalone_labels: usize,
    /// Entities, room walls included, dropped by the player view.
    pub hidden: usize,
    pub floors: Vec<i64>,
    pub next_id: EntityId,
    pub stale_attachments: Vec<StaleAttachment>,
}

/// A node naming a room that no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaleAttachment {
    pub kind: EntityKind,
    pub entity_id: EntityId,
    pub node_index: usize,
    pub room_id: EntityId,
}

impl From<AttachmentSite> for StaleAttachment {
    fn from(site: AttachmentSite) -> Self {
        Self { kind: site.kind, entity_id: site.entity_id, node_index: site.node_index, room_id: site.room_id }
    }
}

impl Summary {
    #[must_use]
    pub fn of(doc: &Document) -> Self {
        Self {
            map_name: doc.map_name.clone(),
            version: doc.version.clone(),
            rooms: doc.rooms.len(),
            room_walls: doc.rooms.iter().map(|r| r.walls.len()).sum(),
            hallways: doc.hallways.len(),
            secret_hallways: doc.hallways.iter().filter(|h| h.is_secret).count(),
            walls: doc.walls.len(),
            standalone_markers: doc.standalone_markers.len(),
            standalone_labels: doc.standalone_labels.len(),
            hidden: entity_count(doc).saturating_sub(entity_count(&doc.player_view())),
            floors: doc.floors(),
            next_id: doc.next_id(),
            stale_attachments: doc.stale_attachments().into_iter().map(StaleAttachment::from).collect(),
        }
    }
}

fn entity_count(doc: &Document) -> usize {
    doc.rooms.iter().map(|r| 1 + r.walls.len()).sum::<usize>()
        + doc.hallways.len()
        + doc.walls.len()
        + doc.standalone_markers.len()
        + doc.standalone_labels.len()
}
