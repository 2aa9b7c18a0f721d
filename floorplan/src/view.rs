//! Read-only projections for the viewer.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use std::collections::BTreeSet;

use crate::doc::Document;
use crate::entity::{EndpointMarker, Room};

impl Document {
    /// What players get to see: every hidden entity, marker and label is
    /// dropped, and room names with `label_visible` off are blanked.
    ///
    /// Endpoint markers are filtered on their own flag, so a visible
    /// corridor can still lose a hidden door.
    #[must_use]
    pub fn player_view(&self) -> Document {
        let mut view = self.clone();

        view.rooms.retain(|r| r.visible);
        for room in &mut view.rooms {
            hide_room_details(room);
        }

        view.hallways.retain(|h| h.visible);
        for hallway in &mut view.hallways {
            hallway.markers.retain(|m| m.visible);
            drop_hidden(&mut hallway.start_marker);
            drop_hidden(&mut hallway.end_marker);
        }

        view.walls.retain(|w| w.visible);
        view.standalone_markers.retain(|m| m.visible);
        view.standalone_labels.retain(|l| l.visible);
        view
    }

    /// Every floor number used by any entity, ascending.
    #[must_use]
    pub fn floors(&self) -> Vec<i64> {
        let mut floors = BTreeSet::new();
        floors.extend(self.rooms.iter().map(|r| r.floor));
        floors.extend(self.rooms.iter().flat_map(|r| r.walls.iter()).map(|w| w.floor));
        floors.extend(self.hallways.iter().map(|h| h.floor));
        floors.extend(self.walls.iter().map(|w| w.floor));
        floors.extend(self.standalone_markers.iter().map(|m| m.floor));
        floors.extend(self.standalone_labels.iter().map(|l| l.floor));
        floors.into_iter().collect()
    }

    /// Only the entities on `floor`. Room-owned walls follow their room.
    #[must_use]
    pub fn on_floor(&self, floor: i64) -> Document {
        let mut view = self.clone();
        view.rooms.retain(|r| r.floor == floor);
        view.hallways.retain(|h| h.floor == floor);
        view.walls.retain(|w| w.floor == floor);
        view.standalone_markers.retain(|m| m.floor == floor);
        view.standalone_labels.retain(|l| l.floor == floor);
        view
    }
}

fn hide_room_details(room: &mut Room) {
    if !room.label_visible {
        room.label.clear();
    }
    room.markers.retain(|m| m.visible);
    room.labels.retain(|l| l.visible);
    room.walls.retain(|w| w.visible);
}

fn drop_hidden(marker: &mut Option<EndpointMarker>) {
    if marker.as_ref().is_some_and(|m| !m.visible) {
        *marker = None;
    }
}
