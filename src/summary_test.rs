use super::*;
use floorplan::entity::{Attachment, Entity, Hallway, Node, Room, Shape, StandaloneLabel, Wall};
use floorplan::geometry::{Edge, Point};

fn doc_with_stale_hallway() -> Document {
    let mut doc = Document::named("Wreck");
    let mut lab = Room::new(1, Shape::Rectangle, 0.0, 0.0, 100.0, 50.0);
    lab.walls.push(Wall::new(5, Vec::new(), 2.0, Some(1)));
    doc.add(Entity::Room(lab));
    let mut vault = Room::new(2, Shape::Rectangle, 300.0, 0.0, 40.0, 40.0);
    vault.visible = false;
    vault.floor = 2;
    doc.add(Entity::Room(vault));

    let nodes = vec![
        Node::attached(Point::new(100.0, 25.0), Attachment { room_id: 1, edge: Edge::Right, relative_position: 0.5 }),
        Node::attached(Point::new(300.0, 20.0), Attachment { room_id: 9, edge: Edge::Left, relative_position: 0.5 }),
    ];
    let mut passage = Hallway::from_nodes(3, nodes, 10.0);
    passage.is_secret = true;
    doc.add(Entity::Hallway(passage));

    let mut note = StandaloneLabel::new(4, "gm only", 0.0, 0.0);
    note.visible = false;
    doc.add(Entity::StandaloneLabel(note));
    doc.recompute_id_counter();
    doc
}

#[test]
fn counts_every_collection() {
    let summary = Summary::of(&doc_with_stale_hallway());
    assert_eq!(summary.map_name, "Wreck");
    assert_eq!(summary.rooms, 2);
    assert_eq!(summary.room_walls, 1);
    assert_eq!(summary.hallways, 1);
    assert_eq!(summary.secret_hallways, 1);
    assert_eq!(summary.walls, 0);
    assert_eq!(summary.standalone_markers, 0);
    assert_eq!(summary.standalone_labels, 1);
    assert_eq!(summary.next_id, 6);
}

#[test]
fn floors_are_sorted_and_unique() {
    assert_eq!(Summary::of(&doc_with_stale_hallway()).floors, vec![1, 2]);
}

#[test]
fn hidden_counts_what_players_lose() {
    assert_eq!(Summary::of(&doc_with_stale_hallway()).hidden, 2);
}

#[test]
fn reports_stale_attachments() {
    let summary = Summary::of(&doc_with_stale_hallway());
    assert_eq!(
        summary.stale_attachments,
        vec![StaleAttachment { kind: EntityKind::Hallway, entity_id: 3, node_index: 1, room_id: 9 }]
    );
}

#[test]
fn empty_map_summary() {
    let summary = Summary::of(&Document::new());
    assert_eq!(summary.rooms, 0);
    assert_eq!(summary.hidden, 0);
    assert!(summary.floors.is_empty());
    assert_eq!(summary.next_id, 1);
    assert!(summary.stale_attachments.is_empty());
}

#[test]
fn serializes_camel_case() {
    let value = serde_json::to_value(Summary::of(&doc_with_stale_hallway())).unwrap();
    assert_eq!(value["secretHallways"], 1);
    assert_eq!(value["staleAttachments"][0]["kind"], "hallway");
    assert_eq!(value["staleAttachments"][0]["roomId"], 9);
}
