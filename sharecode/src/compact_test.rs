#![allow(clippy::float_cmp)]

use super::*;
use floorplan::entity::Attachment;
use floorplan::geometry::{Edge, Point};

/// One of everything: a circle room with markers, labels and an owned wall,
/// a rectangle room, an attached secret hallway, a standalone wall, marker
/// and label on a second floor.
fn sample_doc() -> Document {
    let mut doc = Document::named("Derelict Freighter");

    let mut bridge = Room::new(1, Shape::Rectangle, 0.0, 0.0, 100.0, 50.0);
    bridge.label = "Bridge".into();
    bridge.color = Some("#ff8800".into());
    bridge.label_visible = false;
    let mut console = RoomMarker::new(MarkerKind::Terminal, 10.0, 12.5);
    console.label = "Nav".into();
    console.rotation = 90.0;
    bridge.markers.push(console);
    bridge.markers.push(RoomMarker::new(MarkerKind::Other("banner".into()), 40.0, 4.0));
    let mut caption = RoomLabel::new("Captain's chair", 30.0, 20.0);
    caption.visible = false;
    bridge.labels.push(caption);
    let mut rail = Wall::new(7, vec![Segment::new(Point::new(5.0, 5.0), Point::new(95.0, 5.0))], 2.0, Some(1));
    rail.is_dotted = true;
    bridge.walls.push(rail);
    doc.add(Entity::Room(bridge));

    let mut core = Room::new(2, Shape::Circle, 200.0, 0.0, 60.0, 60.0);
    core.visible = false;
    core.floor = 2;
    doc.add(Entity::Room(core));

    let nodes = vec![
        Node::attached(Point::new(100.0, 25.0), Attachment { room_id: 1, edge: Edge::Right, relative_position: 0.5 }),
        Node::attached(Point::new(200.0, 30.0), Attachment { room_id: 2, edge: Edge::West, relative_position: 0.25 }),
    ];
    let mut vent = Hallway::from_nodes(3, nodes, 10.0);
    vent.label = "Vent".into();
    vent.start_marker = Some(EndpointMarker::new(MarkerKind::Door));
    let mut far_end = EndpointMarker::new(MarkerKind::Door);
    far_end.visible = false;
    far_end.rotation = 180.0;
    vent.end_marker = Some(far_end);
    vent.set_secret(true);
    vent.markers.push(RoomMarker::new(MarkerKind::Hazard, 150.0, 25.0));
    doc.add(Entity::Hallway(vent));

    let mut bulkhead = Wall::new(4, vec![Segment::new(Point::new(0.0, 80.0), Point::new(0.0, 140.0))], 10.0, None);
    bulkhead.visible = false;
    doc.add(Entity::Wall(bulkhead));

    let mut ladder = StandaloneMarker::new(5, MarkerKind::Ladder, 300.5, 20.0);
    ladder.floor = 2;
    ladder.rotation = 45.0;
    doc.add(Entity::StandaloneMarker(ladder));

    doc.add(Entity::StandaloneLabel(StandaloneLabel::new(6, "Cargo hold", 10.0, 200.0)));
    doc.recompute_id_counter();
    doc
}

fn compact_value(doc: &Document) -> Value {
    serde_json::to_value(encode(doc)).unwrap()
}

// =============================================================
// Round trip
// =============================================================

#[test]
fn round_trip_preserves_document() {
    let doc = sample_doc();
    let text = to_json(&doc).unwrap();
    let back = from_json(&text).unwrap();
    assert_eq!(back, doc);
    assert_eq!(back.next_id(), 8);
}

#[test]
fn round_trip_restores_room_wall_parent() {
    let back = from_json(&to_json(&sample_doc()).unwrap()).unwrap();
    let wall = back.wall(7).unwrap();
    assert_eq!(wall.parent_room_id, Some(1));
    assert!(back.walls.iter().all(|w| w.parent_room_id.is_none()));
}

#[test]
fn empty_document_round_trips() {
    let doc = Document::new();
    let back = from_json(&to_json(&doc).unwrap()).unwrap();
    assert_eq!(back, doc);
    assert_eq!(back.next_id(), 1);
}

// =============================================================
// Encoding shape
// =============================================================

#[test]
fn encode_writes_newest_layout() {
    let value = compact_value(&sample_doc());
    assert_eq!(value["v"], "1.0.0");
    assert_eq!(value["n"], "Derelict Freighter");
    assert_eq!(value["r"][0].as_array().unwrap().len(), crate::layout::ROOM.len());
    assert_eq!(value["h"][0].as_array().unwrap().len(), crate::layout::HALLWAY.len());
    assert_eq!(value["w"][0].as_array().unwrap().len(), crate::layout::WALL.len());
    assert_eq!(value["sm"][0].as_array().unwrap().len(), crate::layout::STANDALONE_MARKER.len());
    assert_eq!(value["sl"][0].as_array().unwrap().len(), crate::layout::STANDALONE_LABEL.len());
}

#[test]
fn encode_never_writes_legacy_keys() {
    let value = compact_value(&sample_doc());
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert!(!keys.contains(&"corridors"));
    assert!(!keys.contains(&"secretPassages"));
}

#[test]
fn integral_numbers_are_written_as_integers() {
    let value = compact_value(&sample_doc());
    let room = &value["r"][0];
    assert!(room[1].is_i64());
    assert!(room[3].is_i64());
    assert_eq!(room[3], 100);
    let marker = &value["sm"][0];
    assert!(marker[2].is_f64());
    assert_eq!(marker[2], 300.5);
}

#[test]
fn flags_are_written_as_zero_or_one() {
    let value = compact_value(&sample_doc());
    assert_eq!(value["r"][0][6], 1);
    assert_eq!(value["r"][0][12], 0);
    assert_eq!(value["r"][1][6], 0);
    assert_eq!(value["h"][0][4], 1);
}

#[test]
fn missing_optionals_are_written_as_null() {
    let value = compact_value(&sample_doc());
    assert!(value["r"][1][13].is_null());
    let mut doc = sample_doc();
    doc.hallway_mut(3).unwrap().start_marker = None;
    assert!(compact_value(&doc)["h"][0][7].is_null());
}

#[test]
fn nodes_stay_keyed_objects() {
    let value = compact_value(&sample_doc());
    let node = &value["h"][0][6][0];
    assert_eq!(node["x"], 100);
    assert_eq!(node["attachedRoom"]["roomId"], 1);
    assert_eq!(node["attachedRoom"]["edge"], "right");
    assert_eq!(node["attachedRoom"]["relativePosition"], 0.5);
}

#[test]
fn num_handles_non_finite() {
    assert!(num(f64::NAN).is_null());
    assert!(num(f64::INFINITY).is_null());
    assert_eq!(num(-3.0), Value::from(-3));
    assert_eq!(num(1.25), Value::from(1.25));
}

// =============================================================
// Older generations
// =============================================================

#[test]
fn generation_one_room_fills_defaults() {
    let doc = from_json(r#"{"r":[[1,10,20,100,50,"Bridge",1,[["door",5,5,1,"Hatch"]]]]}"#).unwrap();
    let room = doc.room(1).unwrap();
    assert_eq!(room.shape, Shape::Rectangle);
    assert_eq!((room.x, room.y, room.width, room.height), (10.0, 20.0, 100.0, 50.0));
    assert_eq!(room.label, "Bridge");
    assert!(room.walls.is_empty());
    assert!(room.labels.is_empty());
    assert_eq!(room.floor, 1);
    assert!(room.label_visible);
    assert_eq!(room.color, None);
    assert_eq!(room.markers[0].kind, MarkerKind::Door);
    assert_eq!(room.markers[0].label, "Hatch");
    assert_eq!(room.markers[0].rotation, 0.0);
}

#[test]
fn generation_one_hallway_fills_defaults() {
    let doc = from_json(r#"{"h":[[3,[[0,0,40,0]],8,"Spine",0,1]]}"#).unwrap();
    let hallway = doc.hallway(3).unwrap();
    assert_eq!(hallway.width, 8.0);
    assert_eq!(hallway.segments.len(), 1);
    assert!(hallway.nodes.is_empty());
    assert!(hallway.start_marker.is_none());
    assert!(hallway.markers.is_empty());
    assert_eq!(hallway.floor, 1);
}

#[test]
fn generation_two_endpoint_marker_defaults_rotation() {
    let doc = from_json(r#"{"h":[[3,[],10,"",0,1,[],["door",1],["grate",0]]]}"#).unwrap();
    let hallway = doc.hallway(3).unwrap();
    assert_eq!(hallway.start_marker.as_ref().map(|m| m.rotation), Some(0.0));
    let end = hallway.end_marker.as_ref().unwrap();
    assert_eq!(end.kind, MarkerKind::Grate);
    assert!(!end.visible);
}

#[test]
fn missing_width_defaults_to_corridor_width() {
    let doc = from_json(r#"{"w":[[4,[[0,0,0,30]]]]}"#).unwrap();
    assert_eq!(doc.walls[0].width, CORRIDOR_WIDTH);
    assert!(doc.walls[0].visible);
    assert!(!doc.walls[0].is_dotted);
}

#[test]
fn generation_two_room_wall_reads_dotted_flag() {
    let text = r#"{"r":[[1,0,0,100,50,"",1,[],"rectangle",[[5,[[0,0,10,0]],4,"rail",[],1]]]]}"#;
    let doc = from_json(text).unwrap();
    let wall = &doc.room(1).unwrap().walls[0];
    assert_eq!(wall.id, 5);
    assert_eq!(wall.width, 4.0);
    assert_eq!(wall.label, "rail");
    assert!(wall.is_dotted);
    assert!(wall.visible);
    assert_eq!(wall.parent_room_id, Some(1));
    assert_eq!(doc.next_id(), 6);
}

#[test]
fn current_room_wall_reads_visible_then_dotted() {
    let text = r#"{"r":[[1,0,0,100,50,"",1,[],"rectangle",[[5,[],4,"",[],0,1,2]]]]}"#;
    let doc = from_json(text).unwrap();
    let wall = &doc.room(1).unwrap().walls[0];
    assert!(!wall.visible);
    assert!(wall.is_dotted);
    assert_eq!(wall.floor, 2);
}

#[test]
fn boolean_and_numeric_flags_decode_alike() {
    let numeric = from_json(r#"{"r":[[1,0,0,20,20,"",0,[]]]}"#).unwrap();
    let boolean = from_json(r#"{"r":[[1,0,0,20,20,"",false,[]]]}"#).unwrap();
    assert_eq!(numeric, boolean);
    assert!(!numeric.rooms[0].visible);
}

#[test]
fn empty_name_and_version_take_defaults() {
    let doc = from_json(r#"{"v":"","n":""}"#).unwrap();
    assert_eq!(doc.version, DEFAULT_VERSION);
    assert_eq!(doc.map_name, DEFAULT_MAP_NAME);
}

// =============================================================
// Legacy corridors
// =============================================================

#[test]
fn legacy_corridors_fold_into_hallways() {
    let text = r#"{"v":"1.0.0","n":"Old","corridors":[{"id":1,"segments":[{"x1":0,"y1":0,"x2":50,"y2":0}],"width":10}]}"#;
    let doc = from_json(text).unwrap();
    assert_eq!(doc.hallways.len(), 1);
    let hallway = &doc.hallways[0];
    assert_eq!(hallway.id, 1);
    assert!(!hallway.is_secret);
    assert_eq!(hallway.segments[0].x2, 50.0);
    assert_eq!(doc.next_id(), 2);
}

#[test]
fn legacy_secret_passages_are_secret() {
    let text = r#"{"corridors":[[1,[],10,"",1,1]],"secretPassages":[{"id":2,"isSecret":false}]}"#;
    let doc = from_json(text).unwrap();
    assert!(!doc.hallway(1).unwrap().is_secret);
    assert!(doc.hallway(2).unwrap().is_secret);
}

#[test]
fn hallways_key_wins_over_legacy_arrays() {
    let text = r#"{"h":[],"corridors":[{"id":1}]}"#;
    let doc = from_json(text).unwrap();
    assert!(doc.hallways.is_empty());
}

#[test]
fn malformed_legacy_corridor_is_rejected() {
    let err = from_json(r#"{"corridors":[{"id":"one"}]}"#).unwrap_err();
    assert!(matches!(err, DecodeError::Format(FormatError::BadLegacyCorridor { index: 0, .. })));
}

// =============================================================
// Malformed input
// =============================================================

#[test]
fn bad_id_is_a_format_error() {
    let err = from_json(r#"{"r":[["x",0,0,20,20]]}"#).unwrap_err();
    assert!(matches!(err, DecodeError::Format(FormatError::BadId { kind: TupleKind::Room, slot: "id" })));
}

#[test]
fn entity_that_is_not_a_tuple_is_a_format_error() {
    let err = from_json(r#"{"sm":[[5,"ladder",0,0],{"id":6}]}"#).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Format(FormatError::NotATuple { kind: TupleKind::StandaloneMarker, index: 1 })
    ));
}

#[test]
fn top_level_of_wrong_type_is_a_json_error() {
    assert!(matches!(from_json(r#"{"r":5}"#), Err(DecodeError::Json(_))));
    assert!(matches!(from_json("not json"), Err(DecodeError::Json(_))));
}

#[test]
fn wrong_slot_type_is_a_format_error() {
    let err = from_json(r#"{"sl":[[6,42,0,0]]}"#).unwrap_err();
    assert_eq!(err.to_string(), "standaloneLabel.text: expected string, found number");
}

#[test]
fn odd_segment_coordinate_count_is_rejected() {
    let err = from_json(r#"{"h":[[1,[[0,0,10,0,99]],10]]}"#).unwrap_err();
    assert!(matches!(err, DecodeError::Format(FormatError::BadSegment { kind: TupleKind::Hallway, index: 0, .. })));
}

#[test]
fn ids_past_the_exact_float_range_are_rejected() {
    let err = from_json(r#"{"r":[[18446744073709551615,0,0,40,40]]}"#).unwrap_err();
    assert!(matches!(err, DecodeError::Format(FormatError::BadId { kind: TupleKind::Room, .. })));
}

#[test]
fn largest_id_still_allocates_after_it() {
    let mut doc = from_json(r#"{"r":[[9007199254740991,0,0,40,40]]}"#).unwrap();
    assert_eq!(doc.allocate_id(), 9_007_199_254_740_992);
}

// =============================================================
// Degenerate geometry
// =============================================================

#[test]
fn non_finite_geometry_decodes_to_defaults() {
    let mut doc = Document::new();
    doc.add(Entity::Room(Room::new(1, Shape::Rectangle, 0.0, 0.0, f64::INFINITY, 40.0)));
    let nodes = vec![
        Node::attached(Point::new(0.0, 0.0), Attachment { room_id: 1, edge: Edge::Top, relative_position: 0.5 }),
        Node::new(Point::new(0.0, 100.0)),
    ];
    doc.add(Entity::Hallway(Hallway::from_nodes(2, nodes, 10.0)));
    doc.on_room_moved(1);

    let back = from_json(&to_json(&doc).unwrap()).unwrap();
    assert_eq!(back.room(1).unwrap().width, 0.0);
    let hallway = back.hallway(2).unwrap();
    assert_eq!(hallway.nodes.len(), 2);
    assert_eq!(hallway.nodes[0].attached_room.map(|a| a.room_id), Some(1));
    assert!(hallway.nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()));
    assert!(hallway.segments.iter().all(|s| [s.x1, s.y1, s.x2, s.y2].iter().all(|c| c.is_finite())));
}
