#![allow(clippy::float_cmp)]

use super::*;
use serde_json::json;

// =============================================================
// Layout tables
// =============================================================

#[test]
fn layouts_only_grow_at_the_end() {
    let all = [ROOM, HALLWAY, WALL, ROOM_WALL_V2, STANDALONE_MARKER, STANDALONE_LABEL, MARKER, ENDPOINT_MARKER, ROOM_LABEL];
    for layout in all {
        let gens: Vec<u8> = layout.iter().map(|s| s.since).collect();
        assert!(gens.windows(2).all(|w| w[0] <= w[1]), "generations out of order: {gens:?}");
        assert!(gens.iter().all(|g| *g <= CURRENT_GENERATION));
    }
}

#[test]
fn current_layouts_have_expected_lengths() {
    assert_eq!(ROOM.len(), 14);
    assert_eq!(HALLWAY.len(), 11);
    assert_eq!(WALL.len(), 8);
    assert_eq!(ROOM_WALL_V2.len(), 6);
    assert_eq!(STANDALONE_MARKER.len(), 8);
    assert_eq!(STANDALONE_LABEL.len(), 6);
    assert_eq!(MARKER.len(), 6);
}

#[test]
fn generation_follows_tuple_length() {
    assert_eq!(generation_of(ROOM, 8), 1);
    assert_eq!(generation_of(ROOM, 10), 2);
    assert_eq!(generation_of(ROOM, 12), 3);
    assert_eq!(generation_of(ROOM, 14), CURRENT_GENERATION);
    assert_eq!(generation_of(ROOM, 0), 1);
}

#[test]
fn generation_caps_at_layout_length() {
    assert_eq!(generation_of(WALL, 20), 3);
}

// =============================================================
// Tuple reader
// =============================================================

#[test]
fn non_array_is_not_a_tuple() {
    let value = json!({"id": 1});
    let err = Tuple::new(TupleKind::Room, &value, 3).unwrap_err();
    assert_eq!(err, FormatError::NotATuple { kind: TupleKind::Room, index: 3 });
    assert_eq!(err.to_string(), "room #3 is not an array");
}

#[test]
fn null_reads_as_absent() {
    let value = json!([1, null]);
    let t = Tuple::new(TupleKind::Wall, &value, 0).unwrap();
    assert!(t.get(1).is_none());
    assert!(t.get(5).is_none());
    assert_eq!(t.number_or(1, 10.0).unwrap(), 10.0);
    assert_eq!(t.text(1).unwrap(), "");
}

#[test]
fn ids_accept_integral_numbers_only() {
    let value = json!([7, 7.0, 7.5, -1, "7"]);
    let t = Tuple::new(TupleKind::Room, &value, 0).unwrap();
    assert_eq!(t.id(0).unwrap(), 7);
    assert_eq!(t.id(1).unwrap(), 7);
    for slot in 2..=4 {
        assert!(matches!(t.id(slot), Err(FormatError::BadId { kind: TupleKind::Room, .. })));
    }
}

#[test]
fn missing_id_is_an_error() {
    let value = json!([]);
    let t = Tuple::new(TupleKind::Hallway, &value, 0).unwrap();
    assert_eq!(t.id(0), Err(FormatError::BadId { kind: TupleKind::Hallway, slot: "id" }));
}

#[test]
fn flags_accept_booleans_and_numbers() {
    let value = json!([true, false, 1, 0, 2, "yes"]);
    let t = Tuple::new(TupleKind::Room, &value, 0).unwrap();
    assert!(t.flag_or(0, false).unwrap());
    assert!(!t.flag_or(1, true).unwrap());
    assert!(t.flag_or(2, false).unwrap());
    assert!(!t.flag_or(3, true).unwrap());
    assert!(t.flag_or(4, false).unwrap());
    assert!(t.flag_or(9, true).unwrap());
    assert!(matches!(t.flag_or(5, true), Err(FormatError::WrongType { found: "string", .. })));
}

#[test]
fn wrong_type_names_the_slot() {
    let value = json!([1, "ten"]);
    let t = Tuple::new(TupleKind::Room, &value, 0).unwrap();
    let err = t.number(1).unwrap_err();
    assert_eq!(
        err,
        FormatError::WrongType { kind: TupleKind::Room, slot: "x", expected: "number", found: "string" }
    );
    assert_eq!(err.to_string(), "room.x: expected number, found string");
}

#[test]
fn integers_reject_fractions() {
    let value = json!([2, 3.0, 2.5]);
    let t = Tuple::new(TupleKind::Wall, &value, 0).unwrap();
    assert_eq!(t.integer_or(0, 1).unwrap(), 2);
    assert_eq!(t.integer_or(1, 1).unwrap(), 3);
    assert!(t.integer_or(2, 1).is_err());
    assert_eq!(t.integer_or(7, 1).unwrap(), 1);
}

#[test]
fn optional_text_distinguishes_absent() {
    let value = json!(["red", null]);
    let t = Tuple::new(TupleKind::RoomLabel, &value, 0).unwrap();
    assert_eq!(t.optional_text(0).unwrap().as_deref(), Some("red"));
    assert_eq!(t.optional_text(1).unwrap(), None);
    assert_eq!(t.optional_text(2).unwrap(), None);
}

#[test]
fn segments_need_four_numbers() {
    let good = json!([1, [[0, 0, 10, 0], [10, 0, 10, 5.5]]]);
    let t = Tuple::new(TupleKind::Hallway, &good, 0).unwrap();
    let segs = t.segments(1).unwrap();
    assert_eq!(segs.len(), 2);
    assert_eq!(segs[1].y2, 5.5);

    let short = json!([1, [[0, 0, 10, 0], [1, 2, 3]]]);
    let t = Tuple::new(TupleKind::Hallway, &short, 0).unwrap();
    assert_eq!(
        t.segments(1).unwrap_err(),
        FormatError::BadSegment { kind: TupleKind::Hallway, slot: "segments", index: 1 }
    );

    let text = json!([1, [["a", 0, 1, 1]]]);
    let t = Tuple::new(TupleKind::Hallway, &text, 0).unwrap();
    assert!(matches!(t.segments(1), Err(FormatError::BadSegment { index: 0, .. })));
}

#[test]
fn nodes_read_keyed_objects() {
    let value = json!([1, [], 10, "", [
        {"x": 0, "y": 25, "attachedRoom": {"roomId": 4, "edge": "left", "relativePosition": 0.5}},
        {"x": -60, "y": 80}
    ]]);
    let t = Tuple::new(TupleKind::Wall, &value, 0).unwrap();
    let nodes = t.nodes(4).unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].attached_room.map(|a| a.room_id), Some(4));
    assert!(nodes[1].attached_room.is_none());
}

#[test]
fn node_that_is_not_an_object_is_rejected() {
    let value = json!([1, [], 10, "", [[0, 0]]]);
    let t = Tuple::new(TupleKind::Wall, &value, 0).unwrap();
    match t.nodes(4) {
        Err(FormatError::BadNode { slot, index, reason, .. }) => {
            assert_eq!(slot, "nodes");
            assert_eq!(index, 0);
            assert!(reason.contains("array"));
        }
        other => panic!("expected BadNode, got {other:?}"),
    }
}

#[test]
fn tuples_reports_element_index() {
    let value = json!([1, 0, 0, 20, 20, "", 1, [["door", 0, 0], 5]]);
    let t = Tuple::new(TupleKind::Room, &value, 0).unwrap();
    assert_eq!(
        t.tuples(7, TupleKind::Marker).unwrap_err(),
        FormatError::NotATuple { kind: TupleKind::Marker, index: 1 }
    );
}

#[test]
fn tuple_reports_its_generation() {
    let v1 = json!([1, [], 10, "", 0, 1]);
    let v3 = json!([1, [], 10, "", 0, 1, [], null, null, [], 2]);
    assert_eq!(Tuple::new(TupleKind::Hallway, &v1, 0).unwrap().generation(), 1);
    assert_eq!(Tuple::new(TupleKind::Hallway, &v3, 0).unwrap().generation(), 3);
}

#[test]
fn ids_above_the_exact_float_range_are_rejected() {
    let value = json!([9_007_199_254_740_991_u64, 9_007_199_254_740_992_u64, u64::MAX]);
    let t = Tuple::new(TupleKind::Room, &value, 0).unwrap();
    assert_eq!(t.id(0).unwrap(), 9_007_199_254_740_991);
    assert!(matches!(t.id(1), Err(FormatError::BadId { .. })));
    assert!(matches!(t.id(2), Err(FormatError::BadId { .. })));
}

#[test]
fn segments_with_extra_coordinates_are_rejected() {
    let value = json!([1, [[0, 0, 10, 0, 99]]]);
    let t = Tuple::new(TupleKind::Hallway, &value, 0).unwrap();
    assert_eq!(
        t.segments(1).unwrap_err(),
        FormatError::BadSegment { kind: TupleKind::Hallway, slot: "segments", index: 0 }
    );
}

#[test]
fn null_segment_coordinates_read_as_zero() {
    let value = json!([1, [[null, 5, 10, null]]]);
    let t = Tuple::new(TupleKind::Wall, &value, 0).unwrap();
    let segs = t.segments(1).unwrap();
    assert_eq!(segs[0], Segment { x1: 0.0, y1: 5.0, x2: 10.0, y2: 0.0 });
}

#[test]
fn null_node_fields_take_defaults() {
    let value = json!([1, [], 10, "", [
        {"x": null, "y": 4, "attachedRoom": {"roomId": 3.0, "edge": "top", "relativePosition": null}}
    ]]);
    let t = Tuple::new(TupleKind::Wall, &value, 0).unwrap();
    let node = t.nodes(4).unwrap()[0];
    assert_eq!(node.x, 0.0);
    assert_eq!(node.y, 4.0);
    let attachment = node.attached_room.unwrap();
    assert_eq!(attachment.room_id, 3);
    assert_eq!(attachment.relative_position, 0.5);
}

#[test]
fn unreadable_attachment_leaves_node_free() {
    let value = json!([1, [], 10, "", [
        {"x": 1, "y": 2, "attachedRoom": {"roomId": 3, "edge": "diagonal"}}
    ]]);
    let t = Tuple::new(TupleKind::Wall, &value, 0).unwrap();
    let node = t.nodes(4).unwrap()[0];
    assert!(node.attached_room.is_none());
    assert_eq!(node.x, 1.0);
}
