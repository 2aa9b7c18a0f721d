//! Shared numeric constants for the floorplan crate.

// ── Geometry ────────────────────────────────────────────────────

/// Default corridor and wall stroke width in plan units.
pub const CORRIDOR_WIDTH: f64 = 10.0;

/// How close (in plan units) a point must be to a room edge to attach to it.
pub const EDGE_SNAP_THRESHOLD: f64 = 15.0;

/// Angular spacing of the compass attachment points on a circle room, in degrees.
pub const COMPASS_STEP_DEG: f64 = 45.0;

// ── Creation ────────────────────────────────────────────────────

/// Smallest width or height accepted when drawing a rectangle room.
pub const MIN_ROOM_SIZE: f64 = 20.0;

/// Smallest radius accepted when drawing a circle room.
pub const MIN_ROOM_RADIUS: f64 = 20.0;

/// Minimum number of nodes a corridor or wall needs.
pub const MIN_PATH_NODES: usize = 2;

/// Marker glyph size; pasted markers are clamped so the glyph stays inside the room.
pub const MARKER_SIZE: f64 = 16.0;

/// Suffix appended to the label of a duplicated room.
pub const COPY_SUFFIX: &str = " (Copy)";

// ── Picking ─────────────────────────────────────────────────────

/// Distance from a marker's anchor within which a click picks it.
pub const MARKER_HIT_RADIUS: f64 = MARKER_SIZE * 1.5;

// ── Document ────────────────────────────────────────────────────

/// Version string written into new documents.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Name given to documents that do not carry one.
pub const DEFAULT_MAP_NAME: &str = "Untitled Map";

/// Floor assigned to entities that do not specify one.
pub const DEFAULT_FLOOR: i64 = 1;

/// Largest id accepted from a file: 2^53 - 1, the last integer every JSON
/// reader holds exactly.
pub const MAX_SAFE_ID: u64 = 9_007_199_254_740_991;
