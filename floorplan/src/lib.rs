//! Spatial document model for annotated floorplans.
//!
//! A floorplan holds rooms, corridors, walls, point markers and text labels.
//! Corridors and walls can attach their endpoints to room edges; moving or
//! resizing a room drags every attached endpoint along and reroutes the
//! path. This crate owns that model and its geometry. Wire formats live in
//! the `sharecode` crate.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`doc`] | [`doc::Document`]: collections, id allocation, add/get/remove, attachment tracking |
//! | [`entity`] | Entity types and the [`entity::Entity`] / [`entity::EntityRef`] unions |
//! | [`geometry`] | Edge projection, reanchoring, orthogonal routing |
//! | [`create`] | Validated create operations and room duplication |
//! | [`hit`] | Picking rooms, markers, corridors and room edges under a point |
//! | [`view`] | Player view and floor filtering |
//! | [`consts`] | Shared numeric constants (snap distance, minimum sizes, etc.) |

pub mod consts;
pub mod create;
pub mod doc;
pub mod entity;
pub mod geometry;
pub mod hit;
pub mod view;
