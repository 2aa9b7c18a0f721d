//! Wire formats for floorplan documents.
//!
//! A document travels in three forms:
//!
//! - **Share string**: compact JSON, zlib-compressed, then base64. Small
//!   enough to paste into chat.
//! - **Compact JSON**: short top-level keys and positional tuples. Older,
//!   shorter tuples still decode.
//! - **Expanded JSON**: the camelCase file form, one named field per value.
//!
//! Decoding always builds a fresh [`floorplan::doc::Document`]. Callers that
//! hold a live document use the `import_*` helpers, which swap it in only
//! after a fully successful decode.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`share`] | Share string encode/decode with size limits |
//! | [`compact`] | Compact JSON codec and legacy corridor migration |
//! | [`layout`] | Tuple slot tables, generations, and the typed tuple reader |
//! | [`expanded`] | Expanded JSON import/export |
//! | [`config`] | [`ShareLimits`] and their environment overrides |
//! | [`error`] | [`DecodeError`] and [`EncodeError`] |

pub mod compact;
pub mod config;
pub mod error;
pub mod expanded;
pub mod layout;
pub mod share;

pub use config::ShareLimits;
pub use error::{DecodeError, EncodeError};
pub use layout::FormatError;
