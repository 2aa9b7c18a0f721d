//! Share strings: compact JSON, zlib-compressed, base64-encoded.
//!
//! Decoding runs every stage into a temporary document. A live document is
//! only replaced once the whole pipeline has succeeded.

#[cfg(test)]
#[path = "share_test.rs"]
mod share_test;

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use floorplan::doc::Document;
use tracing::{debug, warn};

use crate::compact::{self, CompactDoc};
use crate::config::ShareLimits;
use crate::error::{DecodeError, EncodeError};

/// Encode a document as a share string.
///
/// # Errors
///
/// Returns [`EncodeError`] if serialization or compression fails.
pub fn encode(doc: &Document) -> Result<String, EncodeError> {
    let json = compact::to_json(doc)?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json.as_bytes())?;
    let compressed = encoder.finish()?;

    let encoded = BASE64_STANDARD.encode(&compressed);
    debug!(json_len = json.len(), compressed_len = compressed.len(), share_len = encoded.len(), "share string encoded");
    Ok(encoded)
}

/// Decode a share string into a fresh document.
///
/// ASCII whitespace anywhere in the string is ignored, so strings wrapped
/// by chat clients or terminals still decode.
///
/// # Errors
///
/// Returns [`DecodeError::TooLong`] or [`DecodeError::InflatedTooLarge`]
/// when a limit is exceeded, and the matching variant for bad base64,
/// a bad zlib stream, bad JSON or malformed tuples.
pub fn decode(share: &str, limits: &ShareLimits) -> Result<Document, DecodeError> {
    let cleaned: String = share.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if cleaned.len() > limits.max_share_len {
        return Err(DecodeError::TooLong { len: cleaned.len(), max: limits.max_share_len });
    }

    let compressed = BASE64_STANDARD.decode(cleaned.as_bytes())?;
    let inflated = inflate_bounded(&compressed, limits.max_inflated_len)?;
    let compact: CompactDoc = serde_json::from_slice(&inflated)?;
    let doc = compact::decode(&compact)?;

    debug!(share_len = cleaned.len(), inflated_len = inflated.len(), "share string decoded");
    Ok(doc)
}

/// Decode `share` and, only on success, swap it into `live`.
///
/// # Errors
///
/// Returns the [`DecodeError`] from [`decode`]; `live` is untouched.
pub fn import_share_string(live: &mut Document, share: &str, limits: &ShareLimits) -> Result<(), DecodeError> {
    match decode(share, limits) {
        Ok(incoming) => {
            live.replace(incoming);
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "share string rejected");
            Err(e)
        }
    }
}

/// Inflate a zlib stream, failing once the output passes `max` bytes.
fn inflate_bounded(compressed: &[u8], max: usize) -> Result<Vec<u8>, DecodeError> {
    let cap = u64::try_from(max).unwrap_or(u64::MAX).saturating_add(1);
    let mut out = Vec::new();
    ZlibDecoder::new(compressed).take(cap).read_to_end(&mut out)?;
    if out.len() > max {
        return Err(DecodeError::InflatedTooLarge { max });
    }
    Ok(out)
}
