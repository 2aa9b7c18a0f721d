use crate::layout::FormatError;

/// Error returned when turning a string (share string, compact JSON or
/// expanded JSON) back into a document. Decoding never touches a live
/// document, so any of these leaves it exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The share string is longer than the configured limit.
    #[error("share string is {len} bytes, limit is {max}")]
    TooLong { len: usize, max: usize },
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The payload is not a valid zlib stream.
    #[error("failed to inflate share payload: {0}")]
    Inflate(#[from] std::io::Error),
    /// The zlib stream expands beyond the configured limit.
    #[error("inflated payload exceeds {max} bytes")]
    InflatedTooLarge { max: usize },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Error returned by the encoders.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("failed to serialize document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to compress share payload: {0}")]
    Deflate(#[from] std::io::Error),
}
