//! Decode limits for share strings.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use tracing::warn;

/// Default cap on the share string itself, in bytes.
pub const DEFAULT_MAX_SHARE_LEN: usize = 1024 * 1024;
/// Default cap on the inflated JSON payload, in bytes.
pub const DEFAULT_MAX_INFLATED_LEN: usize = 16 * 1024 * 1024;

pub const MAX_SHARE_LEN_ENV: &str = "DECKPLAN_MAX_SHARE_LEN";
pub const MAX_INFLATED_LEN_ENV: &str = "DECKPLAN_MAX_INFLATED_LEN";

/// Size guards applied while decoding a share string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareLimits {
    /// Longest share string accepted, checked before base64 decoding.
    pub max_share_len: usize,
    /// Largest inflated payload accepted, enforced while inflating.
    pub max_inflated_len: usize,
}

impl Default for ShareLimits {
    fn default() -> Self {
        Self { max_share_len: DEFAULT_MAX_SHARE_LEN, max_inflated_len: DEFAULT_MAX_INFLATED_LEN }
    }
}

impl ShareLimits {
    /// Defaults overridden by `DECKPLAN_MAX_SHARE_LEN` and
    /// `DECKPLAN_MAX_INFLATED_LEN` when set to a valid number.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_share_len: env_parse(MAX_SHARE_LEN_ENV, DEFAULT_MAX_SHARE_LEN),
            max_inflated_len: env_parse(MAX_INFLATED_LEN_ENV, DEFAULT_MAX_INFLATED_LEN),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            default
        }
    }
}
