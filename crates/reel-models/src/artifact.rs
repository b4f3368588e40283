//! Date-based storage keys shared by the render and publish jobs.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Extension appended to the date to form the default key
pub const DEFAULT_EXTENSION: &str = ".mp4";
/// Content type declared when the rendered video is stored
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Key of a stored artifact in the blob store.
///
/// The default key is today's UTC date (`YYYY-MM-DD`) plus a fixed
/// extension. Two renders for the same date write the same key and the
/// last one wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Wrap an explicit key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for the UTC date of `now`.
    pub fn for_date(now: DateTime<Utc>, extension: &str) -> Self {
        Self(format!("{}{}", now.format("%Y-%m-%d"), extension))
    }

    /// Use the explicit key when present and non-empty, else the date key.
    pub fn resolve(explicit: Option<&str>, now: DateTime<Utc>, extension: &str) -> Self {
        match explicit.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => Self::new(key),
            None => Self::for_date(now, extension),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key with the extension removed (e.g. `2025-06-15`).
    pub fn stem<'a>(&'a self, extension: &str) -> &'a str {
        self.0.strip_suffix(extension).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
