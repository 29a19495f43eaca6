//! Institutional user identifiers

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a person, unique within the institution's
/// namespace.
///
/// Equality is case-normalized: construction trims surrounding whitespace
/// and lowercases, so `"AUid "` and `"auid"` compare equal. An identifier
/// that is empty after trimming is rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Normalize and validate a raw identifier.
    ///
    /// Returns `None` when the input is empty after trimming.
    pub fn new(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// The normalized identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.0
    }
}
