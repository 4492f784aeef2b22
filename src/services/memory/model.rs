use serde::{Deserialize, Serialize};

/// One remembered (source, translation) pair for a language direction.
///
/// `normalized` and `hash` are derived from `source` and act as the match
/// key; they are filled in on load for records written by older versions.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    pub source_language: String,
    pub target_language: String,

    pub source: String,
    pub translation: String,

    #[serde(default)]
    pub normalized: String,

    #[serde(default)]
    pub hash: String,
}
