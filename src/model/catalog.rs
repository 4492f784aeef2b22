use serde::{Deserialize, Serialize};

use super::message::Message;

pub const TS_VERSION: &str = "2.1";

/// A Qt Linguist translation source file (`.ts`) in memory.
///
/// The file is the template from which per-locale translation files are
/// derived: `source_language` is the language of the `<source>` strings,
/// `language` the locale the `<translation>` strings are written in.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Catalog {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub language: String,

    #[serde(default)]
    pub source_language: String,

    #[serde(default)]
    pub contexts: Vec<TsContext>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TsContext {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub messages: Vec<Message>,
}

fn default_version() -> String {
    TS_VERSION.to_string()
}

impl Catalog {
    pub fn new(language: &str, source_language: &str) -> Self {
        Catalog {
            version: TS_VERSION.to_string(),
            language: language.to_string(),
            source_language: source_language.to_string(),
            contexts: Vec::new(),
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.contexts.iter().flat_map(|c| c.messages.iter())
    }

    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }

    /// Message ids are unique across the whole file, so a flat lookup
    /// over all contexts is enough.
    pub fn find(&self, id: &str) -> Option<&Message> {
        self.messages().find(|m| m.id == id)
    }
}
