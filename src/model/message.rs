use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub extracomment: Option<String>,

    #[serde(default)]
    pub translation: String,

    #[serde(default)]
    pub state: TranslationState,
}

impl Message {
    pub fn unfinished(id: &str, source: &str, extracomment: Option<&str>) -> Self {
        Message {
            id: id.to_string(),
            source: source.to_string(),
            extracomment: extracomment.map(str::to_string),
            translation: String::new(),
            state: TranslationState::Unfinished,
        }
    }

    /// Text shown to the user: the translation once it is finished,
    /// otherwise the canonical source string.
    pub fn display_text(&self) -> &str {
        if self.state == TranslationState::Finished && !self.translation.trim().is_empty() {
            &self.translation
        } else {
            &self.source
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TranslationState {
    Unfinished,
    Finished,
    Vanished,
    Obsolete,
}

impl Default for TranslationState {
    fn default() -> Self {
        TranslationState::Unfinished
    }
}

impl TranslationState {
    /// Value of the `type` attribute on `<translation>`, if any.
    /// A finished translation carries no attribute in the TS format.
    pub fn type_attr(&self) -> Option<&'static str> {
        match self {
            TranslationState::Unfinished => Some("unfinished"),
            TranslationState::Vanished => Some("vanished"),
            TranslationState::Obsolete => Some("obsolete"),
            TranslationState::Finished => None,
        }
    }

    pub fn from_type_attr(attr: Option<&str>) -> Self {
        match attr {
            Some("unfinished") => TranslationState::Unfinished,
            Some("vanished") => TranslationState::Vanished,
            Some("obsolete") => TranslationState::Obsolete,
            _ => TranslationState::Finished,
        }
    }
}
