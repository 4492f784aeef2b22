use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::catalog::Catalog;
use crate::model::message::TranslationState;
use crate::services::placeholder;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaIssue {
    pub message_id: String,
    pub code: String,
    pub message: String,
}

fn issue(id: &str, code: &str, message: impl Into<String>) -> QaIssue {
    QaIssue {
        message_id: id.to_string(),
        code: code.to_string(),
        message: message.into(),
    }
}

/// Structural validation of a catalog.
///
/// The checks mirror what translation tooling enforces on TS files:
/// id uniqueness, non-empty sources, consistent placeholder numbering
/// between source, extracomment and translation, and translation state
/// matching the actual translation text.
pub fn run(catalog: &Catalog) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();
    let mut seen_ids: HashSet<&str> = HashSet::new();

    for m in catalog.messages() {
        if m.id.trim().is_empty() {
            issues.push(issue(&m.id, "MISSING_ID", "Message without id attribute"));
        } else if !seen_ids.insert(m.id.as_str()) {
            issues.push(issue(
                &m.id,
                "DUPLICATE_ID",
                format!("Message id {} is used more than once", m.id),
            ));
        }

        if m.source.trim().is_empty() {
            issues.push(issue(&m.id, "EMPTY_SOURCE", "Message has an empty source text"));
            continue;
        }

        let source_tokens = placeholder::scan(&m.source);

        // Source placeholders must be %1..%N without holes, otherwise the
        // consuming code cannot supply arguments positionally.
        for (i, n) in source_tokens.iter().enumerate() {
            if *n != (i as u32) + 1 {
                issues.push(issue(
                    &m.id,
                    "PLACEHOLDER_GAP",
                    format!(
                        "Source placeholders are not contiguous, expected %{} but found %{n}",
                        i + 1
                    ),
                ));
                break;
            }
        }

        if let Some(comment) = &m.extracomment {
            for n in placeholder::scan(comment) {
                if !source_tokens.contains(&n) {
                    issues.push(issue(
                        &m.id,
                        "COMMENT_PLACEHOLDER_MISMATCH",
                        format!(
                            "Extracomment mentions %{n} but the source text does not contain it"
                        ),
                    ));
                }
            }
        }

        for n in placeholder::scan(&m.translation) {
            if !source_tokens.contains(&n) {
                issues.push(issue(
                    &m.id,
                    "TRANSLATION_PLACEHOLDER_MISMATCH",
                    format!("Translation uses %{n} which is not present in the source text"),
                ));
            }
        }

        if m.state == TranslationState::Finished && m.translation.trim().is_empty() {
            issues.push(issue(
                &m.id,
                "FINISHED_BUT_EMPTY",
                "Message is marked finished but the translation is empty",
            ));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::TsContext;
    use crate::model::message::Message;
    use crate::services::catalog::template;

    fn catalog_with(messages: Vec<Message>) -> Catalog {
        let mut catalog = Catalog::new("en", "en");
        catalog.contexts.push(TsContext {
            name: String::new(),
            messages,
        });
        catalog
    }

    fn codes(issues: &[QaIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.code.as_str()).collect()
    }

    #[test]
    fn template_catalog_is_clean() {
        assert!(run(&template()).is_empty());
    }

    #[test]
    fn reports_duplicate_and_missing_ids() {
        let catalog = catalog_with(vec![
            Message::unfinished("a", "one", None),
            Message::unfinished("a", "two", None),
            Message::unfinished("", "three", None),
        ]);
        let issues = run(&catalog);
        assert!(codes(&issues).contains(&"DUPLICATE_ID"));
        assert!(codes(&issues).contains(&"MISSING_ID"));
    }

    #[test]
    fn reports_empty_source() {
        let catalog = catalog_with(vec![Message::unfinished("a", "   ", None)]);
        assert_eq!(codes(&run(&catalog)), vec!["EMPTY_SOURCE"]);
    }

    #[test]
    fn reports_placeholder_gap() {
        let catalog = catalog_with(vec![Message::unfinished("a", "got %2 only", None)]);
        assert_eq!(codes(&run(&catalog)), vec!["PLACEHOLDER_GAP"]);
    }

    #[test]
    fn reports_comment_placeholder_mismatch() {
        let catalog = catalog_with(vec![Message::unfinished(
            "a",
            "The user was not found.",
            Some("%1 will be replaced by the user name."),
        )]);
        assert_eq!(codes(&run(&catalog)), vec!["COMMENT_PLACEHOLDER_MISMATCH"]);
    }

    #[test]
    fn reports_translation_placeholder_mismatch() {
        let mut m = Message::unfinished("a", "Timed out after %1 seconds.", None);
        m.translation = "Zeitüberschreitung nach %1 von %2 Sekunden.".to_string();
        let catalog = catalog_with(vec![m]);
        assert_eq!(codes(&run(&catalog)), vec!["TRANSLATION_PLACEHOLDER_MISMATCH"]);
    }

    #[test]
    fn reports_finished_without_translation() {
        let mut m = Message::unfinished("a", "Missing username.", None);
        m.state = TranslationState::Finished;
        let catalog = catalog_with(vec![m]);
        assert_eq!(codes(&run(&catalog)), vec!["FINISHED_BUT_EMPTY"]);
    }
}
