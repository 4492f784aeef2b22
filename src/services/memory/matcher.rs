use super::model::MemoryEntry;
use super::{hash, normalize};

/// Exact match for a source string in the given language direction.
pub fn exact_match<'a>(
    entries: &'a [MemoryEntry],
    source_language: &str,
    target_language: &str,
    source: &str,
) -> Option<&'a MemoryEntry> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return None;
    }

    let norm = normalize::normalize(trimmed);
    let h = hash::hash_norm(&norm);

    entries.iter().find(|e| {
        e.source_language == source_language
            && e.target_language == target_language
            && e.hash == h
            && e.normalized == norm
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(src: &str, tr: &str) -> MemoryEntry {
        let norm = normalize::normalize(src);
        let h = hash::hash_norm(&norm);
        MemoryEntry {
            source_language: "en".to_string(),
            target_language: "de".to_string(),
            source: src.to_string(),
            translation: tr.to_string(),
            normalized: norm,
            hash: h,
        }
    }

    #[test]
    fn matches_ignoring_case_and_spacing() {
        let entries = vec![entry("Missing username.", "Benutzername fehlt.")];
        let hit = exact_match(&entries, "en", "de", "  missing   Username. ").unwrap();
        assert_eq!(hit.translation, "Benutzername fehlt.");
    }

    #[test]
    fn respects_language_direction() {
        let entries = vec![entry("Missing username.", "Benutzername fehlt.")];
        assert!(exact_match(&entries, "en", "fr", "Missing username.").is_none());
        assert!(exact_match(&entries, "en", "de", "").is_none());
    }
}
