/// Match key normalization: trimmed, lowercased, inner whitespace collapsed.
/// Placeholders are kept verbatim so `%1`-bearing strings only match
/// strings with the same placeholders.
pub fn normalize(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
