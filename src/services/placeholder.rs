use std::sync::OnceLock;

use regex::Regex;

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // %% is a literal percent sign and must not count as a placeholder.
    RE.get_or_init(|| Regex::new(r"%%|%(\d+)").unwrap())
}

/// All positional placeholder numbers referenced in `text`, sorted and
/// deduplicated. `"A %2 b %1 c %1"` yields `[1, 2]`.
pub fn scan(text: &str) -> Vec<u32> {
    let mut numbers: Vec<u32> = token_re()
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
}

/// Substitute `%1`, `%2`, … with the corresponding argument (Qt argument
/// semantics: `%1` is the first argument). Placeholders without a matching
/// argument are left untouched, `%%` becomes a literal `%`.
pub fn substitute(text: &str, args: &[String]) -> String {
    token_re()
        .replace_all(text, |caps: &regex::Captures| match caps.get(1) {
            None => "%".to_string(),
            Some(m) => {
                let n: usize = m.as_str().parse().unwrap_or(0);
                match n.checked_sub(1).and_then(|i| args.get(i)) {
                    Some(arg) => arg.clone(),
                    None => caps[0].to_string(),
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_sorted_unique_numbers() {
        assert_eq!(scan("The URL (%1) is not valid"), vec![1]);
        assert_eq!(scan("%2 then %1 then %1"), vec![1, 2]);
        assert_eq!(scan("no placeholders"), Vec::<u32>::new());
        // %% is an escaped percent sign, not placeholder zero
        assert_eq!(scan("100%% done, %3 left"), vec![3]);
    }

    #[test]
    fn substitutes_by_position() {
        let out = substitute(
            "The request timed out after %1 seconds.",
            &["300".to_string()],
        );
        assert_eq!(out, "The request timed out after 300 seconds.");

        let out = substitute("%2-%1", &["a".to_string(), "b".to_string()]);
        assert_eq!(out, "b-a");
    }

    #[test]
    fn missing_argument_keeps_token() {
        assert_eq!(substitute("got %1 and %2", &["x".to_string()]), "got x and %2");
        assert_eq!(substitute("100%% sure", &[]), "100% sure");
    }
}
