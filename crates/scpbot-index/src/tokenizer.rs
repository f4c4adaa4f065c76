//! Text normalization for keys and queries.

/// Splits a text string into lowercase word tokens.
///
/// Whitespace runs separate tokens and empty fragments are discarded, so a
/// string with no non-whitespace content yields an empty sequence. All
/// equality checks downstream happen on the normalized form produced here.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_splits() {
        assert_eq!(tokenize("SCP Foundation"), vec!["scp", "foundation"]);
    }

    #[test]
    fn test_collapses_whitespace_runs() {
        assert_eq!(tokenize("  The \t Sculpture \n"), vec!["the", "sculpture"]);
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t\n ").is_empty());
    }

    #[test]
    fn test_keeps_token_order_and_repeats() {
        assert_eq!(tokenize("who is who"), vec!["who", "is", "who"]);
    }
}
