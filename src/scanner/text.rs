// src/scanner/text.rs
// =============================================================================
// Cleans up text pulled out of the HTML token stream.
//
// HTML source is full of indentation and line breaks that mean nothing to a
// reader: "\n      Getting   started\n    " should show up as
// "Getting started". This is a pure function with no state.
// =============================================================================

// Collapses every run of whitespace into a single space and trims both ends
//
// Examples:
//   "  Hello \n\t world  " -> "Hello world"
//   "Hello world"          -> "Hello world" (already clean, unchanged)
//   "   "                  -> ""
pub fn normalize_text(raw: &str) -> String {
    // split_whitespace() skips leading/trailing whitespace and treats any run
    // of Unicode whitespace as one separator
    let mut cleaned = String::with_capacity(raw.len());

    for word in raw.split_whitespace() {
        if !cleaned.is_empty() {
            cleaned.push(' ');
        }
        cleaned.push_str(word);
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_runs_of_whitespace() {
        assert_eq!(normalize_text("  Hello \n\t world  "), "Hello world");
        assert_eq!(normalize_text("a\u{a0}\u{a0}b"), "a b");
    }

    #[test]
    fn test_whitespace_only_becomes_empty() {
        assert_eq!(normalize_text(" \n\r\t "), "");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_normalizing_twice_changes_nothing() {
        let inputs = [
            "Getting   started",
            "\n  Docs\n",
            "one two three",
            "  tab\tseparated\tvalues ",
        ];

        for input in inputs {
            let once = normalize_text(input);
            assert_eq!(normalize_text(&once), once, "input: {:?}", input);
        }
    }
}
