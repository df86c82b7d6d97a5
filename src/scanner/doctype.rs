// src/scanner/doctype.rs
// =============================================================================
// Maps a <!DOCTYPE ...> declaration to a human-readable HTML version.
//
// Old documents name their DTD in the public identifier, e.g.
//   <!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "...">
// while HTML 5 documents just say <!DOCTYPE html>.
//
// We match fragments of the lowercased declaration against a fixed table.
// The table is ORDERED: the more specific entries must come first, because
// "html" (the HTML 5 fragment) appears in nearly every declaration.
// =============================================================================

/// Label used when a page has no usable doctype (also the report default)
pub const NOT_DEFINED: &str = "Not defined";

// (label, fragment to look for in the normalized declaration)
const HTML_VERSIONS: &[(&str, &str)] = &[
    ("XHTML 1.1", "/dtd xhtml 1.1/"),
    ("XHTML 1.0 Strict", "/dtd xhtml 1.0 strict/"),
    ("XHTML 1.0 Transitional", "/dtd xhtml 1.0 transitional/"),
    ("XHTML 1.0 Frameset", "/dtd xhtml 1.0 frameset/"),
    ("HTML 4.01 Transitional", "/dtd html 4.01 transitional/"),
    ("HTML 4.01 Frameset", "/dtd html 4.01 frameset/"),
    ("HTML 4.01 Strict", "/dtd html 4.01/"),
    ("HTML 3.2", "/dtd html 3.2"),
    ("HTML 2.0", "/dtd html 2.0"),
    ("HTML 5", "html"),
];

// Lowercases the declaration and collapses double spaces
//
// The scanner calls this before detection so that "HTML  PUBLIC" and
// "html public" look the same.
pub fn normalize_doctype(doctype: &str) -> String {
    let mut normalized = doctype.trim().to_lowercase();

    while normalized.contains("  ") {
        normalized = normalized.replace("  ", " ");
    }

    normalized
}

// Returns the HTML version label for a doctype declaration
//
// Returns:
//   "Not defined" for an empty declaration
//   the table label for the first matching fragment
//   the normalized declaration itself when nothing matches
pub fn detect_html_version(doctype: &str) -> String {
    let normalized = normalize_doctype(doctype);

    if normalized.is_empty() {
        return NOT_DEFINED.to_string();
    }

    HTML_VERSIONS
        .iter()
        .find(|(_, fragment)| normalized.contains(fragment))
        .map(|(label, _)| label.to_string())
        .unwrap_or(normalized)
}
