// src/scanner/mod.rs
// =============================================================================
// Everything that reads the HTML of the inspected page.
//
// Submodules:
// - tokens:  html5ever tokenizer turned into a pull-based token stream
// - page:    the single-pass scanner that fills in the report
// - links:   href classification (external, fragment, relative, ...)
// - doctype: doctype -> HTML version label
// - text:    whitespace cleanup for extracted text
// =============================================================================

pub mod doctype;
pub mod links;
pub mod page;
pub mod text;
pub mod tokens;

pub use doctype::detect_html_version;
pub use links::{classify_link, ClassifiedLink, LinkScope};
pub use page::scan_page;
pub use text::normalize_text;
pub use tokens::{HtmlToken, TagToken, TokenStream};
