// src/fetch/mod.rs
// =============================================================================
// This module fetches the page being inspected.
//
// Currently implements:
// - Defaulting a bare "example.com" to "https://example.com"
// - One GET for the page, keeping the status line and the body
// - A cap on how much of the body we read
//
// Only the root page is fetched here; the links found on it are checked by
// the checker module.
// =============================================================================

mod page;

// Re-export the public pieces from page.rs
pub use page::{fetch_page, normalize_url, status_line, FetchedPage};
