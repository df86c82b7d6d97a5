// src/lib.rs
// =============================================================================
// page-inspector: inspect one web page and check every link on it.
//
// Modules:
// - scanner:   single-pass HTML token scan (doctype, title, headings, links,
//              password fields) - no DOM is built
// - checker:   background link probes with a concurrency cap and a deadline
// - report:    the report the scanner and the probes write into
// - fetch:     fetching the inspected page itself
// - inspector: the entry point tying the above together
// - config / error: settings and error types
//
// Typical use:
//
//   let inspector = Inspector::new(InspectorConfig::default())?;
//   let deadline = Instant::now() + Duration::from_secs(60);
//   let inspection = inspector.inspect("example.com", Some(deadline)).await;
//   println!("{:?}", inspection.snapshot());   // early, links still pending
//   inspection.wait().await;
//   println!("{:?}", inspection.snapshot());   // final
// =============================================================================

pub mod checker;
pub mod config;
pub mod error;
pub mod fetch;
pub mod inspector;
pub mod report;
pub mod scanner;

pub use checker::WaitOutcome;
pub use config::{InspectorConfig, RelativeLinkPolicy};
pub use error::{ConfigError, FetchError, InspectorError};
pub use inspector::{Inspection, Inspector};
pub use report::{InspectedLink, LinkCounts, LinkKind, LinkRecord, Report, ReportSnapshot};
