// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
// =============================================================================

use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

use page_inspector::config::DEFAULT_MAX_CONCURRENT_PROBES;
use page_inspector::{InspectorConfig, RelativeLinkPolicy};

#[derive(Parser, Debug)]
#[command(
    name = "page-inspector",
    version,
    about = "Inspect a web page and check every link on it",
    long_about = "page-inspector fetches one page, reports its HTML version, title, headings \
                  and login fields, and checks whether each link on it is reachable. \
                  Progress is printed while the links are being checked."
)]
pub struct Cli {
    /// Page to inspect (https:// is assumed when no scheme is given)
    pub url: String,

    /// Print reports as JSON (one object per line) instead of a table
    #[arg(long)]
    pub json: bool,

    /// Give up on link checks after this many seconds
    #[arg(long, default_value_t = 600)]
    pub deadline_secs: u64,

    /// Maximum number of links checked at the same time
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_PROBES)]
    pub max_concurrency: usize,

    /// Timeout for each HTTP request, in seconds
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Print a progress report every this many seconds
    #[arg(long, default_value_t = 20)]
    pub interval_secs: u64,

    /// Only scan the page, do not check links
    #[arg(long)]
    pub no_link_check: bool,

    /// Resolve relative links properly (RFC 3986) instead of
    /// appending them to the page URL
    #[arg(long)]
    pub rfc3986_relative: bool,

    /// Log level: off, error, warn, info, debug, trace (RUST_LOG also works)
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,
}

impl Cli {
    // Turns the flags into inspector settings
    pub fn inspector_config(&self) -> InspectorConfig {
        InspectorConfig {
            max_concurrent_probes: self.max_concurrency,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            relative_links: if self.rfc3986_relative {
                RelativeLinkPolicy::Rfc3986
            } else {
                RelativeLinkPolicy::Concatenate
            },
            ..InspectorConfig::default()
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        (!self.no_link_check).then(|| Duration::from_secs(self.deadline_secs))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}
